//! Generic desired/actual set diff.
//!
//! Classifies entries only; applying the plan is up to the orchestrator.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

/// Identity and ownership rules for one entity kind.
pub trait ReconcilePolicy {
    type Desired;
    type Actual;
    type Key: Eq + Hash + Clone + Debug;

    fn desired_key(&self, desired: &Self::Desired) -> Self::Key;

    /// Key of a downstream entity, or `None` when it carries no usable
    /// cross-reference; such entities are neither matched nor deleted.
    fn actual_key(&self, actual: &Self::Actual) -> Option<Self::Key>;

    /// Whether this tool owns the entity's lifecycle. Only governs deletes.
    fn is_managed(&self, actual: &Self::Actual) -> bool;
}

/// Outcome of a diff. Creates and updates keep desired order, deletes keep actual order.
#[derive(Debug)]
pub struct ReconcilePlan<'a, D, A> {
    pub to_create: Vec<&'a D>,
    pub to_update: Vec<(&'a D, &'a A)>,
    pub to_delete: Vec<&'a A>,
}

impl<'a, D, A> ReconcilePlan<'a, D, A> {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Diff `desired` against `actual`.
///
/// A desired entry is paired with the first actual entry carrying its key.
pub fn reconcile<'a, P: ReconcilePolicy>(
    policy: &P,
    desired: &'a [P::Desired],
    actual: &'a [P::Actual],
) -> ReconcilePlan<'a, P::Desired, P::Actual> {
    let mut actual_by_key: HashMap<P::Key, &'a P::Actual> = HashMap::new();
    for entity in actual {
        if let Some(key) = policy.actual_key(entity) {
            actual_by_key.entry(key).or_insert(entity);
        }
    }

    let mut desired_keys = HashSet::new();
    let mut to_create = Vec::new();
    let mut to_update = Vec::new();

    for entity in desired {
        let key = policy.desired_key(entity);
        match actual_by_key.get(&key) {
            Some(existing) => to_update.push((entity, *existing)),
            None => to_create.push(entity),
        }
        desired_keys.insert(key);
    }

    let to_delete = actual
        .iter()
        .filter(|entity| match policy.actual_key(entity) {
            Some(key) => !desired_keys.contains(&key) && policy.is_managed(entity),
            None => false,
        })
        .collect();

    ReconcilePlan {
        to_create,
        to_update,
        to_delete,
    }
}
