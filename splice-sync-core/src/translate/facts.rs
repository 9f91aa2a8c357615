//! Fact translation.
//!
//! Source hardware fields become flat, dotted fact names as a registered
//! client would report them (`lscpu.architecture`, `memory.memtotal`, ...).

use serde_json::{Map, Value};

use crate::models::{CpuInfo, Facts, Inactivity};

/// Replacement for `.` in fact names sent to the reporting server.
pub const REPORTING_DOT_TOKEN: &str = "_dot_";

/// Translate cpu information.
///
/// Socket and core counts fall back to 1: the entitlement server drops
/// zero-valued numeric facts, which would hide the fact entirely.
pub fn cpu_facts(cpu: &CpuInfo) -> Facts {
    let mut facts = Facts::new();

    let sockets = cpu.socket_count.filter(|n| *n > 0).unwrap_or(1);
    let cores = cpu.cores_per_socket.filter(|n| *n > 0).unwrap_or(1);

    facts.insert("cpu.cpu_socket(s)".to_string(), Value::from(sockets));
    facts.insert("lscpu.cpu_socket(s)".to_string(), Value::from(sockets));
    facts.insert("cpu.core(s)_per_socket".to_string(), Value::from(cores));
    facts.insert("lscpu.core(s)_per_socket".to_string(), Value::from(cores));

    if let Some(count) = cpu.cpu_count.filter(|n| *n > 0) {
        facts.insert("cpu.cpu(s)".to_string(), Value::from(count));
        facts.insert("lscpu.cpu(s)".to_string(), Value::from(count));
    }

    // entitlement rules key off uname.machine, not lscpu
    if let Some(arch) = &cpu.arch {
        facts.insert("uname.machine".to_string(), Value::from(arch.as_str()));
        facts.insert("lscpu.architecture".to_string(), Value::from(arch.as_str()));
    }

    let details = [
        ("lscpu.l1d_cache", &cpu.cache),
        ("lscpu.cpu_mhz", &cpu.mhz),
        ("lscpu.vendor_id", &cpu.vendor),
        ("lscpu.model", &cpu.model),
        ("lscpu.stepping", &cpu.stepping),
    ];
    for (name, value) in details {
        if let Some(value) = value {
            facts.insert(name.to_string(), Value::from(value.as_str()));
        }
    }

    facts
}

/// Translate memory sizes from kilobytes to bytes; absent sizes are omitted.
pub fn memory_facts(memory_kb: Option<u64>, swap_kb: Option<u64>) -> Facts {
    let mut facts = Facts::new();
    if let Some(kb) = memory_kb {
        facts.insert("memory.memtotal".to_string(), Value::from(kb * 1024));
    }
    if let Some(kb) = swap_kb {
        facts.insert("memory.swaptotal".to_string(), Value::from(kb * 1024));
    }
    facts
}

pub fn inactive_facts(inactive: Option<&Inactivity>) -> Facts {
    let mut facts = Facts::new();
    if let Some(inactive) = inactive {
        if let Some(last_boot) = &inactive.last_boot {
            facts.insert("inactive.last_boot".to_string(), Value::from(last_boot.as_str()));
        }
        if let Some(last_checkin) = &inactive.last_checkin {
            facts.insert(
                "inactive.last_checkin".to_string(),
                Value::from(last_checkin.as_str()),
            );
        }
    }
    facts
}

pub fn guest_facts(active_guest_info: Option<&Value>) -> Facts {
    let mut facts = Facts::new();
    if let Some(info) = active_guest_info {
        facts.insert("active_guest_info".to_string(), info.clone());
    }
    facts
}

/// Rewrite fact names for the reporting server, whose store rejects `.` in keys.
pub fn rewrite_fact_keys(facts: &Facts) -> Map<String, Value> {
    facts
        .iter()
        .map(|(name, value)| (name.replace('.', REPORTING_DOT_TOKEN), value.clone()))
        .collect()
}
