//! Run context management.
//!
//! Provides the run id and mode for logging and reporting.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::SyncError;
use crate::logging::LogContext;

/// Which halves of the checkin a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Source to entitlement server, then entitlement server to reporting.
    Full,
    SpacewalkOnly,
    SpliceOnly,
}

impl RunMode {
    pub fn syncs_spacewalk(self) -> bool {
        matches!(self, RunMode::Full | RunMode::SpacewalkOnly)
    }

    pub fn syncs_splice(self) -> bool {
        matches!(self, RunMode::Full | RunMode::SpliceOnly)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Full => "full",
            RunMode::SpacewalkOnly => "spacewalk_sync",
            RunMode::SpliceOnly => "splice_sync",
        };
        f.write_str(name)
    }
}

impl FromStr for RunMode {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" | "all" => Ok(RunMode::Full),
            "spacewalk_sync" | "spacewalk" => Ok(RunMode::SpacewalkOnly),
            "splice_sync" | "splice" => Ok(RunMode::SpliceOnly),
            other => Err(SyncError::config(format!("unknown run mode '{}'", other))),
        }
    }
}

/// Context for one checkin run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub mode: RunMode,
}

impl RunContext {
    pub fn new(mode: RunMode) -> Self {
        Self {
            run_id: format!("run-{}", &Uuid::new_v4().to_string()[..8]),
            started_at: Utc::now(),
            mode,
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.run_id)
    }

    /// Log context for one stage of the run.
    pub fn stage(&self, stage: &str) -> LogContext {
        self.log_context().with_stage(stage)
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}
