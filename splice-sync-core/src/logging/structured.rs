//! Structured logging utilities.
//!
//! Provides context-aware logging with run_id, stage and entity included
//! in every log message.

use std::fmt;

/// Initialize the process logger.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Logging context for a checkin run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub stage: Option<String>,
    pub entity: Option<(String, String)>,
}

impl LogContext {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            stage: None,
            entity: None,
        }
    }

    pub fn with_stage(&self, stage: &str) -> Self {
        Self {
            run_id: self.run_id.clone(),
            stage: Some(stage.to_string()),
            entity: None,
        }
    }

    /// Narrow the context to one entity, e.g. `("owner", "satellite-3")`.
    pub fn with_entity(&self, kind: &str, id: &str) -> Self {
        Self {
            run_id: self.run_id.clone(),
            stage: self.stage.clone(),
            entity: Some((kind.to_string(), id.to_string())),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[run={}]", self.run_id)?;
        if let Some(stage) = &self.stage {
            write!(f, " [stage={}]", stage)?;
        }
        if let Some((kind, id)) = &self.entity {
            write!(f, " [{}={}]", kind, id)?;
        }
        Ok(())
    }
}
