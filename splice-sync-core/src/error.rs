//! Error taxonomy for a checkin run.
//!
//! Record translation failures, collaborator failures and upload rejections
//! are all fatal to the run; only the manifest side channel swallows errors.

use thiserror::Error;

/// Successful termination (sysexits `EX_OK`).
pub const EX_OK: i32 = 0;
/// Input data was incorrect in some way (sysexits `EX_DATAERR`).
pub const EX_DATAERR: i32 = 65;
/// Something was found in an unconfigured or misconfigured state (sysexits `EX_CONFIG`).
pub const EX_CONFIG: i32 = 78;

/// Failure reported by one of the external systems.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The call never produced a response (connection refused, timeout, ...).
    #[error("{system} transport error: {message}")]
    Transport { system: String, message: String },

    /// The system answered with a non-success status.
    #[error("{system} returned status {code}: {body}")]
    Status {
        system: String,
        code: u16,
        body: String,
    },

    /// The requested object does not exist (yet).
    #[error("not found: {what}")]
    NotFound { what: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

/// A source record could not be translated into the downstream shape.
#[derive(Debug, Error, PartialEq)]
pub enum TranslateError {
    #[error("host {host_id}: required field '{field}' is missing")]
    MissingField { host_id: String, field: String },

    #[error("host {host_id}: required network interface '{interface}' is missing")]
    MissingInterface { host_id: String, interface: String },

    #[error("host {host_id}: malformed interface entry '{token}'")]
    MalformedInterface { host_id: String, token: String },

    #[error("host {host_id}: invalid timestamp '{value}'")]
    InvalidTimestamp { host_id: String, value: String },

    #[error("channel {channel}: no product certificate for product id {product_id}")]
    UnknownProductCertificate { channel: String, product_id: String },
}

/// The channel clone graph loops back on itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cyclic channel graph starting at {channel}: {}", cycle.join(" -> "))]
pub struct CyclicChannelGraph {
    pub channel: String,
    pub cycle: Vec<String>,
}

/// Top-level error for a checkin run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    CyclicChannelGraph(#[from] CyclicChannelGraph),

    #[error("upload to {path} was rejected with status {status}: {body}")]
    Upload {
        path: String,
        status: u16,
        body: String,
    },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    pub fn config(message: impl Into<String>) -> Self {
        SyncError::Config {
            message: message.into(),
        }
    }

    /// Process exit status the surrounding CLI reports for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Config { .. } => EX_CONFIG,
            _ => EX_DATAERR,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type for collaborator calls.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
