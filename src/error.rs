//! Error types for mesos-records.

use thiserror::Error;

/// Errors that abort a whole record generation pass.
///
/// Per-record problems (unresolvable hosts, malformed master addresses,
/// duplicate masters) never surface here; they are reported as
/// [`Diagnostic`](crate::generator::Diagnostic)s and the record is skipped.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The cluster state did not name a leading master.
    #[error("cluster state reported an empty leader")]
    EmptyLeader,

    /// IO error (reading a state document, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The state document could not be parsed.
    #[error("failed to parse cluster state: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failed to parse address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}
