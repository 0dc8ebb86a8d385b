//! Error types for run driving and session management

use agent_service::ServiceError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, RunError>;

/// Errors that end a run or a session step
///
/// A run that the service reports as failed is not an error; it is returned
/// as [`crate::RunOutcome::Failed`].
#[derive(Error, Debug)]
pub enum RunError {
    /// A call to the agent service failed
    #[error("Agent service error: {0}")]
    Service(#[from] ServiceError),

    /// The agent asked for a function that is not registered locally
    #[error("Unknown function requested: {function} (run {run_id})")]
    UnknownFunction { run_id: String, function: String },

    /// Local file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RunError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RunError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<agent_utils::EnvError> for RunError {
    fn from(err: agent_utils::EnvError) -> Self {
        RunError::Config(err.to_string())
    }
}
