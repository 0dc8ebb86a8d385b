//! Environment configuration helpers
//!
//! Settings come from process environment variables, optionally seeded from a
//! `.env` file. Values that are set but blank are treated as missing.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading environment configuration
#[derive(Debug, Error)]
pub enum EnvError {
    /// A required variable is unset or blank
    #[error("Required environment variable {0} is not set")]
    Missing(String),

    /// An explicitly requested `.env` file could not be loaded
    #[error("Failed to load env file {path}: {reason}")]
    EnvFile {
        path: PathBuf,
        reason: String,
    },
}

/// Load variables from a `.env` file into the process environment
///
/// With an explicit `path` the file must exist and parse. Without one, a
/// `.env` in the current directory (or any parent) is loaded if present.
/// Variables already set in the environment are never overwritten.
///
/// Returns the path that was loaded, if any.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, EnvError> {
    match path {
        Some(path) => {
            dotenv::from_path(path).map_err(|e| EnvError::EnvFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            debug!(path = %path.display(), "Loaded env file");
            Ok(Some(path.to_path_buf()))
        }
        None => {
            let loaded = dotenv::dotenv().ok();
            if let Some(p) = &loaded {
                debug!(path = %p.display(), "Loaded env file");
            }
            Ok(loaded)
        }
    }
}

/// Read a required variable
pub fn required_var(name: &str) -> Result<String, EnvError> {
    optional_var(name).ok_or_else(|| EnvError::Missing(name.to_string()))
}

/// Read an optional variable, treating blank values as unset
pub fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
