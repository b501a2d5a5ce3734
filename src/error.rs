//! Error types for loalias
//!
//! A failing tool (non-zero exit) is not an error here: its output travels in a
//! [`CommandResult`](crate::executor::CommandResult) so it can be classified.
//! These variants cover the cases where there is no output to look at.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AliasError {
    /// The elevation helper (sudo) could not be found or started
    #[error("Elevation helper '{helper}' is not available")]
    ElevationUnavailable { helper: String },

    /// The subprocess could not be launched
    #[error("Failed to launch '{cmd}': {reason}")]
    SpawnFailed { cmd: String, reason: String },

    /// A query ran but its result is unusable
    #[error("Command '{cmd}' failed: {detail}")]
    CommandFailed { cmd: String, detail: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type AliasResult<T> = Result<T, AliasError>;
