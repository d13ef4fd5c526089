//! Error types for fleet operations

use thiserror::Error;

/// Result type alias for fleet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fleet operations
///
/// Per-member failures during a batch never surface as this type; they are
/// captured in [`crate::OperationOutcome`]. Everything here is structural.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// libgit2 error
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Roster file could not be loaded
    #[error("Roster error: {0}")]
    Roster(String),

    /// Snapshot file could not be read or written
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// An external git command failed
    #[error("git {command} failed: {stderr}")]
    Vcs {
        /// The git subcommand that was run
        command: String,
        /// Trimmed stderr of the failed command
        stderr: String,
    },
}
