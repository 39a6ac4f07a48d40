//! Error types for monorepo imports

use thiserror::Error;

/// Result type alias for monorepo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for monorepo operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error while touching the working tree or scratch directories
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An underlying git operation failed
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Invalid input set, manifest, or monorepo location
    #[error("configuration error: {0}")]
    Config(String),

    /// The destination branch exists but its history lost the anchor commit
    #[error("corrupted history: {0}")]
    CorruptedHistory(String),

    /// Fetching or pulling from an individual repo failed
    #[error("upstream error for repo '{repo}': {message}")]
    Upstream {
        /// Name of the individual repo
        repo: String,
        /// What went wrong
        message: String,
    },

    /// A three-way merge reported conflicting entries
    #[error("merge conflict: {0}")]
    MergeConflict(String),
}
