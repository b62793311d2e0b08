//! Domain-level error taxonomy for evalkit.

use std::path::PathBuf;

/// A task definition document that could not be turned into a [`Task`].
///
/// Local to one file: the loader records it and moves on to the next file.
///
/// [`Task`]: super::task::Task
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid task definition {}: {reason}", path.display())]
pub struct ValidationError {
    /// File the definition was read from.
    pub path: PathBuf,
    /// What was wrong with it.
    pub reason: String,
}

impl ValidationError {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// evalkit run-level errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("no tasks found matching criteria")]
    NoTasksSelected,

    #[error("cannot aggregate an empty run")]
    EmptyRun,

    #[error("subject invocation failed: {0}")]
    Subject(String),

    #[error("cannot persist results to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("baseline unavailable at {}: {reason}", path.display())]
    BaselineUnavailable { path: PathBuf, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for evalkit operations.
pub type Result<T> = std::result::Result<T, EvalError>;
