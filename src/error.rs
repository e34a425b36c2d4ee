//! Error types for the reminder engine and its host collaborators.

/// Top-level error type for the task engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration file could not be parsed or serialized.
    #[error("config error: {0}")]
    Config(String),

    /// Task store could not load or persist a snapshot.
    #[error("store error: {0}")]
    Store(String),

    /// A repeat rule was rejected at the edit boundary.
    #[error("invalid repeat rule: {0}")]
    InvalidRepeat(String),

    /// A forced-only transition was requested on a non-forced reminder.
    #[error("task {0} does not have a forced reminder")]
    NotForced(String),

    /// No task with the given id exists in the snapshot.
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, EngineError>;
