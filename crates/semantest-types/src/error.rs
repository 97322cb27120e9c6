use thiserror::Error;

/// Errors from pattern and session storage (used by trait definitions in
/// semantest-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from training-session transitions.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training already active for '{active_website}', cannot start for '{requested_website}'")]
    AlreadyActive {
        active_website: String,
        requested_website: String,
    },
}

/// Errors from the element-selection UI boundary.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("element selection cancelled by user")]
    Cancelled,

    #[error("selection ui unavailable: {0}")]
    Unavailable(String),
}
