/// Domain-specific error types for the hedging lab.
/// Bad input is rejected before any simulation work starts:
/// - `InvalidInput` aborts the whole operation, no partial results
/// - `Internal` is never swallowed; the boundary reports it as a 500
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LabError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LabError::InvalidInput(msg.into())
    }
}

impl From<tokio::task::JoinError> for LabError {
    fn from(e: tokio::task::JoinError) -> Self {
        LabError::Internal(format!("simulation worker failed: {e}"))
    }
}

pub type LabResult<T> = Result<T, LabError>;
