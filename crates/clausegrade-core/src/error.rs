use thiserror::Error;

/// Errors surfaced to callers of the analysis entry points.
///
/// An empty document is not an error: it analyses to zero clauses and grade A.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
