use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid row counts: {0}")]
    InvalidCounts(String),
    #[error(transparent)]
    Schema(#[from] rowforge_schema::Error),
    /// Invariant violations that indicate a bug, never bad input.
    #[error("internal invariant violated: {0}")]
    Internal(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
