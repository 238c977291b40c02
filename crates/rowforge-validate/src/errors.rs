use thiserror::Error;

/// Infrastructure failures during validation.
///
/// Data-quality problems are never errors; they surface as
/// [`crate::Violation`] records instead.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid dataset directory '{0}'")]
    InvalidDirectory(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
