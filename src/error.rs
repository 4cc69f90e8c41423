use thiserror::Error;

/// Errors raised while computing typing metrics.
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("elapsed time must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),
}

/// Errors raised while loading passages.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PassageError {
    #[error("no passages bundled for language {0}")]
    UnknownLanguage(String),
    #[error("passage set {0} is empty")]
    Empty(String),
    #[error("unable to parse passage set: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by the results log.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
