use thiserror::Error;

/// Main error type for Embedbench
#[derive(Error, Debug)]
pub enum EmbedbenchError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding API errors
    #[error("Embedding API error: {0}")]
    Embedding(String),

    /// Benchmark dataset errors (missing split, malformed records)
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Evaluator errors (shape mismatches, empty inputs)
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using EmbedbenchError
pub type Result<T> = std::result::Result<T, EmbedbenchError>;
