use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the pcap library
    #[error("PCAP error: {0}")]
    Pcap(#[from] pcap::Error),

    /// Error from I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error from capture operations
    #[error("Capture error: {0}")]
    Capture(String),

    /// Error from the explanation service
    #[error("Explanation error: {0}")]
    Explain(String),
}

/// Result type for application
pub type AppResult<T> = Result<T, AppError>;
