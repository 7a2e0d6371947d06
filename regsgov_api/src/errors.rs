//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The hourly request quota is exhausted (HTTP 429 / `OVER_RATE_LIMIT`).
    #[error("API quota exceeded")]
    QuotaExceeded,
    /// The API key was missing or rejected.
    #[error("API key rejected (HTTP {status})")]
    Unauthorized { status: u16 },
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The request never produced a response (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// A success response whose body did not match the expected schema.
    #[error("Failed to parse response: {message}")]
    Parse { message: String, body: String },
    /// The base URL and path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// True for failures scoped to a single payload rather than the connection or credentials.
    pub fn is_item_scoped(&self) -> bool {
        match self {
            Self::Parse { .. } => true,
            Self::HttpStatus { status, .. } => *status == 404,
            _ => false,
        }
    }
}
