use std::fmt;

/// Errors that can occur when talking to the Atlas Data API
#[derive(Debug)]
pub enum AtlasError {
    /// HTTP request failed (transport, timeout)
    Http(reqwest::Error),
    /// The Data API answered with a non-success status
    Api { status: u16, message: String },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Atlas HTTP error: {e}"),
            Self::Api { status, message } => {
                write!(f, "Atlas Data API error (status {status}): {message}")
            }
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AtlasError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Result type for Data API operations
pub type Result<T> = std::result::Result<T, AtlasError>;
