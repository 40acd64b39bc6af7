use thiserror::Error;

/// Errors the fetch side surfaces to the caller.
///
/// `Configuration` means a required credential is missing and no network call
/// was attempted. `Fetch` wraps a transport or HTTP status failure from the
/// search API. The summarizer never returns errors; it degrades to the
/// deterministic fallback instead.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("news fetch failed: {0}")]
    Fetch(String),
}

impl From<reqwest::Error> for NewsError {
    fn from(error: reqwest::Error) -> Self {
        NewsError::Fetch(error.to_string())
    }
}
