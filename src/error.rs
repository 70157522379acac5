use thiserror::Error;

/// The request never produced a response
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err.url().map(|u| u.to_string()).unwrap_or_default();
            FetchError::Timeout(url)
        } else {
            FetchError::Transport(err)
        }
    }
}

/// Why a location search contributed no listings
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("Blocked by Craigslist")]
    Blocked,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
