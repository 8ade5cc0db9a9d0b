use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by [`ApiClient`](super::ApiClient) operations.
///
/// `Display` output is the user-facing banner text; views show it verbatim.
/// The client performs no retries and no backoff; every failure surfaces
/// exactly once at the nearest view boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-success HTTP response. `message` is the backend's `error` or
    /// `message` envelope field when present, else a generic fallback.
    #[error("{message}")]
    Backend { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Status code of a backend rejection, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}
