use thiserror::Error;

/// Errors returned by the ad library client.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client. The request
    /// URL carries the access token, so it is stripped on conversion.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP 429 or a Graph throttling code. Retried with back-off; surfaces
    /// once retries are exhausted.
    #[error("ad library rate limit reached")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The Graph API returned an `error` object.
    #[error("ad library API error {code}: {message}")]
    ApiError { code: i64, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The client was built or called with unusable input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

impl SourceError {
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
