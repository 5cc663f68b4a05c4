use thiserror::Error;

/// Failure while scoring a single ad. Never escapes [`crate::Scorer`]; it is
/// logged and replaced by the all-zero fallback.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("ad record has no identifier")]
    MissingId,

    #[error("non-finite {metric} for ad {ad_id}")]
    NonFiniteMetric { ad_id: String, metric: &'static str },
}

/// Failure reported by a score, successful-ad or pattern store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("stored payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}
