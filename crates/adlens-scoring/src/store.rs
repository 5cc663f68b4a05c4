//! Storage contracts used by scoring and pattern orchestration.
//!
//! Implementations must be cheap to clone and safe to share across tasks.
//! Callers treat every error as "miss" or "skip write"; none of these
//! failures reach the scoring caller.

use std::future::Future;
use std::time::Duration;

use adlens_core::{ComponentScores, ExtractedMetrics, PatternReport, ScoredAd};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A previously computed score for one ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedScore {
    pub ad_id: String,
    pub total_score: u8,
    pub component_scores: ComponentScores,
    pub raw_metrics: ExtractedMetrics,
    pub updated_at: DateTime<Utc>,
}

impl CachedScore {
    /// `true` when the entry is younger than `window` at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let Ok(window) = chrono::Duration::from_std(window) else {
            return true;
        };
        now.signed_duration_since(self.updated_at) < window
    }
}

/// Keyed lookup/upsert of computed scores.
pub trait ScoreStore: Send + Sync {
    fn get_score(
        &self,
        ad_id: &str,
    ) -> impl Future<Output = Result<Option<CachedScore>, StoreError>> + Send;

    /// Overwrites any existing entry for `score.ad_id`.
    fn put_score(&self, score: &CachedScore)
        -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Persistence of ads that crossed the success threshold.
pub trait SuccessStore: Send + Sync {
    fn upsert_successful(&self, ad: &ScoredAd)
        -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Highest-scoring ads first.
    fn top_successful(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ScoredAd>, StoreError>> + Send;

    /// One page of successful ads (highest score first) plus the total count.
    fn list_successful(
        &self,
        limit: usize,
        offset: usize,
    ) -> impl Future<Output = Result<(Vec<ScoredAd>, u64), StoreError>> + Send;
}

/// String-keyed report cache with expiry.
pub trait PatternCache: Send + Sync {
    fn get_report(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<PatternReport>, StoreError>> + Send;

    fn set_report(
        &self,
        key: &str,
        report: &PatternReport,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
