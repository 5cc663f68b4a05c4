//! Cached access to the pattern report.
//!
//! A report is resolved by trying three strategies in order: the pattern
//! cache, a recompute from the top successful ads, and finally an explicit
//! empty report. Store failures in the first two are logged and skipped.

use std::time::Duration;

use adlens_core::PatternReport;
use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::corpus::analyze;
use crate::store::{PatternCache, SuccessStore};

pub const PATTERN_CACHE_KEY: &str = "patterns:latest";
pub const PATTERN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Default number of top-scoring ads a recompute analyzes.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Where a resolved report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    Cache,
    Recomputed,
    Empty,
}

#[derive(Debug, Clone)]
pub struct PatternStore<S> {
    store: S,
    sample_size: usize,
    ttl: Duration,
}

impl<S> PatternStore<S> {
    pub fn new(store: S, sample_size: usize) -> Self {
        Self {
            store,
            sample_size,
            ttl: PATTERN_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl<S: SuccessStore + PatternCache> PatternStore<S> {
    /// The current report. Never fails; falls back to an empty report.
    pub async fn get_patterns(&self, refresh: bool) -> PatternReport {
        self.resolve(refresh).await.0
    }

    /// Try each strategy in order. `refresh` skips the cache.
    pub async fn resolve(&self, refresh: bool) -> (PatternReport, PatternSource) {
        let strategies: &[PatternSource] = if refresh {
            &[PatternSource::Recomputed]
        } else {
            &[PatternSource::Cache, PatternSource::Recomputed]
        };

        for &strategy in strategies {
            let attempt = match strategy {
                PatternSource::Cache => self.cached().await,
                PatternSource::Recomputed => self.recompute().await,
                PatternSource::Empty => None,
            };
            if let Some(report) = attempt {
                tracing::debug!(source = ?strategy, "pattern report resolved");
                return (report, strategy);
            }
        }

        (empty_report(), PatternSource::Empty)
    }

    /// Strategy 1: the cached report, if present and unexpired.
    pub async fn cached(&self) -> Option<PatternReport> {
        match self.store.get_report(PATTERN_CACHE_KEY).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "pattern cache read failed");
                None
            }
        }
    }

    /// Strategy 2: analyze the top successful ads and cache the result.
    ///
    /// `None` when the ads cannot be loaded or there are too few of them.
    pub async fn recompute(&self) -> Option<PatternReport> {
        let ads = match self.store.top_successful(self.sample_size).await {
            Ok(ads) => ads,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load successful ads for pattern analysis");
                return None;
            }
        };

        let report = analyze(&ads)?;
        if let Err(e) = self
            .store
            .set_report(PATTERN_CACHE_KEY, &report, self.ttl)
            .await
        {
            tracing::warn!(error = %e, "pattern cache write failed");
        }
        tracing::info!(
            analyzed_ads = report.analyzed_ads,
            terms = report.common_terms.len(),
            "pattern report recomputed"
        );
        Some(report)
    }
}

/// Strategy 3: no terms, empty maps, current timestamp.
#[must_use]
pub fn empty_report() -> PatternReport {
    PatternReport::empty(Utc::now())
}

/// Recompute patterns on a detached task.
///
/// The caller does not wait. A panic in the analysis is caught at the
/// task boundary and logged.
pub fn spawn_pattern_refresh<S>(patterns: PatternStore<S>) -> JoinHandle<()>
where
    S: SuccessStore + PatternCache + 'static,
{
    tokio::spawn(async move {
        let analysis = tokio::spawn(async move { patterns.recompute().await });
        match analysis.await {
            Ok(Some(report)) => tracing::info!(
                terms = report.common_terms.len(),
                "background pattern refresh complete"
            ),
            Ok(None) => tracing::info!("background pattern refresh produced no report"),
            Err(e) => tracing::error!(error = %e, "background pattern refresh aborted"),
        }
    })
}

#[cfg(test)]
mod tests {
    use adlens_core::{RawAd, ScoredAd};

    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryStore;

    fn successful(id: &str, body: &str, score: u8) -> ScoredAd {
        let mut ad = ScoredAd::zeroed(RawAd {
            id: id.to_string(),
            ad_creative_bodies: vec![body.to_string()],
            ..RawAd::default()
        }, Utc::now());
        ad.success_score = score;
        ad
    }

    async fn seeded_store(count: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..count {
            let ad = successful(&format!("ad-{i}"), &format!("shop deals item{i}"), 80);
            store.upsert_successful(&ad).await.unwrap();
        }
        store
    }

    /// Pattern cache that is always down; successful-ad storage works.
    #[derive(Debug, Clone, Default)]
    struct CachelessStore {
        inner: MemoryStore,
    }

    impl SuccessStore for CachelessStore {
        async fn upsert_successful(&self, ad: &ScoredAd) -> Result<(), StoreError> {
            self.inner.upsert_successful(ad).await
        }

        async fn top_successful(&self, limit: usize) -> Result<Vec<ScoredAd>, StoreError> {
            self.inner.top_successful(limit).await
        }

        async fn list_successful(
            &self,
            limit: usize,
            offset: usize,
        ) -> Result<(Vec<ScoredAd>, u64), StoreError> {
            self.inner.list_successful(limit, offset).await
        }
    }

    impl PatternCache for CachelessStore {
        async fn get_report(&self, _key: &str) -> Result<Option<PatternReport>, StoreError> {
            Err(StoreError::Unavailable("cache offline".to_string()))
        }

        async fn set_report(
            &self,
            _key: &str,
            _report: &PatternReport,
            _ttl: Duration,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("cache offline".to_string()))
        }
    }

    #[tokio::test]
    async fn empty_store_yields_explicit_empty_report() {
        let patterns = PatternStore::new(MemoryStore::new(), DEFAULT_SAMPLE_SIZE);
        let (report, source) = patterns.resolve(false).await;
        assert_eq!(source, PatternSource::Empty);
        assert!(report.common_terms.is_empty());
        assert!(report.structure_patterns.is_empty());
        assert!(report.visual_patterns.is_empty());
    }

    #[tokio::test]
    async fn miss_recomputes_and_then_hits_cache() {
        let store = seeded_store(5).await;
        let patterns = PatternStore::new(store.clone(), DEFAULT_SAMPLE_SIZE);

        let (first, source) = patterns.resolve(false).await;
        assert_eq!(source, PatternSource::Recomputed);
        assert_eq!(first.common_terms[0].term, "deals");
        assert!(store.get_report(PATTERN_CACHE_KEY).await.unwrap().is_some());

        let (second, source) = patterns.resolve(false).await;
        assert_eq!(source, PatternSource::Cache);
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn refresh_bypasses_cache() {
        let store = seeded_store(5).await;
        let patterns = PatternStore::new(store.clone(), DEFAULT_SAMPLE_SIZE);
        let stale = PatternReport::empty(Utc::now());
        store
            .set_report(PATTERN_CACHE_KEY, &stale, PATTERN_TTL)
            .await
            .unwrap();

        let (cached, source) = patterns.resolve(false).await;
        assert_eq!(source, PatternSource::Cache);
        assert!(cached.common_terms.is_empty());

        let (fresh, source) = patterns.resolve(true).await;
        assert_eq!(source, PatternSource::Recomputed);
        assert!(!fresh.common_terms.is_empty());
    }

    #[tokio::test]
    async fn recompute_uses_only_top_sample() {
        let store = seeded_store(5).await;
        for i in 0..3 {
            let low = successful(&format!("low-{i}"), "clearance outlet", 51);
            store.upsert_successful(&low).await.unwrap();
        }
        let patterns = PatternStore::new(store, 5);
        let report = patterns.recompute().await.expect("report");
        assert_eq!(report.analyzed_ads, 5);
        assert!(report
            .common_terms
            .iter()
            .all(|t| t.term != "clearance" && t.term != "outlet"));
    }

    #[tokio::test]
    async fn unavailable_cache_degrades_to_recompute_every_time() {
        let store = CachelessStore::default();
        for i in 0..6 {
            let ad = successful(&format!("ad-{i}"), "shop deals now", 90);
            store.upsert_successful(&ad).await.unwrap();
        }
        let patterns = PatternStore::new(store, DEFAULT_SAMPLE_SIZE);
        for _ in 0..2 {
            let (report, source) = patterns.resolve(false).await;
            assert_eq!(source, PatternSource::Recomputed);
            assert_eq!(report.analyzed_ads, 6);
        }
    }

    #[tokio::test]
    async fn detached_refresh_populates_cache() {
        let store = seeded_store(6).await;
        let handle = spawn_pattern_refresh(PatternStore::new(store.clone(), DEFAULT_SAMPLE_SIZE));
        handle.await.expect("refresh task completes");
        let cached = store.get_report(PATTERN_CACHE_KEY).await.unwrap();
        assert!(cached.is_some());
    }

    #[tokio::test]
    async fn detached_refresh_with_too_few_ads_is_quiet() {
        let store = seeded_store(2).await;
        let handle = spawn_pattern_refresh(PatternStore::new(store.clone(), DEFAULT_SAMPLE_SIZE));
        handle.await.expect("refresh task completes");
        assert!(store.get_report(PATTERN_CACHE_KEY).await.unwrap().is_none());
    }
}
