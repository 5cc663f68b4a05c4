//! In-process implementation of every store trait.
//!
//! Used by the offline CLI and by tests. Clones share the same maps.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use adlens_core::{PatternReport, ScoredAd};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{CachedScore, PatternCache, ScoreStore, SuccessStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scores: Arc<RwLock<HashMap<String, CachedScore>>>,
    successful: Arc<RwLock<HashMap<String, ScoredAd>>>,
    reports: Arc<RwLock<HashMap<String, (PatternReport, DateTime<Utc>)>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn score_count(&self) -> usize {
        self.scores.read().await.len()
    }

    pub async fn successful_count(&self) -> usize {
        self.successful.read().await.len()
    }
}

impl ScoreStore for MemoryStore {
    async fn get_score(&self, ad_id: &str) -> Result<Option<CachedScore>, StoreError> {
        Ok(self.scores.read().await.get(ad_id).cloned())
    }

    async fn put_score(&self, score: &CachedScore) -> Result<(), StoreError> {
        self.scores
            .write()
            .await
            .insert(score.ad_id.clone(), score.clone());
        Ok(())
    }
}

impl SuccessStore for MemoryStore {
    async fn upsert_successful(&self, ad: &ScoredAd) -> Result<(), StoreError> {
        self.successful
            .write()
            .await
            .insert(ad.ad.id.clone(), ad.clone());
        Ok(())
    }

    async fn top_successful(&self, limit: usize) -> Result<Vec<ScoredAd>, StoreError> {
        let (page, _) = self.list_successful(limit, 0).await?;
        Ok(page)
    }

    async fn list_successful(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<ScoredAd>, u64), StoreError> {
        let guard = self.successful.read().await;
        let mut ads: Vec<ScoredAd> = guard.values().cloned().collect();
        drop(guard);

        ads.sort_by(|a, b| {
            b.success_score
                .cmp(&a.success_score)
                .then_with(|| a.ad.id.cmp(&b.ad.id))
        });
        let total = u64::try_from(ads.len()).unwrap_or(u64::MAX);
        let page = ads.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }
}

impl PatternCache for MemoryStore {
    async fn get_report(&self, key: &str) -> Result<Option<PatternReport>, StoreError> {
        let now = Utc::now();
        Ok(self
            .reports
            .read()
            .await
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(report, _)| report.clone()))
    }

    async fn set_report(
        &self,
        key: &str,
        report: &PatternReport,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StoreError::Backend(format!("invalid ttl: {e}")))?;
        self.reports
            .write()
            .await
            .insert(key.to_string(), (report.clone(), Utc::now() + ttl));
        Ok(())
    }
}
