//! Postgres implementation of the scoring storage traits.

use std::time::Duration;

use adlens_core::{PatternReport, ScoredAd};
use adlens_scoring::{CachedScore, PatternCache, ScoreStore, StoreError, SuccessStore};
use chrono::Utc;
use sqlx::PgPool;

use crate::{
    count_successful_ads, get_ad_score, get_pattern_cache, list_top_successful_ads,
    set_pattern_cache, upsert_ad_score, upsert_successful_ad, DbError,
};

/// Score cache, successful-ad store and pattern cache over one pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<DbError> for StoreError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::Decode(e) => StoreError::Decode(e),
            DbError::Sqlx(
                e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)),
            ) => StoreError::Unavailable(e.to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl ScoreStore for PgStore {
    async fn get_score(&self, ad_id: &str) -> Result<Option<CachedScore>, StoreError> {
        let Some(row) = get_ad_score(&self.pool, ad_id).await? else {
            return Ok(None);
        };
        let total_score = u8::try_from(row.total_score)
            .map_err(|_| StoreError::Backend(format!("score out of range: {}", row.total_score)))?;
        Ok(Some(CachedScore {
            component_scores: row.component_scores()?,
            raw_metrics: row.raw_metrics()?,
            ad_id: row.ad_id,
            total_score,
            updated_at: row.updated_at,
        }))
    }

    async fn put_score(&self, score: &CachedScore) -> Result<(), StoreError> {
        upsert_ad_score(
            &self.pool,
            &score.ad_id,
            score.total_score,
            &score.component_scores,
            &score.raw_metrics,
            score.updated_at,
        )
        .await?;
        Ok(())
    }
}

impl SuccessStore for PgStore {
    async fn upsert_successful(&self, ad: &ScoredAd) -> Result<(), StoreError> {
        upsert_successful_ad(&self.pool, ad).await?;
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
        let rows = list_top_successful_ads(&self.pool, to_i64(limit), to_i64(offset)).await?;
        let total = count_successful_ads(&self.pool).await?;

        let mut ads = Vec::with_capacity(rows.len());
        for row in rows {
            match row.to_scored_ad() {
                Ok(ad) => ads.push(ad),
                Err(e) => {
                    tracing::warn!(ad_id = %row.ad_id, error = %e, "skipping undecodable successful ad");
                }
            }
        }
        Ok((ads, u64::try_from(total).unwrap_or(0)))
    }
}

impl PatternCache for PgStore {
    async fn get_report(&self, key: &str) -> Result<Option<PatternReport>, StoreError> {
        match get_pattern_cache(&self.pool, key, Utc::now()).await? {
            Some(row) => Ok(Some(row.to_report()?)),
            None => Ok(None),
        }
    }

    async fn set_report(
        &self,
        key: &str,
        report: &PatternReport,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StoreError::Backend(format!("invalid ttl: {e}")))?;
        set_pattern_cache(&self.pool, key, report, Utc::now() + ttl).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_outages_map_to_unavailable() {
        let err: StoreError = DbError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn decode_failures_keep_their_source() {
        let source = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err: StoreError = DbError::Decode(source).into();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn other_database_errors_are_backend_errors() {
        let err: StoreError = DbError::Sqlx(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
