//! Database operations for the `successful_ads` table.

use adlens_core::ScoredAd;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `successful_ads` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SuccessfulAdRow {
    pub ad_id: String,
    pub page_name: Option<String>,
    pub success_score: i16,
    pub payload: Value,
    pub scored_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SuccessfulAdRow {
    /// Decode the stored scored ad.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the payload has the wrong shape.
    pub fn to_scored_ad(&self) -> Result<ScoredAd, DbError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// Inserts or refreshes a successful ad keyed by its ad id.
///
/// # Errors
///
/// Returns [`DbError::Decode`] if the ad cannot be serialized, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_successful_ad(pool: &PgPool, ad: &ScoredAd) -> Result<(), DbError> {
    let payload = serde_json::to_value(ad)?;

    sqlx::query(
        "INSERT INTO successful_ads (ad_id, page_name, success_score, payload, scored_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (ad_id) DO UPDATE SET \
             page_name = EXCLUDED.page_name, \
             success_score = EXCLUDED.success_score, \
             payload = EXCLUDED.payload, \
             scored_at = EXCLUDED.scored_at, \
             updated_at = NOW()",
    )
    .bind(&ad.ad.id)
    .bind(ad.ad.page_name.as_deref())
    .bind(i16::from(ad.success_score))
    .bind(payload)
    .bind(ad.scored_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns one page of successful ads, highest score first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_top_successful_ads(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<SuccessfulAdRow>, DbError> {
    let rows = sqlx::query_as::<_, SuccessfulAdRow>(
        "SELECT ad_id, page_name, success_score, payload, scored_at, created_at, updated_at \
         FROM successful_ads \
         ORDER BY success_score DESC, ad_id \
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Total number of stored successful ads.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_successful_ads(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM successful_ads")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
