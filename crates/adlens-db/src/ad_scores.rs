//! Database operations for the `ad_scores` table.

use adlens_core::{ComponentScores, ExtractedMetrics};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `ad_scores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdScoreRow {
    pub ad_id: String,
    pub total_score: i16,
    pub component_scores: Value,
    pub raw_metrics: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdScoreRow {
    /// Decode the JSONB component breakdown.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the stored JSON has the wrong shape.
    pub fn component_scores(&self) -> Result<ComponentScores, DbError> {
        Ok(serde_json::from_value(self.component_scores.clone())?)
    }

    /// Decode the JSONB metrics snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the stored JSON has the wrong shape.
    pub fn raw_metrics(&self) -> Result<ExtractedMetrics, DbError> {
        Ok(serde_json::from_value(self.raw_metrics.clone())?)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the stored score for `ad_id`, or `None` if it was never scored.
///
/// Freshness is the caller's concern; stale rows are returned as-is.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_ad_score(pool: &PgPool, ad_id: &str) -> Result<Option<AdScoreRow>, DbError> {
    let row = sqlx::query_as::<_, AdScoreRow>(
        "SELECT ad_id, total_score, component_scores, raw_metrics, created_at, updated_at \
         FROM ad_scores \
         WHERE ad_id = $1",
    )
    .bind(ad_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts or overwrites the score for `ad_id`.
///
/// # Errors
///
/// Returns [`DbError::Decode`] if the breakdown cannot be serialized, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_ad_score(
    pool: &PgPool,
    ad_id: &str,
    total_score: u8,
    component_scores: &ComponentScores,
    raw_metrics: &ExtractedMetrics,
    updated_at: DateTime<Utc>,
) -> Result<(), DbError> {
    let component_scores = serde_json::to_value(component_scores)?;
    let raw_metrics = serde_json::to_value(raw_metrics)?;

    sqlx::query(
        "INSERT INTO ad_scores (ad_id, total_score, component_scores, raw_metrics, updated_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (ad_id) DO UPDATE SET \
             total_score = EXCLUDED.total_score, \
             component_scores = EXCLUDED.component_scores, \
             raw_metrics = EXCLUDED.raw_metrics, \
             updated_at = EXCLUDED.updated_at",
    )
    .bind(ad_id)
    .bind(i16::from(total_score))
    .bind(component_scores)
    .bind(raw_metrics)
    .bind(updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Deletes scores last written before `cutoff`. Returns the number removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_stale_ad_scores(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM ad_scores WHERE updated_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
