//! Database operations for the `pattern_cache` table.

use adlens_core::PatternReport;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `pattern_cache` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PatternCacheRow {
    pub cache_key: String,
    pub payload: Value,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatternCacheRow {
    /// Decode the cached report.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the payload has the wrong shape.
    pub fn to_report(&self) -> Result<PatternReport, DbError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// Returns the entry for `cache_key` if it has not expired at `now`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_pattern_cache(
    pool: &PgPool,
    cache_key: &str,
    now: DateTime<Utc>,
) -> Result<Option<PatternCacheRow>, DbError> {
    let row = sqlx::query_as::<_, PatternCacheRow>(
        "SELECT cache_key, payload, expires_at, created_at, updated_at \
         FROM pattern_cache \
         WHERE cache_key = $1 AND expires_at > $2",
    )
    .bind(cache_key)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Stores `report` under `cache_key` until `expires_at`, replacing any
/// previous entry.
///
/// # Errors
///
/// Returns [`DbError::Decode`] if the report cannot be serialized, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn set_pattern_cache(
    pool: &PgPool,
    cache_key: &str,
    report: &PatternReport,
    expires_at: DateTime<Utc>,
) -> Result<(), DbError> {
    let payload = serde_json::to_value(report)?;

    sqlx::query(
        "INSERT INTO pattern_cache (cache_key, payload, expires_at) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (cache_key) DO UPDATE SET \
             payload = EXCLUDED.payload, \
             expires_at = EXCLUDED.expires_at, \
             updated_at = NOW()",
    )
    .bind(cache_key)
    .bind(payload)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Deletes every entry that expired at or before `now`. Returns the number removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_expired_pattern_cache(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM pattern_cache WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
