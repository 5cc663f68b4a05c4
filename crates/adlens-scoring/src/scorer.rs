//! Tiered component scores and the weighted success score.

use std::time::Duration;

use adlens_core::{ComponentScores, ExtractedMetrics, RawAd, ScoredAd};
use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::error::ScoringError;
use crate::metrics::extract_metrics;
use crate::range::RangeHeuristics;
use crate::store::{CachedScore, ScoreStore, SuccessStore};

/// Maximum value of any single component score.
pub const COMPONENT_MAX: f64 = 25.0;

pub const DURATION_WEIGHT: f64 = 1.2;
pub const SPEND_WEIGHT: f64 = 0.8;
pub const IMPRESSIONS_WEIGHT: f64 = 0.8;
pub const ENGAGEMENT_WEIGHT: f64 = 1.2;

/// Default minimum success score for an ad to count as successful.
pub const DEFAULT_SUCCESS_THRESHOLD: u8 = 50;

/// Cached scores younger than this are reused.
pub const SCORE_FRESHNESS: Duration = Duration::from_secs(24 * 60 * 60);

/// Output of a curve at each tier boundary, starting from zero input.
const TIER_OUTPUTS: [f64; 5] = [0.0, 5.0, 10.0, 15.0, COMPONENT_MAX];

/// A piecewise-linear curve through `(0, 0)`, `(b0, 5)`, `(b1, 10)`,
/// `(b2, 15)` and `(b3, 25)`, flat at 25 beyond `b3`.
///
/// Continuous and non-decreasing by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierCurve {
    pub bounds: [f64; 4],
}

impl TierCurve {
    #[must_use]
    pub fn score(&self, value: f64) -> f64 {
        if value.is_nan() || value <= 0.0 {
            return 0.0;
        }

        let mut lower = 0.0;
        for (i, &upper) in self.bounds.iter().enumerate() {
            if value < upper {
                let span = TIER_OUTPUTS[i + 1] - TIER_OUTPUTS[i];
                return TIER_OUTPUTS[i] + (value - lower) / (upper - lower) * span;
            }
            lower = upper;
        }
        COMPONENT_MAX
    }
}

/// Days running.
pub const DURATION_CURVE: TierCurve = TierCurve {
    bounds: [7.0, 14.0, 30.0, 60.0],
};

/// Spend in the ad's currency.
pub const SPEND_CURVE: TierCurve = TierCurve {
    bounds: [100.0, 500.0, 1_000.0, 5_000.0],
};

pub const IMPRESSIONS_CURVE: TierCurve = TierCurve {
    bounds: [10_000.0, 50_000.0, 100_000.0, 500_000.0],
};

/// Engagement rate as a fraction of impressions (0.05 is 5 %).
pub const ENGAGEMENT_RATE_CURVE: TierCurve = TierCurve {
    bounds: [0.01, 0.03, 0.05, 0.10],
};

#[must_use]
pub fn duration_score(days: f64) -> f64 {
    DURATION_CURVE.score(days)
}

#[must_use]
pub fn spend_score(spend: f64) -> f64 {
    SPEND_CURVE.score(spend)
}

#[must_use]
pub fn impressions_score(impressions: f64) -> f64 {
    IMPRESSIONS_CURVE.score(impressions)
}

#[must_use]
pub fn engagement_score(rate: f64) -> f64 {
    ENGAGEMENT_RATE_CURVE.score(rate)
}

/// Estimated engagement per impression; `0.0` when impressions are unknown.
#[must_use]
pub fn engagement_rate(metrics: &ExtractedMetrics) -> f64 {
    if metrics.impressions > 0.0 {
        metrics.estimated_engagement / metrics.impressions
    } else {
        0.0
    }
}

#[must_use]
pub fn component_scores(metrics: &ExtractedMetrics) -> ComponentScores {
    #[allow(clippy::cast_precision_loss)]
    let days = metrics.duration_days as f64;
    ComponentScores {
        duration: duration_score(days),
        spend: spend_score(metrics.spend_amount),
        impressions: impressions_score(metrics.impressions),
        engagement: engagement_score(engagement_rate(metrics)),
    }
}

/// Weighted total in `0..=100`. The weights sum to 4, so four maxed
/// components give exactly 100.
#[must_use]
pub fn total_score(scores: &ComponentScores) -> u8 {
    let weighted = scores.duration * DURATION_WEIGHT
        + scores.spend * SPEND_WEIGHT
        + scores.impressions * IMPRESSIONS_WEIGHT
        + scores.engagement * ENGAGEMENT_WEIGHT;
    if !weighted.is_finite() {
        return 0;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = weighted.round().clamp(0.0, 100.0) as u8;
    total
}

/// Score `ad` from scratch at `now`.
///
/// # Errors
///
/// Returns [`ScoringError`] if the record has no id or yields non-finite
/// metrics.
pub fn compute_scored_ad(
    ad: &RawAd,
    now: DateTime<Utc>,
    heuristics: RangeHeuristics,
) -> Result<ScoredAd, ScoringError> {
    if ad.id.trim().is_empty() {
        return Err(ScoringError::MissingId);
    }

    let metrics = extract_metrics(ad, now, heuristics);
    let checks = [
        ("spend", metrics.spend_amount),
        ("impressions", metrics.impressions),
        ("estimated engagement", metrics.estimated_engagement),
    ];
    if let Some(&(metric, _)) = checks.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ScoringError::NonFiniteMetric {
            ad_id: ad.id.clone(),
            metric,
        });
    }

    let component_scores = component_scores(&metrics);
    Ok(ScoredAd {
        ad: ad.clone(),
        success_score: total_score(&component_scores),
        component_scores,
        metrics: Some(metrics),
        scored_at: now,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    pub range: RangeHeuristics,
    pub freshness_window: Duration,
    pub success_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            range: RangeHeuristics::default(),
            freshness_window: SCORE_FRESHNESS,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
        }
    }
}

/// Scores ads against a [`ScoreStore`], reusing fresh cached scores.
///
/// Never fails: a store outage degrades to recomputation, and an ad that
/// cannot be scored comes back as [`ScoredAd::zeroed`].
#[derive(Debug, Clone)]
pub struct Scorer<S> {
    store: S,
    config: ScoringConfig,
}

impl<S> Scorer<S> {
    pub fn new(store: S, config: ScoringConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ScoreStore> Scorer<S> {
    pub async fn score(&self, ad: &RawAd) -> ScoredAd {
        self.score_at(ad, Utc::now()).await
    }

    pub async fn score_at(&self, ad: &RawAd, now: DateTime<Utc>) -> ScoredAd {
        if let Some(cached) = self.lookup_fresh(ad, now).await {
            return cached;
        }

        match compute_scored_ad(ad, now, self.config.range) {
            Ok(scored) => {
                if let Some(entry) = cache_entry(&scored) {
                    if let Err(e) = self.store.put_score(&entry).await {
                        tracing::warn!(ad_id = %ad.id, error = %e, "score cache write failed");
                    }
                }
                scored
            }
            Err(e) => {
                tracing::warn!(ad_id = %ad.id, error = %e, "scoring failed; using zero score");
                ScoredAd::zeroed(ad.clone(), now)
            }
        }
    }

    /// Score every ad concurrently. Output order matches input order.
    pub async fn score_batch(&self, ads: &[RawAd]) -> Vec<ScoredAd> {
        let now = Utc::now();
        join_all(ads.iter().map(|ad| self.score_at(ad, now))).await
    }

    async fn lookup_fresh(&self, ad: &RawAd, now: DateTime<Utc>) -> Option<ScoredAd> {
        if ad.id.trim().is_empty() {
            return None;
        }

        match self.store.get_score(&ad.id).await {
            Ok(Some(entry)) if entry.is_fresh(now, self.config.freshness_window) => {
                tracing::debug!(ad_id = %ad.id, "score cache hit");
                Some(ScoredAd {
                    ad: ad.clone(),
                    success_score: entry.total_score,
                    component_scores: entry.component_scores,
                    metrics: Some(entry.raw_metrics),
                    scored_at: entry.updated_at,
                })
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(ad_id = %ad.id, error = %e, "score cache read failed; recomputing");
                None
            }
        }
    }
}

impl<S: SuccessStore> Scorer<S> {
    /// Persist every ad at or above the success threshold. Returns how many
    /// were written; individual failures are logged and skipped.
    pub async fn persist_successful(&self, scored: &[ScoredAd]) -> usize {
        let threshold = self.config.success_threshold;
        let writes = scored
            .iter()
            .filter(|ad| ad.success_score >= threshold)
            .map(|ad| async move {
                match self.store.upsert_successful(ad).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(ad_id = %ad.ad.id, error = %e, "failed to persist successful ad");
                        false
                    }
                }
            });
        join_all(writes).await.into_iter().filter(|ok| *ok).count()
    }
}

fn cache_entry(scored: &ScoredAd) -> Option<CachedScore> {
    scored.metrics.map(|raw_metrics| CachedScore {
        ad_id: scored.ad.id.clone(),
        total_score: scored.success_score,
        component_scores: scored.component_scores,
        raw_metrics,
        updated_at: scored.scored_at,
    })
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
