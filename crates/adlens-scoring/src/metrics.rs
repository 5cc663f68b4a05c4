//! Derivation of raw metrics from one ad record.
//!
//! Engagement is modeled, not measured. The ad library exposes no
//! engagement signal, so `estimated_engagement` is an approximation built
//! from impressions and three multiplicative factors.

use adlens_core::{ExtractedMetrics, RawAd};
use chrono::{DateTime, Utc};

use crate::range::{parse_range_with, RangeHeuristics};

/// Assumed click-through rate applied to impressions.
pub const BASELINE_CTR: f64 = 0.01;
/// Assumed reactions/comments/shares per click.
pub const POST_ENGAGEMENT_RATIO: f64 = 2.5;

pub const DURATION_FACTOR_CAP: f64 = 1.5;
pub const DURATION_FACTOR_REFERENCE_DAYS: f64 = 30.0;
pub const DURATION_FACTOR_WEIGHT: f64 = 0.5;

pub const DEMOGRAPHIC_FACTOR_CAP: f64 = 1.2;
pub const DEMOGRAPHIC_FACTOR_REFERENCE_ENTRIES: f64 = 10.0;
pub const DEMOGRAPHIC_FACTOR_WEIGHT: f64 = 0.2;

pub const CONTENT_FACTOR_CAP: f64 = 1.3;
pub const CONTENT_FACTOR_REFERENCE_CHARS: f64 = 500.0;
pub const CONTENT_FACTOR_WEIGHT: f64 = 0.3;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Derive [`ExtractedMetrics`] for `ad`, with `now` standing in for a
/// missing stop time (and a missing start time).
#[must_use]
pub fn extract_metrics(
    ad: &RawAd,
    now: DateTime<Utc>,
    heuristics: RangeHeuristics,
) -> ExtractedMetrics {
    let duration_days = duration_days(ad, now);
    let spend_amount = parse_range_with(ad.spend.as_deref(), heuristics);
    let impressions = parse_range_with(ad.impressions.as_deref(), heuristics);
    let estimated_engagement = estimate_engagement(ad, impressions, duration_days);

    #[allow(clippy::cast_precision_loss)]
    let days = duration_days as f64;

    ExtractedMetrics {
        duration_days,
        spend_amount,
        impressions,
        estimated_engagement,
        daily_spend: spend_amount / days,
        daily_impressions: impressions / days,
    }
}

/// Whole days between start and stop (or `now`), rounded, never below 1.
fn duration_days(ad: &RawAd, now: DateTime<Utc>) -> i64 {
    let start = ad.ad_delivery_start_time.unwrap_or(now);
    let stop = ad.ad_delivery_stop_time.unwrap_or(now);

    #[allow(clippy::cast_precision_loss)]
    let days = (stop - start).num_seconds() as f64 / SECONDS_PER_DAY;

    #[allow(clippy::cast_possible_truncation)]
    let rounded = days.round() as i64;
    rounded.max(1)
}

#[must_use]
pub fn duration_factor(duration_days: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let days = duration_days as f64;
    (1.0 + (days / DURATION_FACTOR_REFERENCE_DAYS) * DURATION_FACTOR_WEIGHT)
        .min(DURATION_FACTOR_CAP)
}

#[must_use]
pub fn demographic_factor(entry_count: usize) -> f64 {
    if entry_count == 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let entries = entry_count as f64;
    (1.0 + (entries / DEMOGRAPHIC_FACTOR_REFERENCE_ENTRIES) * DEMOGRAPHIC_FACTOR_WEIGHT)
        .min(DEMOGRAPHIC_FACTOR_CAP)
}

#[must_use]
pub fn content_factor(creative_chars: usize) -> f64 {
    if creative_chars == 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let chars = creative_chars as f64;
    (1.0 + (chars / CONTENT_FACTOR_REFERENCE_CHARS) * CONTENT_FACTOR_WEIGHT).min(CONTENT_FACTOR_CAP)
}

/// Modeled clicks plus modeled post engagements.
fn estimate_engagement(ad: &RawAd, impressions: f64, duration_days: i64) -> f64 {
    let clicks = impressions
        * BASELINE_CTR
        * duration_factor(duration_days)
        * demographic_factor(ad.demographic_distribution.len())
        * content_factor(ad.creative_text_len());
    let post_engagements = clicks * POST_ENGAGEMENT_RATIO;
    clicks + post_engagements
}
