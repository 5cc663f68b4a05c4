//! Ad records as supplied by the ad library and as enriched by scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of an ad's audience breakdown.
///
/// Only the number of entries feeds scoring; the fields are carried through
/// for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicEntry {
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Share of reach, as the source reports it (e.g. `"0.1234"`).
    #[serde(default)]
    pub percentage: Option<String>,
}

/// An ad record as supplied by the ad library. Read-only to scoring.
///
/// Every field other than `id` is optional in the source payload and
/// defaults to `None` or an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAd {
    pub id: String,
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub page_name: Option<String>,
    #[serde(default)]
    pub ad_delivery_start_time: Option<DateTime<Utc>>,
    /// `None` means the ad is still running.
    #[serde(default)]
    pub ad_delivery_stop_time: Option<DateTime<Utc>>,
    /// Range string such as `"100-499"`, `"<100"` or `">1000"`.
    #[serde(default)]
    pub spend: Option<String>,
    #[serde(default)]
    pub impressions: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub ad_creative_bodies: Vec<String>,
    #[serde(default)]
    pub ad_creative_link_titles: Vec<String>,
    #[serde(default)]
    pub ad_creative_link_descriptions: Vec<String>,
    #[serde(default)]
    pub demographic_distribution: Vec<DemographicEntry>,
    #[serde(default)]
    pub publisher_platforms: Vec<String>,
    #[serde(default)]
    pub ad_snapshot_url: Option<String>,
}

impl RawAd {
    /// Creative bodies joined with single spaces, skipping blank entries.
    #[must_use]
    pub fn body_text(&self) -> String {
        join_non_empty(&self.ad_creative_bodies)
    }

    /// Bodies, link titles and link descriptions joined with single spaces.
    #[must_use]
    pub fn full_text(&self) -> String {
        let parts: Vec<String> = self
            .ad_creative_bodies
            .iter()
            .chain(&self.ad_creative_link_titles)
            .chain(&self.ad_creative_link_descriptions)
            .cloned()
            .collect();
        join_non_empty(&parts)
    }

    /// Total character count across all creative bodies.
    #[must_use]
    pub fn creative_text_len(&self) -> usize {
        self.ad_creative_bodies
            .iter()
            .map(|b| b.chars().count())
            .sum()
    }
}

fn join_non_empty(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Metrics derived from one [`RawAd`].
///
/// `estimated_engagement` is a modeled estimate, not a measurement: the ad
/// library exposes no engagement signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetrics {
    /// Always at least 1.
    pub duration_days: i64,
    pub spend_amount: f64,
    pub impressions: f64,
    pub estimated_engagement: f64,
    pub daily_spend: f64,
    pub daily_impressions: f64,
}

/// The four 0–25 sub-scores behind a success score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub duration: f64,
    pub spend: f64,
    pub impressions: f64,
    pub engagement: f64,
}

/// A [`RawAd`] enriched with its success score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAd {
    #[serde(flatten)]
    pub ad: RawAd,
    /// 0–100.
    pub success_score: u8,
    pub component_scores: ComponentScores,
    /// `None` when scoring failed and the all-zero fallback was used.
    #[serde(default)]
    pub metrics: Option<ExtractedMetrics>,
    pub scored_at: DateTime<Utc>,
}

impl ScoredAd {
    /// The fallback record for an ad that could not be scored.
    #[must_use]
    pub fn zeroed(ad: RawAd, scored_at: DateTime<Utc>) -> Self {
        Self {
            ad,
            success_score: 0,
            component_scores: ComponentScores::default(),
            metrics: None,
            scored_at,
        }
    }
}
