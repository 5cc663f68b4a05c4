//! Normalization of ad library records into [`RawAd`].

use adlens_core::{DemographicEntry, RawAd};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::types::{ArchiveAd, ArchiveDemographic, Bounds};

/// Flattens a spend/impressions value into the range text the scoring side
/// parses: `"A-B"`, `">A"` when only a lower bound is known, `"<B"` when only
/// an upper bound is known.
#[must_use]
pub fn flatten_bounds(bounds: &Bounds) -> Option<String> {
    match bounds {
        Bounds::Text(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Bounds::Range {
            lower_bound,
            upper_bound,
        } => {
            let lower = lower_bound.as_ref().and_then(bound_text);
            let upper = upper_bound.as_ref().and_then(bound_text);
            match (lower, upper) {
                (Some(lower), Some(upper)) => Some(format!("{lower}-{upper}")),
                (Some(lower), None) => Some(format!(">{lower}")),
                (None, Some(upper)) => Some(format!("<{upper}")),
                (None, None) => None,
            }
        }
    }
}

fn bound_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses a delivery timestamp.
///
/// Accepts RFC 3339, the Graph form `2024-01-15T08:00:00+0000`, and a bare
/// `YYYY-MM-DD` (midnight UTC). Anything else is `None`.
#[must_use]
pub fn parse_delivery_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_optional_time(ad_id: &str, field: &'static str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_delivery_time(raw);
    if parsed.is_none() {
        tracing::debug!(ad_id, field, value = raw, "unparseable delivery time");
    }
    parsed
}

fn normalize_demographic(entry: ArchiveDemographic) -> DemographicEntry {
    DemographicEntry {
        age: entry.age,
        gender: entry.gender,
        region: entry.region,
        percentage: entry.percentage.as_ref().and_then(bound_text),
    }
}

/// Converts an [`ArchiveAd`] into a [`RawAd`].
#[must_use]
pub fn normalize_ad(ad: ArchiveAd) -> RawAd {
    let ad_delivery_start_time =
        parse_optional_time(&ad.id, "ad_delivery_start_time", ad.ad_delivery_start_time.as_deref());
    let ad_delivery_stop_time =
        parse_optional_time(&ad.id, "ad_delivery_stop_time", ad.ad_delivery_stop_time.as_deref());

    RawAd {
        page_id: ad.page_id,
        page_name: ad.page_name,
        ad_delivery_start_time,
        ad_delivery_stop_time,
        spend: ad.spend.as_ref().and_then(flatten_bounds),
        impressions: ad.impressions.as_ref().and_then(flatten_bounds),
        currency: ad.currency,
        ad_creative_bodies: ad.ad_creative_bodies,
        ad_creative_link_titles: ad.ad_creative_link_titles,
        ad_creative_link_descriptions: ad.ad_creative_link_descriptions,
        demographic_distribution: ad
            .demographic_distribution
            .into_iter()
            .map(normalize_demographic)
            .collect(),
        publisher_platforms: ad.publisher_platforms,
        ad_snapshot_url: ad.ad_snapshot_url,
        id: ad.id,
    }
}
