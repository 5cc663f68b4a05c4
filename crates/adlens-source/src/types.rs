//! Ad Library Graph API response types.
//!
//! A page is `{"data": [...], "paging": {"cursors": {...}, "next": "..."}}`.
//! Records in `data` are kept as raw JSON so a single malformed ad can be
//! skipped without losing the page.

use serde::Deserialize;
use serde_json::Value;

/// One page of `ads_archive` results.
#[derive(Debug, Deserialize)]
pub struct ArchivePage {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
pub struct Paging {
    /// Absolute URL of the next page, including the access token.
    #[serde(default)]
    pub next: Option<String>,
}

/// Error envelope: `{"error": {"message": "...", "type": "...", "code": 613}}`.
#[derive(Debug, Deserialize)]
pub struct GraphErrorEnvelope {
    pub error: GraphError,
}

#[derive(Debug, Deserialize)]
pub struct GraphError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: i64,
}

/// Spend and impressions arrive either as a plain string or as a bounds
/// object whose values may be strings or numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Bounds {
    Text(String),
    Range {
        #[serde(default)]
        lower_bound: Option<Value>,
        #[serde(default)]
        upper_bound: Option<Value>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveDemographic {
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub percentage: Option<Value>,
}

/// A single record from `data`. Only `id` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveAd {
    pub id: String,
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub page_name: Option<String>,
    #[serde(default)]
    pub ad_delivery_start_time: Option<String>,
    #[serde(default)]
    pub ad_delivery_stop_time: Option<String>,
    #[serde(default)]
    pub spend: Option<Bounds>,
    #[serde(default)]
    pub impressions: Option<Bounds>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub ad_creative_bodies: Vec<String>,
    #[serde(default)]
    pub ad_creative_link_titles: Vec<String>,
    #[serde(default)]
    pub ad_creative_link_descriptions: Vec<String>,
    #[serde(default)]
    pub demographic_distribution: Vec<ArchiveDemographic>,
    #[serde(default)]
    pub publisher_platforms: Vec<String>,
    #[serde(default)]
    pub ad_snapshot_url: Option<String>,
}
