//! HTTP client for the Ad Library `ads_archive` Graph endpoint.
//!
//! Wraps `reqwest` with rate-limit detection, retry, paging, and per-record
//! normalization. A record that fails to deserialize is skipped and counted;
//! the rest of the page is kept.

use std::time::Duration;

use adlens_core::{AppConfig, RawAd};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode, Url};

use crate::error::SourceError;
use crate::normalize::normalize_ad;
use crate::retry::retry_with_backoff;
use crate::types::{ArchiveAd, ArchivePage, GraphErrorEnvelope};

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";
const DEFAULT_API_VERSION: &str = "v19.0";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Largest page the client asks for.
pub const MAX_PAGE_SIZE: usize = 100;
/// Paging stops after this many pages even if `limit` was not reached.
pub const MAX_PAGES: usize = 10;

/// Graph error codes that mean "slow down".
const RATE_LIMIT_CODES: &[i64] = &[4, 17, 32, 613];

const ARCHIVE_FIELDS: &str = "id,page_id,page_name,ad_delivery_start_time,\
ad_delivery_stop_time,spend,impressions,currency,ad_creative_bodies,\
ad_creative_link_titles,ad_creative_link_descriptions,demographic_distribution,\
publisher_platforms,ad_snapshot_url";

/// Client for the Ad Library API.
///
/// Use [`AdLibraryClient::new`] for production or
/// [`AdLibraryClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct AdLibraryClient {
    client: Client,
    access_token: String,
    archive_url: Url,
    countries: Vec<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl AdLibraryClient {
    /// Creates a new client pointed at the production Graph API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        Self::with_base_url(access_token, timeout_secs, DEFAULT_BASE_URL, DEFAULT_API_VERSION)
    }

    /// Creates a new client with a custom base URL and API version.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::InvalidRequest`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        base_url: &str,
        api_version: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("adlens/0.1 (ad-research)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let archive_url = Url::parse(&normalised)
            .and_then(|base| {
                base.join(&format!("{}/ads_archive", api_version.trim_matches('/')))
            })
            .map_err(|e| SourceError::InvalidRequest(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            archive_url,
            countries: vec!["US".to_owned()],
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// Builds a client from application config. `Ok(None)` when no access
    /// token is configured.
    ///
    /// # Errors
    ///
    /// Same as [`AdLibraryClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Option<Self>, SourceError> {
        let Some(token) = config.ad_library_access_token.as_deref() else {
            return Ok(None);
        };
        let client = Self::with_base_url(
            token,
            config.ad_library_request_timeout_secs,
            &config.ad_library_base_url,
            &config.ad_library_api_version,
        )?
        .with_countries(config.ad_library_countries.clone())
        .with_retry(
            config.ad_library_max_retries,
            config.ad_library_retry_backoff_base_ms,
        );
        Ok(Some(client))
    }

    /// ISO country codes sent as `ad_reached_countries`.
    #[must_use]
    pub fn with_countries(mut self, countries: Vec<String>) -> Self {
        self.countries = countries;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Searches the archive for ads matching `keyword`, returning at most
    /// `limit` normalized ads.
    ///
    /// Follows `paging.next` until `limit` ads are collected, the cursor runs
    /// out, or [`MAX_PAGES`] pages were read.
    ///
    /// # Errors
    ///
    /// - [`SourceError::InvalidRequest`] if `keyword` is blank.
    /// - [`SourceError::RateLimited`] once retries are exhausted on throttling.
    /// - [`SourceError::ApiError`] if the Graph API returns an error object.
    /// - [`SourceError::Http`] on network failure or non-2xx HTTP status.
    /// - [`SourceError::Deserialize`] if a page does not match the expected shape.
    pub async fn search_ads(&self, keyword: &str, limit: usize) -> Result<Vec<RawAd>, SourceError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SourceError::InvalidRequest(
                "search keyword must not be empty".to_owned(),
            ));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut ads = Vec::with_capacity(limit.min(MAX_PAGE_SIZE));
        let mut skipped = 0usize;
        let mut next = Some(self.build_search_url(keyword, limit.min(MAX_PAGE_SIZE)));
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let page = self.fetch_page(&url).await?;
            pages += 1;

            for record in page.data {
                match serde_json::from_value::<ArchiveAd>(record) {
                    Ok(ad) => ads.push(normalize_ad(ad)),
                    Err(_) => skipped += 1,
                }
            }

            if ads.len() >= limit || pages >= MAX_PAGES {
                break;
            }
            next = page
                .paging
                .and_then(|p| p.next)
                .and_then(|n| Url::parse(&n).ok());
        }

        if skipped > 0 {
            tracing::warn!(keyword, skipped, "skipped malformed ad records");
        }
        ads.truncate(limit);
        tracing::info!(keyword, fetched = ads.len(), pages, "ad library search complete");
        Ok(ads)
    }

    /// Builds the first-page URL with properly percent-encoded query parameters.
    fn build_search_url(&self, keyword: &str, page_size: usize) -> Url {
        let countries = serde_json::to_string(&self.countries).unwrap_or_else(|_| "[]".to_owned());
        let mut url = self.archive_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("access_token", &self.access_token);
            pairs.append_pair("search_terms", keyword);
            pairs.append_pair("ad_reached_countries", &countries);
            pairs.append_pair("ad_active_status", "ALL");
            pairs.append_pair("fields", ARCHIVE_FIELDS);
            pairs.append_pair("limit", &page_size.to_string());
        }
        url
    }

    async fn fetch_page(&self, url: &Url) -> Result<ArchivePage, SourceError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_json(url)
        })
        .await?;
        Self::check_api_error(&body)?;

        serde_json::from_value(body).map_err(|e| SourceError::Deserialize {
            context: self.archive_url.path().to_owned(),
            source: e,
        })
    }

    /// Sends a GET request and parses the response body as JSON.
    ///
    /// Throttling (HTTP 429 or a throttling Graph code) becomes
    /// [`SourceError::RateLimited`]; other error bodies become
    /// [`SourceError::ApiError`] or [`SourceError::Http`].
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, SourceError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let retry_after_secs = retry_after(&response);
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited { retry_after_secs });
        }

        let http_error = response.error_for_status_ref().err();
        let body = response.text().await?;
        if let Some(http_error) = http_error {
            let graph_error = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|b| Self::graph_error(&b, retry_after_secs));
            return Err(match graph_error {
                Some(err @ SourceError::RateLimited { .. }) => err,
                Some(err) if !status.is_server_error() => err,
                _ => http_error.into(),
            });
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: self.archive_url.path().to_owned(),
            source: e,
        })
    }

    /// Checks for a Graph `error` object in a successful response.
    fn check_api_error(body: &serde_json::Value) -> Result<(), SourceError> {
        match Self::graph_error(body, None) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn graph_error(body: &serde_json::Value, retry_after_secs: Option<u64>) -> Option<SourceError> {
        body.get("error")?;
        let envelope: GraphErrorEnvelope = serde_json::from_value(body.clone()).ok()?;
        let error = envelope.error;
        if RATE_LIMIT_CODES.contains(&error.code) {
            return Some(SourceError::RateLimited { retry_after_secs });
        }
        let message = if error.message.is_empty() {
            error.kind.unwrap_or_else(|| "unknown error".to_owned())
        } else {
            error.message
        };
        Some(SourceError::ApiError {
            code: error.code,
            message,
        })
    }
}

fn retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
