//! Client for the Meta Ad Library `ads_archive` endpoint.
//!
//! Fetches ads by keyword, follows paging cursors, retries transient and
//! rate-limit failures with jittered back-off, and normalizes each record
//! into an [`adlens_core::RawAd`].

pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use client::AdLibraryClient;
pub use error::SourceError;
pub use normalize::{flatten_bounds, normalize_ad, parse_delivery_time};
