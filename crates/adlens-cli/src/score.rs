//! Offline scoring of a JSON file with in-memory stores.

use std::path::Path;

use adlens_core::{PatternReport, RawAd, ScoredAd};
use adlens_scoring::{
    MemoryStore, PatternSource, PatternStore, Scorer, ScoringConfig, DEFAULT_SAMPLE_SIZE,
};
use anyhow::Context;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct ScoreOutput {
    pub scored: Vec<ScoredAd>,
    pub successful: usize,
    pub pattern_source: PatternSource,
    pub patterns: PatternReport,
}

/// Score `ads` and mine patterns from the successful ones.
///
/// Ads keep their input order.
pub(crate) async fn score_ads(ads: &[RawAd], threshold: Option<u8>) -> ScoreOutput {
    let mut config = ScoringConfig::default();
    if let Some(threshold) = threshold {
        config.success_threshold = threshold;
    }

    let store = MemoryStore::new();
    let scorer = Scorer::new(store.clone(), config);
    let scored = scorer.score_batch(ads).await;
    let successful = scorer.persist_successful(&scored).await;

    let (patterns, pattern_source) = PatternStore::new(store, DEFAULT_SAMPLE_SIZE)
        .resolve(false)
        .await;

    ScoreOutput {
        scored,
        successful,
        pattern_source,
        patterns,
    }
}

/// Read `input`, score it and print the result as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of ads.
pub(crate) async fn run_score(input: &Path, threshold: Option<u8>) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let ads: Vec<RawAd> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of ads", input.display()))?;

    tracing::info!(ads = ads.len(), path = %input.display(), "scoring ads");
    let output = score_ads(&ads, threshold).await;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
