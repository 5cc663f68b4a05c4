//! `search` command: fetch, score, persist and refresh patterns.

use adlens_core::AppConfig;
use adlens_db::PgStore;
use adlens_scoring::{spawn_pattern_refresh, PatternStore, Scorer, ScoringConfig};
use adlens_source::AdLibraryClient;

/// Truncate to `max` characters for table output.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max.saturating_sub(1)).collect();
    clipped.push('\u{2026}');
    clipped
}

/// # Errors
///
/// Returns an error if no access token is configured or the ad library
/// request fails. Storage failures are logged and do not fail the command.
pub(crate) async fn run_search(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    keyword: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let client = AdLibraryClient::from_app_config(config)?.ok_or_else(|| {
        anyhow::anyhow!("AD_LIBRARY_ACCESS_TOKEN is not set; cannot search the ad library")
    })?;

    let ads = client.search_ads(keyword, limit).await?;
    if ads.is_empty() {
        println!("no ads found for '{keyword}'");
        return Ok(());
    }

    let store = PgStore::new(pool.clone());
    let scorer = Scorer::new(
        store.clone(),
        ScoringConfig {
            success_threshold: config.success_threshold,
            ..ScoringConfig::default()
        },
    );
    let mut scored = scorer.score_batch(&ads).await;
    scored.sort_by(|a, b| b.success_score.cmp(&a.success_score));
    let persisted = scorer.persist_successful(&scored).await;

    println!("{:<20} {:>5}  {:<30} BODY", "AD ID", "SCORE", "PAGE");
    for ad in &scored {
        println!(
            "{:<20} {:>5}  {:<30} {}",
            clip(&ad.ad.id, 20),
            ad.success_score,
            clip(ad.ad.page_name.as_deref().unwrap_or("-"), 30),
            clip(&ad.ad.body_text(), 60),
        );
    }
    println!(
        "\n{} ad(s) scored, {persisted} at or above {}",
        scored.len(),
        config.success_threshold
    );

    // The CLI waits for the refresh so the process does not exit mid-write.
    let refresh = spawn_pattern_refresh(PatternStore::new(store, config.pattern_sample_size));
    if let Err(e) = refresh.await {
        tracing::warn!(error = %e, "pattern refresh task failed");
    }
    Ok(())
}
