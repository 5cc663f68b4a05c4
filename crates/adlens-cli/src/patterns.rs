use adlens_core::{AppConfig, PatternReport};
use adlens_db::PgStore;
use adlens_scoring::{PatternSource, PatternStore, MIN_CORPUS_SIZE};

/// One-line summary of where a report came from and what it holds.
pub(crate) fn summarize(report: &PatternReport, source: PatternSource) -> String {
    if report.is_empty() {
        return format!(
            "no patterns yet: at least {MIN_CORPUS_SIZE} successful ads with text are needed"
        );
    }
    let origin = match source {
        PatternSource::Cache => "cached",
        PatternSource::Recomputed => "recomputed",
        PatternSource::Empty => "empty",
    };
    format!(
        "{origin} report over {} ad(s), {} common term(s)",
        report.analyzed_ads,
        report.common_terms.len()
    )
}

/// Print the pattern report as JSON, with a summary on stderr.
///
/// # Errors
///
/// Returns an error only if the report cannot be serialized.
pub(crate) async fn run_patterns(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    refresh: bool,
) -> anyhow::Result<()> {
    let patterns = PatternStore::new(PgStore::new(pool.clone()), config.pattern_sample_size);
    let (report, source) = patterns.resolve(refresh).await;
    eprintln!("{}", summarize(&report, source));
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
