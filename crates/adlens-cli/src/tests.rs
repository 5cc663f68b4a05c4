use std::path::PathBuf;

use adlens_core::RawAd;
use adlens_scoring::PatternSource;
use clap::Parser;

use super::{Cli, Commands};
use crate::patterns::summarize;
use crate::score::score_ads;

const SAMPLE_ADS: &str = include_str!("../fixtures/sample_ads.json");

fn sample_ads() -> Vec<RawAd> {
    serde_json::from_str(SAMPLE_ADS).expect("fixture parses")
}

#[test]
fn cli_parses_score_command() {
    let cli = Cli::try_parse_from([
        "adlens-cli",
        "score",
        "--input",
        "ads.json",
        "--threshold",
        "60",
    ])
    .expect("score command should parse");

    assert!(matches!(
        cli.command,
        Some(Commands::Score { ref input, threshold: Some(60) }) if *input == PathBuf::from("ads.json")
    ));
}

#[test]
fn cli_rejects_threshold_above_100() {
    let result = Cli::try_parse_from([
        "adlens-cli",
        "score",
        "--input",
        "ads.json",
        "--threshold",
        "101",
    ]);
    assert!(result.is_err());
}

#[test]
fn cli_score_requires_input() {
    assert!(Cli::try_parse_from(["adlens-cli", "score"]).is_err());
}

#[test]
fn cli_parses_search_with_default_limit() {
    let cli = Cli::try_parse_from(["adlens-cli", "search", "running shoes"])
        .expect("search command should parse");

    assert!(matches!(
        cli.command,
        Some(Commands::Search { ref keyword, limit: 25 }) if keyword == "running shoes"
    ));
}

#[test]
fn cli_parses_search_limit() {
    let cli = Cli::try_parse_from(["adlens-cli", "search", "boots", "--limit", "5"])
        .expect("search command should parse");

    assert!(matches!(cli.command, Some(Commands::Search { limit: 5, .. })));
}

#[test]
fn cli_parses_patterns_refresh_flag() {
    let cli = Cli::try_parse_from(["adlens-cli", "patterns", "--refresh"])
        .expect("patterns command should parse");
    assert!(matches!(cli.command, Some(Commands::Patterns { refresh: true })));

    let cli = Cli::try_parse_from(["adlens-cli", "patterns"]).expect("patterns should parse");
    assert!(matches!(cli.command, Some(Commands::Patterns { refresh: false })));
}

#[test]
fn cli_parses_migrate_and_no_command() {
    let cli = Cli::try_parse_from(["adlens-cli", "migrate"]).expect("migrate should parse");
    assert!(matches!(cli.command, Some(Commands::Migrate)));

    let cli = Cli::try_parse_from(["adlens-cli"]).expect("bare invocation should parse");
    assert!(cli.command.is_none());
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["adlens-cli", "publish"]).is_err());
}

#[tokio::test]
async fn score_ads_separates_strong_and_weak_ads() {
    let ads = sample_ads();
    let output = score_ads(&ads, None).await;

    assert_eq!(output.scored.len(), ads.len());
    let ids: Vec<&str> = output.scored.iter().map(|s| s.ad.id.as_str()).collect();
    assert_eq!(ids[0], "1001", "input order is preserved");

    let weak = output
        .scored
        .iter()
        .find(|s| s.ad.id == "2001")
        .expect("weak ad scored");
    assert!(weak.success_score < 50, "weak ad scored {}", weak.success_score);
    for strong in output.scored.iter().filter(|s| s.ad.id != "2001") {
        assert!(
            strong.success_score >= 50,
            "ad {} scored {}",
            strong.ad.id,
            strong.success_score
        );
    }
    assert_eq!(output.successful, 6);
}

#[tokio::test]
async fn score_ads_mines_patterns_from_successful_ads() {
    let output = score_ads(&sample_ads(), None).await;

    assert!(matches!(output.pattern_source, PatternSource::Recomputed));
    assert_eq!(output.patterns.analyzed_ads, 6);
    assert!(output.patterns.common_terms.len() <= 20);
    assert!(output
        .patterns
        .common_terms
        .iter()
        .all(|t| t.count > 1 && t.term.chars().count() >= 3));
    assert!(output
        .patterns
        .common_terms
        .iter()
        .any(|t| t.term == "shipping"));
    assert!(output.patterns.structure_patterns.contains_key("cta_presence_rate"));
}

#[tokio::test]
async fn score_ads_with_high_threshold_yields_empty_report() {
    let output = score_ads(&sample_ads(), Some(100)).await;

    assert_eq!(output.successful, 0);
    assert!(matches!(output.pattern_source, PatternSource::Empty));
    assert!(output.patterns.is_empty());
}

#[tokio::test]
async fn score_ads_on_empty_input() {
    let output = score_ads(&[], None).await;

    assert!(output.scored.is_empty());
    assert_eq!(output.successful, 0);
    assert!(matches!(output.pattern_source, PatternSource::Empty));
}

#[tokio::test]
async fn pattern_summary_reports_empty_and_recomputed_reports() {
    let empty = score_ads(&[], None).await;
    assert!(summarize(&empty.patterns, empty.pattern_source).starts_with("no patterns yet"));

    let mined = score_ads(&sample_ads(), None).await;
    let line = summarize(&mined.patterns, mined.pattern_source);
    assert!(line.starts_with("recomputed report over 6 ad(s)"), "{line}");
}
