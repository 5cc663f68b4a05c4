//! Corpus analysis over successful ads: salient terms and structural rates.
//!
//! Pure functions of the input collection; nothing is kept between calls.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use adlens_core::{PatternReport, ScoredAd, TermPattern};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::json;

use crate::stopwords::is_stopword;

/// Fewer ads with text than this and there is no report.
pub const MIN_CORPUS_SIZE: usize = 5;
/// Terms kept per ad before cross-ad aggregation.
pub const TERMS_PER_DOCUMENT: usize = 10;
/// Cap on `common_terms`.
pub const MAX_COMMON_TERMS: usize = 20;
pub const MIN_TERM_CHARS: usize = 3;

pub const CTA_VOCABULARY: &[&str] = &[
    "shop", "buy", "get", "sign up", "learn", "discover", "try", "click", "visit", "join",
    "order", "call",
];

static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F300}-\x{1F5FF}",
        r"\x{1F600}-\x{1F64F}",
        r"\x{1F680}-\x{1F6FF}",
        r"\x{1F1E0}-\x{1F1FF}",
        r"\x{1F900}-\x{1F9FF}",
        r"\x{1FA70}-\x{1FAFF}",
        r"\x{2600}-\x{26FF}",
        r"\x{2700}-\x{27BF}",
        "]",
    ))
    .expect("valid regex")
});

/// Structural heuristics over a collection of ads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructurePatterns {
    /// Mean characters of concatenated creative bodies.
    pub average_text_length: i64,
    /// Percentages, 0–100.
    pub cta_presence_rate: i64,
    pub question_presence_rate: i64,
    pub emoji_presence_rate: i64,
}

impl StructurePatterns {
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, i64> {
        BTreeMap::from([
            ("average_text_length".to_string(), self.average_text_length),
            ("cta_presence_rate".to_string(), self.cta_presence_rate),
            ("question_presence_rate".to_string(), self.question_presence_rate),
            ("emoji_presence_rate".to_string(), self.emoji_presence_rate),
        ])
    }
}

/// Analyze `ads` at the current time. See [`analyze_at`].
#[must_use]
pub fn analyze(ads: &[ScoredAd]) -> Option<PatternReport> {
    analyze_at(ads, Utc::now())
}

/// Build a pattern report, or `None` when fewer than [`MIN_CORPUS_SIZE`]
/// ads carry any text.
#[must_use]
pub fn analyze_at(ads: &[ScoredAd], now: DateTime<Utc>) -> Option<PatternReport> {
    // Fixed processing order keeps float sums identical for any input order.
    let mut documents: Vec<(&str, String)> = ads
        .iter()
        .map(|ad| (ad.ad.id.as_str(), ad.ad.full_text()))
        .filter(|(_, text)| !text.is_empty())
        .collect();
    if documents.len() < MIN_CORPUS_SIZE {
        tracing::info!(
            available = documents.len(),
            required = MIN_CORPUS_SIZE,
            "insufficient ads with text for pattern analysis"
        );
        return None;
    }
    documents.sort();

    let tokenized: Vec<Vec<String>> = documents.iter().map(|(_, text)| tokenize(text)).collect();

    Some(PatternReport {
        common_terms: common_terms(&tokenized),
        structure_patterns: structure_patterns(ads).into_map(),
        visual_patterns: visual_placeholder(),
        analyzed_ads: ads.len(),
        computed_at: now,
    })
}

/// Lowercased alphanumeric runs, without stopwords or terms shorter than
/// [`MIN_TERM_CHARS`]. Filtered before TF and DF are counted.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_CHARS)
        .map(str::to_lowercase)
        .filter(|t| !is_stopword(t))
        .collect()
}

/// `1 + ln(N / (1 + df))`.
fn inverse_document_frequency(document_count: usize, containing: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let ratio = document_count as f64 / (1 + containing) as f64;
    1.0 + ratio.ln()
}

/// Top TF-IDF terms of one document, heaviest first, ties by term.
fn top_terms<'a>(
    document: &'a [String],
    document_frequency: &HashMap<&str, usize>,
    document_count: usize,
) -> Vec<(&'a str, f64)> {
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for token in document {
        *frequency.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut weighted: Vec<(&str, f64)> = frequency
        .into_iter()
        .map(|(term, tf)| {
            let df = document_frequency.get(term).copied().unwrap_or(0);
            #[allow(clippy::cast_precision_loss)]
            let weight = tf as f64 * inverse_document_frequency(document_count, df);
            (term, weight)
        })
        .collect();
    weighted.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    weighted.truncate(TERMS_PER_DOCUMENT);
    weighted
}

fn common_terms(documents: &[Vec<String>]) -> Vec<TermPattern> {
    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for document in documents {
        let mut seen: Vec<&str> = document.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *document_frequency.entry(term).or_insert(0) += 1;
        }
    }

    // term -> (documents with the term in their top list, summed weight)
    let mut aggregate: HashMap<&str, (usize, f64)> = HashMap::new();
    for document in documents {
        for (term, weight) in top_terms(document, &document_frequency, documents.len()) {
            let entry = aggregate.entry(term).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += weight;
        }
    }

    let mut terms: Vec<TermPattern> = aggregate
        .into_iter()
        .filter(|(_, (count, _))| *count > 1)
        .map(|(term, (count, sum))| {
            #[allow(clippy::cast_precision_loss)]
            let average_score = sum / count as f64;
            TermPattern {
                term: term.to_string(),
                count,
                average_score,
            }
        })
        .collect();
    terms.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| {
                b.average_score
                    .partial_cmp(&a.average_score)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.term.cmp(&b.term))
    });
    terms.truncate(MAX_COMMON_TERMS);
    terms
}

/// Rates and averages over the creative bodies of `ads`. All zero for an
/// empty collection.
#[must_use]
pub fn structure_patterns(ads: &[ScoredAd]) -> StructurePatterns {
    if ads.is_empty() {
        return StructurePatterns::default();
    }

    let bodies: Vec<String> = ads.iter().map(|ad| ad.ad.body_text()).collect();
    let total_chars: usize = bodies.iter().map(|b| b.chars().count()).sum();
    let with_cta = bodies.iter().filter(|b| has_call_to_action(b)).count();
    let with_question = bodies.iter().filter(|b| b.contains('?')).count();
    let with_emoji = bodies.iter().filter(|b| EMOJI.is_match(b)).count();

    #[allow(clippy::cast_precision_loss)]
    let n = ads.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let percent = |count: usize| round_to_i64(count as f64 / n * 100.0);

    #[allow(clippy::cast_precision_loss)]
    let average_text_length = round_to_i64(total_chars as f64 / n);

    StructurePatterns {
        average_text_length,
        cta_presence_rate: percent(with_cta),
        question_presence_rate: percent(with_question),
        emoji_presence_rate: percent(with_emoji),
    }
}

fn has_call_to_action(body: &str) -> bool {
    let lowered = body.to_lowercase();
    CTA_VOCABULARY.iter().any(|cta| lowered.contains(cta))
}

fn round_to_i64(value: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let rounded = value.round() as i64;
    rounded
}

/// Fixed placeholder values. Image and video analysis is not implemented,
/// and the payload says so.
#[must_use]
pub fn visual_placeholder() -> BTreeMap<String, serde_json::Value> {
    BTreeMap::from([
        ("image_presence_rate".to_string(), json!(0)),
        ("video_presence_rate".to_string(), json!(0)),
        ("carousel_presence_rate".to_string(), json!(0)),
        ("is_placeholder".to_string(), json!(true)),
        (
            "note".to_string(),
            json!("image and video analysis is not implemented; values are fixed placeholders"),
        ),
    ])
}

#[cfg(test)]
#[path = "corpus_test.rs"]
mod tests;
