//! Pattern report produced by corpus analysis over successful ads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A term that is salient in at least two successful ads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermPattern {
    pub term: String,
    /// Number of ads in which the term is among the top TF-IDF terms.
    pub count: usize,
    /// Mean TF-IDF weight of the term across those ads.
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub common_terms: Vec<TermPattern>,
    pub structure_patterns: BTreeMap<String, i64>,
    pub visual_patterns: BTreeMap<String, serde_json::Value>,
    /// Number of ads the report was computed from.
    #[serde(default)]
    pub analyzed_ads: usize,
    pub computed_at: DateTime<Utc>,
}

impl PatternReport {
    /// A report with no terms and empty structural/visual maps.
    #[must_use]
    pub fn empty(computed_at: DateTime<Utc>) -> Self {
        Self {
            common_terms: Vec::new(),
            structure_patterns: BTreeMap::new(),
            visual_patterns: BTreeMap::new(),
            analyzed_ads: 0,
            computed_at,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.common_terms.is_empty() && self.structure_patterns.is_empty()
    }
}
