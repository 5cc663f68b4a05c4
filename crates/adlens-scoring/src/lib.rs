//! Ad success scoring and creative pattern mining.
//!
//! Turns raw Ad Library records into a 0-100 success score from four tiered
//! components, caches scores for a day, and mines the text of successful ads
//! for recurring terms and structural habits.

pub mod corpus;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod patterns;
pub mod range;
pub mod scorer;
pub mod store;

mod stopwords;

pub use corpus::{analyze, structure_patterns, StructurePatterns, MIN_CORPUS_SIZE};
pub use error::{ScoringError, StoreError};
pub use memory::MemoryStore;
pub use metrics::extract_metrics;
pub use patterns::{
    spawn_pattern_refresh, PatternSource, PatternStore, DEFAULT_SAMPLE_SIZE, PATTERN_CACHE_KEY,
    PATTERN_TTL,
};
pub use range::{parse_range, parse_range_with, RangeHeuristics};
pub use scorer::{compute_scored_ad, total_score, Scorer, ScoringConfig, SCORE_FRESHNESS};
pub use store::{CachedScore, PatternCache, ScoreStore, SuccessStore};
