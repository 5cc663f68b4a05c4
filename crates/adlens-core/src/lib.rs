//! Shared domain types and configuration for the adlens workspace.

pub mod ads;
pub mod app_config;
pub mod config;
pub mod patterns;

use thiserror::Error;

pub use ads::{ComponentScores, DemographicEntry, ExtractedMetrics, RawAd, ScoredAd};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use patterns::{PatternReport, TermPattern};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
