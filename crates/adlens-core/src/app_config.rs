use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Access token for the ad library. Search is unavailable without it.
    pub ad_library_access_token: Option<String>,
    pub ad_library_base_url: String,
    pub ad_library_api_version: String,
    /// ISO country codes passed as `ad_reached_countries`.
    pub ad_library_countries: Vec<String>,
    pub ad_library_request_timeout_secs: u64,
    pub ad_library_max_retries: u32,
    pub ad_library_retry_backoff_base_ms: u64,
    /// Minimum success score for an ad to be persisted as successful.
    pub success_threshold: u8,
    /// How many top-scoring ads feed a pattern recompute.
    pub pattern_sample_size: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "ad_library_access_token",
                &self.ad_library_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("ad_library_base_url", &self.ad_library_base_url)
            .field("ad_library_api_version", &self.ad_library_api_version)
            .field("ad_library_countries", &self.ad_library_countries)
            .field(
                "ad_library_request_timeout_secs",
                &self.ad_library_request_timeout_secs,
            )
            .field("ad_library_max_retries", &self.ad_library_max_retries)
            .field(
                "ad_library_retry_backoff_base_ms",
                &self.ad_library_retry_backoff_base_ms,
            )
            .field("success_threshold", &self.success_threshold)
            .field("pattern_sample_size", &self.pattern_sample_size)
            .finish()
    }
}
