use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let narrow = |var: &str, value: u64| -> Result<u32, ConfigError> {
        u32::try_from(value).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("ADLENS_ENV", "development"))?;

    let bind_raw = or_default("ADLENS_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "ADLENS_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("ADLENS_LOG_LEVEL", "info");

    let db_max_connections = narrow(
        "ADLENS_DB_MAX_CONNECTIONS",
        parse_num("ADLENS_DB_MAX_CONNECTIONS", "10")?,
    )?;
    let db_min_connections = narrow(
        "ADLENS_DB_MIN_CONNECTIONS",
        parse_num("ADLENS_DB_MIN_CONNECTIONS", "1")?,
    )?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADLENS_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_num("ADLENS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let ad_library_access_token = lookup("AD_LIBRARY_ACCESS_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    let ad_library_base_url = or_default("AD_LIBRARY_BASE_URL", "https://graph.facebook.com");
    let ad_library_api_version = or_default("AD_LIBRARY_API_VERSION", "v19.0");
    let ad_library_countries: Vec<String> = or_default("AD_LIBRARY_COUNTRIES", "US")
        .split(',')
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect();
    if ad_library_countries.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "AD_LIBRARY_COUNTRIES".to_string(),
            reason: "at least one country code is required".to_string(),
        });
    }
    let ad_library_request_timeout_secs = parse_num("AD_LIBRARY_REQUEST_TIMEOUT_SECS", "30")?;
    let ad_library_max_retries = narrow(
        "AD_LIBRARY_MAX_RETRIES",
        parse_num("AD_LIBRARY_MAX_RETRIES", "3")?,
    )?;
    let ad_library_retry_backoff_base_ms = parse_num("AD_LIBRARY_RETRY_BACKOFF_BASE_MS", "1000")?;

    let threshold_raw = parse_num("ADLENS_SUCCESS_THRESHOLD", "50")?;
    let success_threshold = u8::try_from(threshold_raw)
        .ok()
        .filter(|t| *t <= 100)
        .ok_or_else(|| ConfigError::InvalidEnvVar {
            var: "ADLENS_SUCCESS_THRESHOLD".to_string(),
            reason: format!("{threshold_raw} is outside 0..=100"),
        })?;
    let pattern_sample_size = usize::try_from(parse_num("ADLENS_PATTERN_SAMPLE_SIZE", "100")?)
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "ADLENS_PATTERN_SAMPLE_SIZE".to_string(),
            reason: e.to_string(),
        })?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        ad_library_access_token,
        ad_library_base_url,
        ad_library_api_version,
        ad_library_countries,
        ad_library_request_timeout_secs,
        ad_library_max_retries,
        ad_library_retry_backoff_base_ms,
        success_threshold,
        pattern_sample_size,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ADLENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
