mod patterns;
mod score;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "adlens-cli")]
#[command(about = "Score ads and mine creative patterns")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Score ads from a JSON file offline, without a database
    Score {
        /// Path to a JSON array of ad records
        #[arg(long)]
        input: PathBuf,
        /// Minimum score counted as successful (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,
    },
    /// Fetch ads from the ad library, score them and store the successful ones
    Search {
        keyword: String,
        /// Maximum number of ads to fetch
        #[arg(long, default_value = "25")]
        limit: usize,
    },
    /// Print the current pattern report
    Patterns {
        /// Recompute instead of reading the cache
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(std::env::var("ADLENS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())))?;
    // stdout carries JSON output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("adlens-cli: run with --help to list commands");
        return Ok(());
    };

    match command {
        Commands::Score { input, threshold } => score::run_score(&input, threshold).await,
        Commands::Migrate => {
            let (pool, _) = connect().await?;
            let applied = adlens_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Commands::Search { keyword, limit } => {
            let (pool, config) = connect().await?;
            search::run_search(&pool, &config, &keyword, limit).await
        }
        Commands::Patterns { refresh } => {
            let (pool, config) = connect().await?;
            patterns::run_patterns(&pool, &config, refresh).await
        }
    }
}

async fn connect() -> anyhow::Result<(sqlx::PgPool, adlens_core::AppConfig)> {
    let config = adlens_core::load_app_config()?;
    let pool_config = adlens_db::PoolConfig::from_app_config(&config);
    let pool = adlens_db::connect_pool(&config.database_url, pool_config).await?;
    Ok((pool, config))
}

#[cfg(test)]
mod tests;
