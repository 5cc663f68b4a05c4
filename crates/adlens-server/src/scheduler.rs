//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the daily
//! pattern maintenance job.

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Every day at 03:00 UTC.
const PATTERN_REFRESH_SCHEDULE: &str = "0 0 3 * * *";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(state: AppState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_pattern_refresh_job(&scheduler, state).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the daily pattern refresh.
///
/// Prunes expired cache rows and scores past the freshness window, then
/// recomputes the pattern report from the current successful ads.
async fn register_pattern_refresh_job(
    scheduler: &JobScheduler,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(PATTERN_REFRESH_SCHEDULE, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting daily pattern refresh");
            run_pattern_refresh(&state).await;
            tracing::info!("scheduler: daily pattern refresh complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn run_pattern_refresh(state: &AppState) {
    let now = Utc::now();

    match adlens_db::delete_expired_pattern_cache(&state.pool, now).await {
        Ok(removed) => tracing::info!(removed, "scheduler: pruned expired pattern cache rows"),
        Err(e) => tracing::warn!(error = %e, "scheduler: failed to prune pattern cache"),
    }

    let freshness = state.scorer().config().freshness_window;
    match chrono::Duration::from_std(freshness) {
        Ok(window) => match adlens_db::delete_stale_ad_scores(&state.pool, now - window).await {
            Ok(removed) => tracing::info!(removed, "scheduler: pruned stale ad scores"),
            Err(e) => tracing::warn!(error = %e, "scheduler: failed to prune ad scores"),
        },
        Err(e) => tracing::warn!(error = %e, "scheduler: freshness window out of range"),
    }

    match state.pattern_store().recompute().await {
        Some(report) => tracing::info!(
            analyzed_ads = report.analyzed_ads,
            terms = report.common_terms.len(),
            "scheduler: pattern report refreshed"
        ),
        None => tracing::info!("scheduler: not enough successful ads for a pattern report"),
    }
}
