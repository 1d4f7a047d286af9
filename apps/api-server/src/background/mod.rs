//! Periodic housekeeping for the in-process cache and rate limiter.

pub mod scheduler;

use std::sync::Arc;

use tokio_cron_scheduler::JobSchedulerError;

use nearly_infra::InMemoryCache;
#[cfg(feature = "rate-limit")]
use nearly_infra::InMemoryRateLimiter;

pub use scheduler::{EVERY_MINUTE, Scheduler, SchedulerConfig};

/// Register the cache purge job. Call `Scheduler::start` afterwards and keep
/// the scheduler alive for as long as the jobs should run.
pub async fn maintenance(
    config: SchedulerConfig,
    cache: Arc<InMemoryCache>,
) -> Result<Scheduler, JobSchedulerError> {
    let schedule = config.cache_purge.clone();
    let mut scheduler = Scheduler::new(config).await?;

    scheduler
        .add_cron("purge-expired-cache", &schedule, move || {
            let cache = cache.clone();
            async move {
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Expired cache entries removed");
                }
            }
        })
        .await?;

    Ok(scheduler)
}

/// Drop rate limiter buckets that have refilled completely.
#[cfg(feature = "rate-limit")]
pub async fn shrink_rate_limiter(
    scheduler: &mut Scheduler,
    limiter: Arc<InMemoryRateLimiter>,
) -> Result<(), JobSchedulerError> {
    let schedule = scheduler.config().limiter_shrink.clone();
    scheduler
        .add_cron("shrink-rate-limiter", &schedule, move || {
            let limiter = limiter.clone();
            async move { limiter.shrink() }
        })
        .await
        .map(drop)
}
