//! Entry point for the Nearly HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use nearly_api::telemetry::{TelemetryConfig, init_telemetry};
use nearly_api::{AppConfig, AppState, configure_routes};
use nearly_infra::InMemoryCache;

#[cfg(feature = "rate-limit")]
use nearly_infra::InMemoryRateLimiter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    let (host, port) = (config.host.clone(), config.port);

    tracing::info!(host = %host, port, "Starting Nearly API server");

    let cache = Arc::new(InMemoryCache::new());
    let state = AppState::new(config, cache.clone()).await;

    #[cfg(feature = "rate-limit")]
    let limiter = Arc::new(InMemoryRateLimiter::from_env());
    #[cfg(feature = "rate-limit")]
    let state = state.with_rate_limiter(limiter.clone());

    #[cfg(all(feature = "scheduler", feature = "rate-limit"))]
    let background = start_background(cache, limiter).await;
    #[cfg(all(feature = "scheduler", not(feature = "rate-limit")))]
    let background = start_background(cache).await;
    #[cfg(feature = "scheduler")]
    let mut scheduler = match background {
        Ok(scheduler) => Some(scheduler),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start maintenance jobs");
            None
        }
    };
    #[cfg(not(feature = "scheduler"))]
    drop(cache);

    tracing::info!(storage = state.storage(), "Ready to accept connections");

    let served = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    #[cfg(feature = "scheduler")]
    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Maintenance jobs did not stop cleanly");
        }
    }

    served
}

#[cfg(feature = "scheduler")]
async fn start_background(
    cache: Arc<InMemoryCache>,
    #[cfg(feature = "rate-limit")] limiter: Arc<InMemoryRateLimiter>,
) -> Result<nearly_api::background::Scheduler, tokio_cron_scheduler::JobSchedulerError> {
    use nearly_api::background::{SchedulerConfig, maintenance};

    let mut scheduler = maintenance(SchedulerConfig::from_env(), cache).await?;
    #[cfg(feature = "rate-limit")]
    nearly_api::background::shrink_rate_limiter(&mut scheduler, limiter).await?;
    scheduler.start().await?;
    Ok(scheduler)
}
