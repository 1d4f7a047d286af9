//! Liveness and dependency status.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
    pub rate_limited_auth: bool,
    pub timestamp: String,
}

/// GET /api/health
///
/// 503 when a configured database is unreachable so load balancers stop
/// routing here.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = state.database_up().await;
    let healthy = database != Some(false);

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage(),
        database: database.map(|up| if up { "up" } else { "down" }),
        rate_limited_auth: state.rate_limiter.is_some(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
