//! Activity feed handlers (activities, questions, discussions).

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::{Activity, Page};
use nearly_core::ports::BaseRepository;
use nearly_shared::dto::{ActivityQuery, CreateActivityRequest, ListResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/activities?kind=&limit=&offset=
pub async fn list(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<ActivityQuery>,
) -> AppResult<HttpResponse> {
    let page = Page::new(query.limit, query.offset);
    let items = state.repos.activities.list(query.kind, page).await?;
    Ok(HttpResponse::Ok().json(ListResponse::new(items, page)))
}

/// POST /api/activities
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateActivityRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let activity = Activity::new(
        identity.user_id,
        req.kind,
        &req.title,
        &req.body,
        req.location,
    )?;
    let activity = state.repos.activities.save(activity).await?;

    tracing::info!(activity_id = %activity.id, kind = %activity.kind, "Activity posted");
    Ok(HttpResponse::Created().json(activity))
}

/// GET /api/activities/{id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let activity = state
        .repos
        .activities
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Activity"))?;
    Ok(HttpResponse::Ok().json(activity))
}
