//! Notification handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::Page;
use nearly_core::ports::BaseRepository;
use nearly_shared::dto::{ListResponse, MarkAllReadResponse, NotificationQuery};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/notifications?unread_only=
pub async fn list(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<NotificationQuery>,
) -> AppResult<HttpResponse> {
    let page = Page::new(query.limit, query.offset);
    let items = state
        .repos
        .notifications
        .list_for_user(identity.user_id, query.unread_only, page)
        .await?;
    Ok(HttpResponse::Ok().json(ListResponse::new(items, page)))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut notification = state
        .repos
        .notifications
        .find_by_id(path.into_inner())
        .await?
        .filter(|n| n.user_id == identity.user_id)
        .ok_or_else(|| AppError::not_found("Notification"))?;

    notification.mark_read();
    let notification = state.repos.notifications.save(notification).await?;
    Ok(HttpResponse::Ok().json(notification))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let updated = state
        .repos
        .notifications
        .mark_all_read(identity.user_id)
        .await?;

    tracing::debug!(user_id = %identity.user_id, updated, "Notifications marked read");
    Ok(HttpResponse::Ok().json(MarkAllReadResponse { updated }))
}
