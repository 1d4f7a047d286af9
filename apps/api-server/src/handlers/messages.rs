//! Direct message handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::{Message, Notification, NotificationKind};
use nearly_core::ports::BaseRepository;
use nearly_shared::dto::{ListResponse, PageQuery, SendMessageRequest};

use super::notify;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/messages - sent and received, newest first.
pub async fn list(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let items = state
        .repos
        .messages
        .list_for_user(identity.user_id, page)
        .await?;
    Ok(HttpResponse::Ok().json(ListResponse::new(items, page)))
}

/// POST /api/messages
pub async fn send(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<SendMessageRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let recipient = state
        .repos
        .users
        .find_by_id(req.recipient_id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipient"))?;

    let message = Message::new(identity.user_id, recipient.id, &req.body)?;
    let message = state.repos.messages.save(message).await?;

    tracing::debug!(message_id = %message.id, recipient_id = %recipient.id, "Message sent");

    let notification = Notification::for_actor(
        recipient.id,
        identity.user_id,
        NotificationKind::Message,
        "New message",
    );
    notify(&state, notification).await;

    Ok(HttpResponse::Created().json(message))
}

/// POST /api/messages/{id}/read
pub async fn mark_read(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    // Messages between other users are reported as missing.
    let mut message = state
        .repos
        .messages
        .find_by_id(path.into_inner())
        .await?
        .filter(|m| m.involves(identity.user_id))
        .ok_or_else(|| AppError::not_found("Message"))?;

    message.mark_read(identity.user_id)?;
    let message = state.repos.messages.save(message).await?;
    Ok(HttpResponse::Ok().json(message))
}
