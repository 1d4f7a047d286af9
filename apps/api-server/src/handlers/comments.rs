//! Comment handlers. Lists come back threaded.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::{Comment, Counter, Notification, NotificationKind};
use nearly_core::ports::BaseRepository;
use nearly_core::threading::thread_comments;
use nearly_shared::dto::CreateCommentRequest;

use super::notify;
use super::target::Target;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/comments/{kind}/{id}
pub async fn list(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<(String, Uuid)>,
) -> AppResult<HttpResponse> {
    let (kind, id) = path.into_inner();
    let kind = Target::parse_kind(&kind)?;

    let comments = state.repos.comments.list_for_target(kind, id).await?;
    Ok(HttpResponse::Ok().json(thread_comments(comments)))
}

/// POST /api/comments/{kind}/{id}
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, Uuid)>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let (kind, id) = path.into_inner();
    let kind = Target::parse_kind(&kind)?;
    let req = body.into_inner();

    let mut target = Target::load(&state, kind, id).await?;

    if let Some(parent_id) = req.parent_comment_id {
        let parent = state
            .repos
            .comments
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::not_found("Parent comment"))?;
        if parent.target_kind != kind || parent.target_id != id {
            return Err(AppError::BadRequest(
                "Parent comment belongs to different content".to_string(),
            ));
        }
    }

    let comment = Comment::new(kind, id, identity.user_id, req.parent_comment_id, &req.body)?;
    let comment = state.repos.comments.save(comment).await?;

    let owner_id = target.owner_id();
    target.bump(&state, Counter::Comments, 1).await?;

    tracing::info!(
        comment_id = %comment.id,
        target_kind = %kind,
        target_id = %id,
        reply = comment.is_reply(),
        "Comment added"
    );

    let notification = Notification::for_actor(
        owner_id,
        identity.user_id,
        NotificationKind::Comment,
        "New comment on your post",
    )
    .map(|n| n.with_body(comment.body.clone()).with_target(kind, id));
    notify(&state, notification).await;

    Ok(HttpResponse::Created().json(comment))
}
