//! Like and save toggles.
//!
//! Setting a flag that is already set (or clearing one that is not) is a
//! no-op, so retried requests never move a counter twice.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::{
    ContentKind, Counter, Engagement, EngagementAction, Likeable, Notification, NotificationKind,
};
use nearly_core::error::RepoError;
use nearly_core::ports::BaseRepository;
use nearly_shared::dto::EngagementResponse;

use super::notify;
use super::target::Target;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn parse_path(path: (String, Uuid, String)) -> AppResult<(ContentKind, Uuid, EngagementAction)> {
    let (kind, id, action) = path;
    let kind = Target::parse_kind(&kind)?;
    let action = action.parse::<EngagementAction>()?;
    if action == EngagementAction::Vote {
        return Err(AppError::BadRequest(
            "Vote through POST /api/polls/{id}/vote".to_string(),
        ));
    }
    Ok((kind, id, action))
}

fn likes_of(target: &mut Target) -> Option<i64> {
    target.likeable().map(|l| l.likes_count())
}

/// POST /api/engagements/{kind}/{id}/{action}
pub async fn set(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, Uuid, String)>,
) -> AppResult<HttpResponse> {
    let (kind, id, action) = parse_path(path.into_inner())?;
    let mut target = Target::load(&state, kind, id).await?;

    if action == EngagementAction::Like && target.likeable().is_none() {
        return Err(AppError::BadRequest(format!("{kind} cannot be liked")));
    }

    let existing = state
        .repos
        .engagements
        .find(identity.user_id, kind, id, action)
        .await?;

    if existing.is_none() {
        let engagement = Engagement::new(identity.user_id, kind, id, action, None);
        match state.repos.engagements.save(engagement).await {
            Ok(_) => {
                if action == EngagementAction::Like {
                    apply_like(&state, &identity, &mut target, kind, id).await?;
                }
            }
            // Lost a race with an identical request; the flag is set either way.
            Err(RepoError::Constraint(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let count = match action {
        EngagementAction::Like => likes_of(&mut target),
        _ => None,
    };
    Ok(HttpResponse::Ok().json(EngagementResponse {
        target_kind: kind,
        target_id: id,
        action,
        active: true,
        count,
    }))
}

async fn apply_like(
    state: &AppState,
    identity: &Identity,
    target: &mut Target,
    kind: ContentKind,
    id: Uuid,
) -> AppResult<()> {
    let Some(likes) = target.bump(state, Counter::Likes, 1).await? else {
        return Ok(());
    };
    let owner_id = target.owner_id();

    tracing::debug!(
        target_kind = %kind,
        target_id = %id,
        user_id = %identity.user_id,
        likes,
        "Liked"
    );
    let notification = Notification::for_actor(
        owner_id,
        identity.user_id,
        NotificationKind::Like,
        "Someone liked your post",
    )
    .map(|n| n.with_target(kind, id));
    notify(state, notification).await;
    Ok(())
}

/// DELETE /api/engagements/{kind}/{id}/{action}
pub async fn unset(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, Uuid, String)>,
) -> AppResult<HttpResponse> {
    let (kind, id, action) = parse_path(path.into_inner())?;
    let mut target = Target::load(&state, kind, id).await?;

    let existing = state
        .repos
        .engagements
        .find(identity.user_id, kind, id, action)
        .await?;

    if let Some(engagement) = existing {
        match state.repos.engagements.delete(engagement.id).await {
            Ok(()) => {
                if action == EngagementAction::Like {
                    target.bump(&state, Counter::Likes, -1).await?;
                }
            }
            // Removed concurrently; nothing left to undo.
            Err(RepoError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let count = match action {
        EngagementAction::Like => likes_of(&mut target),
        _ => None,
    };
    Ok(HttpResponse::Ok().json(EngagementResponse {
        target_kind: kind,
        target_id: id,
        action,
        active: false,
        count,
    }))
}

/// GET /api/engagements/me - everything the caller has liked, saved or voted
/// on, for hydrating a client session.
pub async fn mine(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let engagements = state.repos.engagements.list_for_user(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(engagements))
}
