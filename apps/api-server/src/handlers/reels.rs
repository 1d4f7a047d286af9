//! Reels feed handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::{Counter, MediaType, Reel};
use nearly_core::ports::{BaseRepository, CounterRepository};
use nearly_shared::dto::{CreateReelRequest, ListResponse, PageQuery, ReelResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn with_video(state: &AppState, reel: Reel) -> AppResult<ReelResponse> {
    let video = state
        .repos
        .media
        .find_by_id(reel.media_id)
        .await?
        .and_then(|m| m.video_descriptor());
    if video.is_none() {
        tracing::warn!(reel_id = %reel.id, media_id = %reel.media_id, "Reel without playable video");
    }
    Ok(ReelResponse { reel, video })
}

/// GET /api/reels/config - player tunables. Public.
pub async fn playback_config(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.config.playback)
}

/// GET /api/reels
pub async fn list(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let reels = state.repos.reels.list(page).await?;

    let mut items = Vec::with_capacity(reels.len());
    for reel in reels {
        items.push(with_video(&state, reel).await?);
    }
    Ok(HttpResponse::Ok().json(ListResponse::new(items, page)))
}

/// POST /api/reels - publish one of the caller's own videos.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateReelRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let media = state
        .repos
        .media
        .find_by_id(req.media_id)
        .await?
        .ok_or_else(|| AppError::not_found("Media"))?;
    if media.owner_id != identity.user_id {
        return Err(AppError::Forbidden("Not the owner of this media".to_string()));
    }
    if media.media_type != MediaType::Video {
        return Err(AppError::BadRequest("A reel needs a video".to_string()));
    }

    let reel = Reel::new(identity.user_id, media.id, req.caption)?;
    let reel = state.repos.reels.save(reel).await?;

    tracing::info!(reel_id = %reel.id, media_id = %media.id, "Reel published");
    Ok(HttpResponse::Created().json(ReelResponse {
        reel,
        video: media.video_descriptor(),
    }))
}

/// POST /api/reels/{id}/view
pub async fn record_view(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut reel = state
        .repos
        .reels
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Reel"))?;

    reel.views_count = state.repos.reels.bump(reel.id, Counter::Views, 1).await?;
    Ok(HttpResponse::Ok().json(reel))
}
