//! Media registration, upload planning and video streaming info.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::{Media, MediaType, TranscodeUpdate, UploadStrategy};
use nearly_core::ports::BaseRepository;
use nearly_shared::dto::{RegisterMediaRequest, UploadPlanRequest, UploadPlanResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn load(state: &AppState, id: Uuid) -> AppResult<Media> {
    state
        .repos
        .media
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Media"))
}

/// POST /api/media
pub async fn register(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<RegisterMediaRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let media = Media::new(
        identity.user_id,
        &req.file_name,
        req.content_type.as_deref(),
        req.size_bytes,
        &req.url,
        req.thumbnail_url,
    )?;
    let media = state.repos.media.save(media).await?;

    tracing::info!(
        media_id = %media.id,
        media_type = %media.media_type,
        size_bytes = media.size_bytes,
        "Media registered"
    );
    Ok(HttpResponse::Created().json(media))
}

/// POST /api/media/uploads
pub async fn upload_plan(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<UploadPlanRequest>,
) -> AppResult<HttpResponse> {
    let limit = state.config.direct_upload_limit;
    Ok(HttpResponse::Ok().json(UploadPlanResponse {
        strategy: UploadStrategy::for_size(body.size_bytes, limit),
        media_type: MediaType::classify(body.content_type.as_deref(), &body.file_name),
        direct_limit_bytes: limit,
    }))
}

/// PATCH /api/media/{id}/transcode - transcoder progress, reported by the owner.
pub async fn transcode(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<TranscodeUpdate>,
) -> AppResult<HttpResponse> {
    let mut media = load(&state, path.into_inner()).await?;
    if media.owner_id != identity.user_id {
        return Err(AppError::Forbidden("Not the owner of this media".to_string()));
    }

    media.apply_transcode(body.into_inner())?;
    let media = state.repos.media.save(media).await?;

    tracing::info!(media_id = %media.id, status = %media.transcode_status, "Transcode updated");
    Ok(HttpResponse::Ok().json(media))
}

/// GET /api/streaming/videos/{media_id}
pub async fn video_info(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let media = load(&state, path.into_inner()).await?;
    let descriptor = media
        .video_descriptor()
        .ok_or_else(|| AppError::not_found("Video"))?;
    Ok(HttpResponse::Ok().json(descriptor))
}
