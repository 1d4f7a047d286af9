//! User profile handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::ProfileUpdate;
use nearly_core::ports::BaseRepository;
use nearly_shared::dto::UserResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/users/{id}
///
/// The email is only included when callers look at themselves.
pub async fn get_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let user = state
        .repos
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let body = if user.id == identity.user_id {
        UserResponse::own(&user)
    } else {
        UserResponse::public(&user)
    };
    Ok(HttpResponse::Ok().json(body))
}

/// PATCH /api/users/me
pub async fn update_me(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ProfileUpdate>,
) -> AppResult<HttpResponse> {
    let mut user = state
        .repos
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    user.apply_profile(body.into_inner())?;
    let user = state.repos.users.save(user).await?;

    tracing::debug!(user_id = %user.id, "Profile updated");
    Ok(HttpResponse::Ok().json(UserResponse::own(&user)))
}
