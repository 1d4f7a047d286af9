//! Authentication handlers.
//!
//! Refresh tokens are tracked in the cache under `refresh:{jti}`; a token is
//! only accepted while its entry exists, so rotation and logout revoke it.

use std::time::Duration;

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::User;
use nearly_core::ports::BaseRepository;
use nearly_shared::dto::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, RefreshRequest,
    RegisterUserRequest, ResetPasswordRequest, ResetTokenResponse, UserResponse,
    VerifyOtpRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const OTP_TTL: Duration = Duration::from_secs(10 * 60);
/// Wrong codes allowed before the code is thrown away.
const MAX_OTP_ATTEMPTS: u64 = 5;
const RESET_TTL: Duration = Duration::from_secs(15 * 60);

fn refresh_key(jti: Uuid) -> String {
    format!("refresh:{jti}")
}

fn otp_key(email: &str) -> String {
    format!("otp:{email}")
}

fn otp_attempts_key(email: &str) -> String {
    format!("otp_attempts:{email}")
}

fn reset_key(token: &str) -> String {
    format!("reset:{token}")
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign an access/refresh pair and register the refresh token.
async fn issue_tokens(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access = state
        .tokens
        .generate_token(user.id, &user.email, vec!["user".to_string()])?;
    let refresh = state.tokens.generate_refresh_token(user.id, &user.email)?;

    let ttl = Duration::from_secs(state.tokens.refresh_expiration_seconds().max(0) as u64);
    state
        .cache
        .set(&refresh_key(refresh.jti), &user.id.to_string(), Some(ttl))
        .await?;

    Ok(AuthResponse::bearer(
        access.token,
        refresh.token,
        state.tokens.expiration_seconds(),
    ))
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    state.passwords.check_policy(&req.password)?;

    if state.repos.users.find_by_email(&normalize_email(&req.email)).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    if state.repos.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = User::new(req.email, req.username, password_hash)?;
    let user = state.repos.users.save(user).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(HttpResponse::Created().json(issue_tokens(&state, &user).await?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .repos
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Rejected login");
        return Err(invalid());
    }

    Ok(HttpResponse::Ok().json(issue_tokens(&state, &user).await?))
}

/// POST /api/auth/refresh
pub async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let claims = state.tokens.validate_refresh_token(&body.refresh_token)?;

    // Single use: a replayed refresh token finds nothing here.
    if state.cache.take(&refresh_key(claims.jti)).await?.is_none() {
        tracing::warn!(user_id = %claims.user_id, "Refresh token reused or revoked");
        return Err(AppError::Unauthorized("Token revoked".to_string()));
    }

    let user = state
        .repos
        .users
        .find_by_id(claims.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(HttpResponse::Ok().json(issue_tokens(&state, &user).await?))
}

/// POST /api/auth/logout
pub async fn logout(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let claims = state.tokens.validate_refresh_token(&body.refresh_token)?;
    state.cache.delete(&refresh_key(claims.jti)).await?;

    tracing::info!(user_id = %claims.user_id, "Logged out");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out")))
}

/// POST /api/auth/forgot-password
///
/// Always answers the same way so it does not reveal which accounts exist.
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    let email = normalize_email(&body.email);

    if let Some(user) = state.repos.users.find_by_email(&email).await? {
        let otp = state.passwords.one_time_code();
        state.cache.set(&otp_key(&email), &otp, Some(OTP_TTL)).await?;
        state.cache.delete(&otp_attempts_key(&email)).await?;
        // No mail delivery; the code only goes to the server log.
        tracing::info!(user_id = %user.id, otp = %otp, "Password reset code issued");
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "If the account exists, a reset code has been sent",
    )))
}

/// POST /api/auth/verify-otp
///
/// After `MAX_OTP_ATTEMPTS` wrong codes the pending code is deleted and a new
/// one has to be requested.
pub async fn verify_otp(
    state: web::Data<AppState>,
    body: web::Json<VerifyOtpRequest>,
) -> AppResult<HttpResponse> {
    let email = normalize_email(&body.email);
    let key = otp_key(&email);
    let invalid = || AppError::BadRequest("Invalid or expired code".to_string());

    let attempts_key = otp_attempts_key(&email);

    let expected = state.cache.get(&key).await.ok_or_else(invalid)?;
    if expected != body.otp.trim() {
        let attempts = state.cache.increment(&attempts_key, Some(OTP_TTL)).await?;
        if attempts >= MAX_OTP_ATTEMPTS {
            state.cache.delete(&key).await?;
            state.cache.delete(&attempts_key).await?;
            tracing::warn!(attempts, "Reset code discarded after repeated wrong guesses");
        }
        return Err(invalid());
    }
    // A concurrent correct guess may already have used the code.
    if state.cache.take(&key).await?.is_none() {
        return Err(invalid());
    }
    state.cache.delete(&attempts_key).await?;

    let user = state
        .repos
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    let reset_token = Uuid::new_v4().simple().to_string();
    state
        .cache
        .set(&reset_key(&reset_token), &user.id.to_string(), Some(RESET_TTL))
        .await?;

    Ok(HttpResponse::Ok().json(ResetTokenResponse {
        reset_token,
        expires_in: RESET_TTL.as_secs(),
    }))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    state.passwords.check_policy(&req.new_password)?;

    let invalid = || AppError::BadRequest("Invalid or expired reset token".to_string());
    let user_id = state
        .cache
        .take(&reset_key(&req.reset_token))
        .await?
        .and_then(|id| Uuid::parse_str(&id).ok())
        .ok_or_else(invalid)?;

    let mut user = state
        .repos
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(invalid)?;

    user.set_password_hash(state.passwords.hash(&req.new_password)?);
    state.repos.users.save(user).await?;

    tracing::info!(user_id = %user_id, "Password reset");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated")))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .repos
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(HttpResponse::Ok().json(UserResponse::own(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emails_are_matched_case_insensitively() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
        assert_eq!(otp_key(&normalize_email("Ann@example.com")), "otp:ann@example.com");
        assert_eq!(otp_attempts_key("ann@example.com"), "otp_attempts:ann@example.com");
    }

    #[test]
    fn test_cache_keys_are_namespaced() {
        let jti = Uuid::nil();
        assert_eq!(refresh_key(jti), format!("refresh:{jti}"));
        assert_eq!(reset_key("abc"), "reset:abc");
    }
}
