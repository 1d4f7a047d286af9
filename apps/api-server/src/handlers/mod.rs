//! HTTP handlers and route configuration.

mod activities;
mod auth;
mod comments;
mod engagements;
mod events;
mod groups;
mod health;
mod media;
mod messages;
mod news;
mod notifications;
mod polls;
mod reels;
mod target;
mod users;

use actix_web::{HttpRequest, error, web};

use nearly_core::domain::Notification;
use nearly_core::ports::BaseRepository;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimit;
use crate::state::AppState;

/// Store a side-effect notification. Failures are logged, never surfaced.
pub(crate) async fn notify(state: &AppState, notification: Option<Notification>) {
    let Some(notification) = notification else {
        return;
    };
    let recipient = notification.user_id;
    if let Err(e) = state.repos.notifications.save(notification).await {
        tracing::warn!(user_id = %recipient, error = %e, "Failed to store notification");
    }
}

fn bad_request<E: std::fmt::Display>(err: E, _req: &HttpRequest) -> error::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(bad_request::<error::JsonPayloadError>))
        .app_data(web::PathConfig::default().error_handler(bad_request::<error::PathError>))
        .app_data(
            web::QueryConfig::default().error_handler(bad_request::<error::QueryPayloadError>),
        )
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                .route("/reels/config", web::get().to(reels::playback_config))
                .service(
                    web::scope("/auth")
                        .wrap(RateLimit)
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/refresh", web::post().to(auth::refresh))
                        .route("/logout", web::post().to(auth::logout))
                        .route("/forgot-password", web::post().to(auth::forgot_password))
                        .route("/verify-otp", web::post().to(auth::verify_otp))
                        .route("/reset-password", web::post().to(auth::reset_password))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/users")
                        .route("/me", web::patch().to(users::update_me))
                        .route("/{id}", web::get().to(users::get_user)),
                )
                .service(
                    web::scope("/activities")
                        .route("", web::get().to(activities::list))
                        .route("", web::post().to(activities::create))
                        .route("/{id}", web::get().to(activities::get)),
                )
                .service(
                    web::scope("/events")
                        .route("", web::get().to(events::list))
                        .route("", web::post().to(events::create))
                        .route("/{id}", web::get().to(events::get))
                        .route("/{id}/rsvp", web::post().to(events::rsvp))
                        .route("/{id}/guests", web::get().to(events::guests)),
                )
                .service(
                    web::scope("/groups")
                        .route("", web::get().to(groups::list))
                        .route("", web::post().to(groups::create))
                        .route("/{id}", web::get().to(groups::get))
                        .route("/{id}/join", web::post().to(groups::join))
                        .route("/{id}/leave", web::post().to(groups::leave))
                        .route("/{id}/members", web::get().to(groups::members)),
                )
                .service(
                    web::scope("/news")
                        .route("", web::get().to(news::list))
                        .route("", web::post().to(news::create))
                        .route("/{id}", web::get().to(news::get)),
                )
                .service(
                    web::scope("/polls")
                        .route("", web::get().to(polls::list))
                        .route("", web::post().to(polls::create))
                        .route("/{id}", web::get().to(polls::get))
                        .route("/{id}/vote", web::post().to(polls::vote)),
                )
                .service(
                    web::resource("/comments/{kind}/{id}")
                        .route(web::get().to(comments::list))
                        .route(web::post().to(comments::create)),
                )
                .service(
                    web::resource("/engagements/{kind}/{id}/{action}")
                        .route(web::post().to(engagements::set))
                        .route(web::delete().to(engagements::unset)),
                )
                .route("/engagements/me", web::get().to(engagements::mine))
                .service(
                    web::scope("/messages")
                        .route("", web::get().to(messages::list))
                        .route("", web::post().to(messages::send))
                        .route("/{id}/read", web::post().to(messages::mark_read)),
                )
                .service(
                    web::scope("/notifications")
                        .route("", web::get().to(notifications::list))
                        .route("/read-all", web::post().to(notifications::mark_all_read))
                        .route("/{id}/read", web::post().to(notifications::mark_read)),
                )
                .service(
                    web::scope("/media")
                        .route("", web::post().to(media::register))
                        .route("/uploads", web::post().to(media::upload_plan))
                        .route("/{id}/transcode", web::patch().to(media::transcode)),
                )
                .route(
                    "/streaming/videos/{media_id}",
                    web::get().to(media::video_info),
                )
                .service(
                    web::scope("/reels")
                        .route("", web::get().to(reels::list))
                        .route("", web::post().to(reels::create))
                        .route("/{id}/view", web::post().to(reels::record_view)),
                ),
        );
}
