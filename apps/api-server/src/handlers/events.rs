//! Event handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use nearly_core::domain::{
    ContentKind, Counter, Event, EventGuest, GuestStatus, Notification, NotificationKind,
};
use nearly_core::ports::{BaseRepository, CounterRepository};
use nearly_shared::dto::{CreateEventRequest, ListResponse, PageQuery, RsvpRequest};

use super::notify;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn load(state: &AppState, id: Uuid) -> AppResult<Event> {
    state
        .repos
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event"))
}

/// GET /api/events - upcoming events, soonest first.
pub async fn list(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let items = state.repos.events.list_upcoming(Utc::now(), page).await?;
    Ok(HttpResponse::Ok().json(ListResponse::new(items, page)))
}

/// POST /api/events
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateEventRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let event = Event::new(
        identity.user_id,
        &req.title,
        &req.description,
        req.location,
        req.starts_at,
        req.ends_at,
        req.capacity,
    )?;
    let event = state.repos.events.save(event).await?;

    tracing::info!(event_id = %event.id, host_id = %event.host_id, "Event created");
    Ok(HttpResponse::Created().json(event))
}

/// GET /api/events/{id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let event = load(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(event))
}

/// POST /api/events/{id}/rsvp
///
/// Creates or updates the caller's guest row and keeps `guests_count` equal
/// to the number of `going` guests.
pub async fn rsvp(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<RsvpRequest>,
) -> AppResult<HttpResponse> {
    let event = load(&state, path.into_inner()).await?;
    let status = body.status;

    let existing = state
        .repos
        .event_guests
        .find(event.id, identity.user_id)
        .await?;
    let previous = existing.as_ref().map(|g| g.status);

    let delta = GuestStatus::seat_delta(previous, status);
    let guests = take_seats(&state, &event, delta).await?;

    let guest = match existing {
        Some(mut guest) => {
            guest.status = status;
            guest
        }
        None => EventGuest::new(event.id, identity.user_id, status),
    };
    let guest = match state.repos.event_guests.save(guest).await {
        Ok(guest) => guest,
        Err(e) => {
            if delta != 0 {
                state.repos.events.bump(event.id, Counter::Guests, -delta).await?;
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        event_id = %event.id,
        user_id = %identity.user_id,
        status = %status,
        guests,
        "RSVP recorded"
    );

    if previous != Some(status) && status != GuestStatus::Declined {
        let notification = Notification::for_actor(
            event.host_id,
            identity.user_id,
            NotificationKind::Rsvp,
            format!("New RSVP for {}", event.title),
        )
        .map(|n| n.with_body(status.as_str()).with_target(ContentKind::Event, event.id));
        notify(&state, notification).await;
    }

    Ok(HttpResponse::Ok().json(guest))
}

/// Moves `guests_count` by `delta` in one update. A new seat on a capped
/// event is refused once the headcount reaches capacity.
async fn take_seats(state: &AppState, event: &Event, delta: i64) -> AppResult<i64> {
    let events = &state.repos.events;
    match (delta, event.capacity) {
        (0, _) => Ok(event.guests_count),
        (1, Some(capacity)) => events
            .bump_capped(event.id, Counter::Guests, capacity)
            .await?
            .ok_or_else(|| AppError::Forbidden("Event is full".to_string())),
        _ => Ok(events.bump(event.id, Counter::Guests, delta).await?),
    }
}

/// GET /api/events/{id}/guests
pub async fn guests(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let event = load(&state, path.into_inner()).await?;
    let guests = state.repos.event_guests.list_by_event(event.id).await?;
    Ok(HttpResponse::Ok().json(guests))
}
