//! Poll handlers.
//!
//! A vote is an `Engagement` row with action `vote`; the unique engagement
//! key makes a second vote by the same user a conflict.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use nearly_core::domain::{ContentKind, Engagement, EngagementAction, Poll};
use nearly_core::error::RepoError;
use nearly_core::ports::BaseRepository;
use nearly_shared::dto::{CreatePollRequest, ListResponse, PageQuery, PollResponse, VoteRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn load(state: &AppState, id: Uuid) -> AppResult<Poll> {
    state
        .repos
        .polls
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Poll"))
}

async fn my_choice(state: &AppState, user_id: Uuid, poll_id: Uuid) -> AppResult<Option<Uuid>> {
    let vote = state
        .repos
        .engagements
        .find(user_id, ContentKind::Poll, poll_id, EngagementAction::Vote)
        .await?;
    Ok(vote.and_then(|v| v.choice))
}

/// GET /api/polls
pub async fn list(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let polls = state.repos.polls.list(page).await?;
    let now = Utc::now();

    let mut items = Vec::with_capacity(polls.len());
    for poll in &polls {
        let choice = my_choice(&state, identity.user_id, poll.id).await?;
        items.push(PollResponse::new(poll, choice, now));
    }
    Ok(HttpResponse::Ok().json(ListResponse::new(items, page)))
}

/// POST /api/polls
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePollRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let poll = Poll::new(identity.user_id, &req.question, &req.options, req.closes_at)?;
    let poll = state.repos.polls.save(poll).await?;

    tracing::info!(poll_id = %poll.id, options = poll.options.len(), "Poll created");
    Ok(HttpResponse::Created().json(PollResponse::new(&poll, None, Utc::now())))
}

/// GET /api/polls/{id}
pub async fn get(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let poll = load(&state, path.into_inner()).await?;
    let choice = my_choice(&state, identity.user_id, poll.id).await?;
    Ok(HttpResponse::Ok().json(PollResponse::new(&poll, choice, Utc::now())))
}

/// POST /api/polls/{id}/vote
pub async fn vote(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    let mut poll = load(&state, path.into_inner()).await?;
    let now = Utc::now();

    if my_choice(&state, identity.user_id, poll.id).await?.is_some() {
        return Err(AppError::Conflict("Already voted on this poll".to_string()));
    }

    // Validates the option and the closing time on the local copy only.
    poll.cast_vote(body.option_id, now)?;

    // The engagement row goes first so a concurrent duplicate fails before
    // the tally moves.
    let vote = Engagement::new(
        identity.user_id,
        ContentKind::Poll,
        poll.id,
        EngagementAction::Vote,
        Some(body.option_id),
    );
    match state.repos.engagements.save(vote).await {
        Ok(_) => {}
        Err(RepoError::Constraint(_)) => {
            return Err(AppError::Conflict("Already voted on this poll".to_string()));
        }
        Err(e) => return Err(e.into()),
    }
    state.repos.polls.record_vote(poll.id, body.option_id).await?;
    let poll = load(&state, poll.id).await?;

    tracing::info!(poll_id = %poll.id, user_id = %identity.user_id, "Vote cast");
    Ok(HttpResponse::Ok().json(PollResponse::new(&poll, Some(body.option_id), now)))
}
