//! Group handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::{
    ContentKind, Counter, Group, GroupMember, GroupPrivacy, MemberRole, Notification,
    NotificationKind,
};
use nearly_core::ports::{BaseRepository, CounterRepository};
use nearly_shared::dto::{CreateGroupRequest, ListResponse, PageQuery};

use super::notify;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn load(state: &AppState, id: Uuid) -> AppResult<Group> {
    state
        .repos
        .groups
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Group"))
}

/// GET /api/groups
pub async fn list(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let items = state.repos.groups.list(page).await?;
    Ok(HttpResponse::Ok().json(ListResponse::new(items, page)))
}

/// POST /api/groups - the creator becomes the owner and first member.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateGroupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let (group, owner) = Group::new(identity.user_id, &req.name, &req.description, req.privacy)?;

    let group = state.repos.groups.save(group).await?;
    state.repos.group_members.save(owner).await?;

    tracing::info!(group_id = %group.id, privacy = %group.privacy, "Group created");
    Ok(HttpResponse::Created().json(group))
}

/// GET /api/groups/{id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(load(&state, path.into_inner()).await?))
}

/// POST /api/groups/{id}/join
pub async fn join(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let group = load(&state, path.into_inner()).await?;

    if state
        .repos
        .group_members
        .find(group.id, identity.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Already a member".to_string()));
    }
    if group.privacy == GroupPrivacy::Private {
        return Err(AppError::Forbidden("Group is private".to_string()));
    }

    let member = GroupMember::new(group.id, identity.user_id, MemberRole::Member);
    let member = state.repos.group_members.save(member).await?;
    let members = state.repos.groups.bump(group.id, Counter::Members, 1).await?;

    tracing::info!(group_id = %group.id, user_id = %identity.user_id, members, "Joined group");

    let notification = Notification::for_actor(
        group.owner_id,
        identity.user_id,
        NotificationKind::GroupJoin,
        format!("New member in {}", group.name),
    )
    .map(|n| n.with_target(ContentKind::Group, group.id));
    notify(&state, notification).await;

    Ok(HttpResponse::Ok().json(member))
}

/// POST /api/groups/{id}/leave
pub async fn leave(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut group = load(&state, path.into_inner()).await?;

    let member = state
        .repos
        .group_members
        .find(group.id, identity.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Membership"))?;

    if !member.can_leave() {
        return Err(AppError::Forbidden("The owner cannot leave the group".to_string()));
    }

    state.repos.group_members.delete(member.id).await?;
    group.members_count = state.repos.groups.bump(group.id, Counter::Members, -1).await?;

    tracing::info!(group_id = %group.id, user_id = %identity.user_id, "Left group");
    Ok(HttpResponse::Ok().json(group))
}

/// GET /api/groups/{id}/members
pub async fn members(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let group = load(&state, path.into_inner()).await?;
    let members = state.repos.group_members.list_by_group(group.id).await?;
    Ok(HttpResponse::Ok().json(members))
}
