//! Local news handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nearly_core::domain::{News, Page};
use nearly_core::ports::BaseRepository;
use nearly_shared::dto::{CreateNewsRequest, ListResponse, NewsQuery};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/news?category=
pub async fn list(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<NewsQuery>,
) -> AppResult<HttpResponse> {
    let page = Page::new(query.limit, query.offset);
    let category = query.category.as_deref().filter(|c| !c.trim().is_empty());
    let items = state.repos.news.list(category, page).await?;
    Ok(HttpResponse::Ok().json(ListResponse::new(items, page)))
}

/// POST /api/news
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateNewsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let news = News::new(
        identity.user_id,
        &req.title,
        &req.body,
        &req.category,
        req.image_url,
    )?;
    let news = state.repos.news.save(news).await?;

    tracing::info!(news_id = %news.id, category = %news.category, "News published");
    Ok(HttpResponse::Created().json(news))
}

/// GET /api/news/{id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let news = state
        .repos
        .news
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("News"))?;
    Ok(HttpResponse::Ok().json(news))
}
