//! Post CRUD, listing, and device-keyed likes.

use actix_web::http::header::USER_AGENT;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::services::posts as posts_service;
use crate::state::app_state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 50;

#[derive(Debug, Deserialize)]
pub struct PostBody {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: u64,
    pub size: Option<u64>,
    /// Comma-separated tag names.
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeQuery {
    pub device_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LikeResponse {
    liked: bool,
    like_count: u64,
}

/// POST /api/posts
async fn create_post(
    app_state: web::Data<AppState>,
    current_user: CurrentUser,
    body: web::Json<PostBody>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let post =
        posts_service::create_post(db, current_user.id, &body.title, &body.content, &body.tags)
            .await?;
    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/posts/{id}
async fn update_post(
    app_state: web::Data<AppState>,
    current_user: CurrentUser,
    path: web::Path<i64>,
    body: web::Json<PostBody>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let post = posts_service::update_post(
        db,
        current_user.id,
        path.into_inner(),
        &body.title,
        &body.content,
        &body.tags,
    )
    .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
async fn delete_post(
    app_state: web::Data<AppState>,
    current_user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    posts_service::delete_post(db, current_user.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/posts?page&size&tags
async fn list_posts(
    app_state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let size = query
        .size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let tags: Vec<String> = query
        .tags
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let page = posts_service::recent_posts(db, query.page, size, &tags).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/posts/{id}
async fn post_detail(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let ip = client_ip(&req);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let detail =
        posts_service::post_detail(db, path.into_inner(), &ip, user_agent.as_deref()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/posts/{id}/like?deviceId
async fn toggle_like(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<LikeQuery>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let (liked, like_count) =
        posts_service::toggle_like(db, path.into_inner(), &query.device_id).await?;
    Ok(HttpResponse::Ok().json(LikeResponse { liked, like_count }))
}

/// GET /api/posts/{id}/like?deviceId
async fn like_status(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<LikeQuery>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let (liked, like_count) =
        posts_service::like_status(db, path.into_inner(), &query.device_id).await?;
    Ok(HttpResponse::Ok().json(LikeResponse { liked, like_count }))
}

/// Prefers the forwarded address so logging works behind a proxy.
fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_posts));
    cfg.route("", web::post().to(create_post));
    cfg.route("/{id}", web::get().to(post_detail));
    cfg.route("/{id}", web::put().to(update_post));
    cfg.route("/{id}", web::delete().to(delete_post));
    cfg.route("/{id}/like", web::get().to(like_status));
    cfg.route("/{id}/like", web::post().to(toggle_like));
}
