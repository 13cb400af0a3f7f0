//! Comment endpoints. These live outside the guarded route groups, so
//! authorship travels in the request body and anonymous access is
//! checked by delete password.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::repos::comments::NewComment;
use crate::services::comments as comments_service;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub user_id: Option<i64>,
    pub anonymous_name: Option<String>,
    pub delete_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub content: String,
    pub user_id: Option<i64>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub user_id: Option<i64>,
    pub password: Option<String>,
}

/// GET /api/comments/post/{post_id}
async fn list_comments(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let comments = comments_service::list_comments(db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/comments/post/{post_id}
async fn create_comment(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let comment = comments_service::create_comment(
        db,
        NewComment {
            post_id: path.into_inner(),
            content: &body.content,
            author_id: body.user_id,
            anonymous_name: body.anonymous_name.as_deref(),
            delete_password: body.delete_password.as_deref(),
        },
    )
    .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// PUT /api/comments/{id}
async fn update_comment(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let comment = comments_service::update_comment(
        db,
        path.into_inner(),
        body.user_id,
        body.password.as_deref(),
        &body.content,
    )
    .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// DELETE /api/comments/{id}
async fn delete_comment(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<DeleteCommentRequest>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    comments_service::delete_comment(
        db,
        path.into_inner(),
        body.user_id,
        body.password.as_deref(),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/post/{post_id}", web::get().to(list_comments));
    cfg.route("/post/{post_id}", web::post().to(create_comment));
    cfg.route("/{id}", web::put().to(update_comment));
    cfg.route("/{id}", web::delete().to(delete_comment));
}
