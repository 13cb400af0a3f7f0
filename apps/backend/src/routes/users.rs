//! Account management behind `/api/secure/**`.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::services::users as users_service;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeUsernameRequest {
    pub new_username: String,
}

/// PUT /api/secure/password
async fn change_password(
    app_state: web::Data<AppState>,
    current_user: CurrentUser,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    users_service::change_password(db, current_user.id, &body.old_password, &body.new_password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/secure/username
async fn change_username(
    app_state: web::Data<AppState>,
    current_user: CurrentUser,
    body: web::Json<ChangeUsernameRequest>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let user = users_service::change_username(db, current_user.id, &body.new_username).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /api/secure/role-change-request
async fn request_role_change(
    app_state: web::Data<AppState>,
    current_user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let request = users_service::request_role_change(db, current_user.id).await?;
    Ok(HttpResponse::Created().json(request))
}

/// GET /api/secure/role-change-requests
async fn list_role_change_requests(
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let requests = users_service::list_role_change_requests(db).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// POST /api/secure/role-change-requests/{id}/approve
async fn approve_role_change(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    users_service::approve_role_change(db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/secure/role-change-requests/{id}/reject
async fn reject_role_change(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    users_service::reject_role_change(db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/password", web::put().to(change_password));
    cfg.route("/username", web::put().to(change_username));
    cfg.route("/role-change-request", web::post().to(request_role_change));
    cfg.route(
        "/role-change-requests",
        web::get().to(list_role_change_requests),
    );
    cfg.route(
        "/role-change-requests/{id}/approve",
        web::post().to(approve_role_change),
    );
    cfg.route(
        "/role-change-requests/{id}/reject",
        web::post().to(reject_role_change),
    );
}
