//! Signup, login, and session verification.

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::entities::users::Role;
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::services::users::{self as users_service, IssuedCredentials};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    user_id: i64,
    username: String,
    role: Role,
}

#[derive(Debug, Serialize)]
struct VerifyAuthResponse {
    authenticated: bool,
    role: Role,
}

/// POST /api/signup
///
/// Creates the account and logs the caller straight in: the response
/// carries a bearer token in the Authorization header and the refresh
/// cookie.
async fn signup(
    app_state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let user = users_service::signup(db, &body.username, &body.email, &body.password).await?;
    let credentials = users_service::issue_credentials(user.id, &app_state.security)?;

    Ok(session_response(
        HttpResponse::Created(),
        &user.username,
        user.id,
        user.role,
        credentials,
    ))
}

/// POST /api/login
async fn login(
    app_state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let user = users_service::login(db, &body.email, &body.password).await?;
    let credentials = users_service::issue_credentials(user.id, &app_state.security)?;

    Ok(session_response(
        HttpResponse::Ok(),
        &user.username,
        user.id,
        user.role,
        credentials,
    ))
}

/// GET /api/verify-auth
///
/// Reaching this handler means the guard already accepted the caller,
/// so it just reflects the resolved role back.
async fn verify_auth(current_user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(VerifyAuthResponse {
        authenticated: true,
        role: current_user.role,
    }))
}

fn session_response(
    mut builder: actix_web::HttpResponseBuilder,
    username: &str,
    user_id: i64,
    role: Role,
    credentials: IssuedCredentials,
) -> HttpResponse {
    builder
        .insert_header((
            header::AUTHORIZATION,
            format!("Bearer {}", credentials.access_token),
        ))
        .cookie(credentials.refresh_cookie)
        .json(SessionResponse {
            user_id,
            username: username.to_string(),
            role,
        })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/signup", web::post().to(signup));
    cfg.route("/login", web::post().to(login));
    cfg.route("/verify-auth", web::get().to(verify_auth));
}
