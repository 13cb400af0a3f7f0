//! Account lifecycle: signup, login, profile changes, and the
//! role-promotion request queue.

use std::time::SystemTime;

use actix_web::cookie::Cookie;
use sea_orm::ConnectionTrait;
use tracing::info;

use crate::auth::credentials::build_refresh_cookie;
use crate::auth::issuer::{mint_access_token, mint_refresh_token};
use crate::auth::password::{hash_password, verify_password};
use crate::entities::role_change_requests::{self, RequestStatus};
use crate::entities::users::{self, Role};
use crate::error::AppError;
use crate::logging::pii::Redacted;
use crate::repos::users as users_repo;
use crate::state::security_config::SecurityConfig;

/// Freshly minted credential pair handed back to the transport layer,
/// which writes the header and cookie.
pub struct IssuedCredentials {
    pub access_token: String,
    pub refresh_cookie: Cookie<'static>,
}

pub fn issue_credentials(
    user_id: i64,
    security: &SecurityConfig,
) -> Result<IssuedCredentials, AppError> {
    let now = SystemTime::now();
    let access_token = mint_access_token(user_id, now, security)?;
    let refresh_token = mint_refresh_token(user_id, now, security)?;
    Ok(IssuedCredentials {
        access_token,
        refresh_cookie: build_refresh_cookie(refresh_token, security),
    })
}

pub async fn signup<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    email: &str,
    password: &str,
) -> Result<users::Model, AppError> {
    if users_repo::find_by_username(conn, username).await?.is_some() {
        return Err(AppError::conflict(
            "DUPLICATE_USERNAME",
            "Username is already taken",
        ));
    }
    if users_repo::find_by_email(conn, email).await?.is_some() {
        return Err(AppError::conflict(
            "DUPLICATE_EMAIL",
            "Email is already registered",
        ));
    }

    let password_hash = hash_password(password)?;
    let user = users_repo::create(conn, username, email, &password_hash, Role::User).await?;

    info!(user_id = user.id, email = %Redacted(email), "user registered");
    Ok(user)
}

pub async fn login<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    password: &str,
) -> Result<users::Model, AppError> {
    let user = users_repo::find_by_email(conn, email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(password, &user.password_hash) {
        return Err(AppError::invalid_credentials());
    }

    info!(user_id = user.id, email = %Redacted(email), "user logged in");
    Ok(user)
}

pub async fn change_password<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    old_password: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let user = users_repo::find_by_id(conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))?;

    if !verify_password(old_password, &user.password_hash) {
        return Err(AppError::invalid_credentials());
    }

    let new_hash = hash_password(new_password)?;
    users_repo::update_password(conn, user, &new_hash).await?;
    Ok(())
}

pub async fn change_username<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    new_username: &str,
) -> Result<users::Model, AppError> {
    let user = users_repo::find_by_id(conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))?;

    if users_repo::find_by_username(conn, new_username)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(
            "DUPLICATE_USERNAME",
            "Username is already taken",
        ));
    }

    users_repo::update_username(conn, user, new_username).await
}

pub async fn request_role_change<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
) -> Result<role_change_requests::Model, AppError> {
    let user = users_repo::find_by_id(conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))?;

    users_repo::create_role_change_request(conn, user.id).await
}

pub async fn list_role_change_requests<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<role_change_requests::Model>, AppError> {
    users_repo::list_role_change_requests(conn).await
}

/// Approving promotes the requesting user to Manager; both approve and
/// reject are valid only while the request is still pending.
pub async fn approve_role_change<C: ConnectionTrait>(
    conn: &C,
    request_id: i64,
) -> Result<(), AppError> {
    let request = pending_request(conn, request_id).await?;

    let user = users_repo::find_by_id(conn, request.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))?;

    users_repo::update_role(conn, user, Role::Manager).await?;
    users_repo::update_role_change_status(conn, request, RequestStatus::Approved).await?;
    Ok(())
}

pub async fn reject_role_change<C: ConnectionTrait>(
    conn: &C,
    request_id: i64,
) -> Result<(), AppError> {
    let request = pending_request(conn, request_id).await?;
    users_repo::update_role_change_status(conn, request, RequestStatus::Rejected).await?;
    Ok(())
}

async fn pending_request<C: ConnectionTrait>(
    conn: &C,
    request_id: i64,
) -> Result<role_change_requests::Model, AppError> {
    let request = users_repo::find_role_change_request(conn, request_id)
        .await?
        .ok_or_else(|| AppError::not_found("REQUEST_NOT_FOUND", "Role change request not found"))?;

    if request.status != RequestStatus::Pending {
        return Err(AppError::conflict(
            "REQUEST_ALREADY_PROCESSED",
            "Role change request was already processed",
        ));
    }
    Ok(request)
}
