//! Comment flows. Comments come in two flavors: authored by a logged-in
//! user, or anonymous with a display name and a delete password.

use sea_orm::ConnectionTrait;

use crate::entities::comments::{self, AccessResult};
use crate::error::AppError;
use crate::repos::comments as comments_repo;
use crate::repos::comments::NewComment;
use crate::repos::posts as posts_repo;

pub async fn list_comments<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
) -> Result<Vec<comments::Model>, AppError> {
    if !posts_repo::exists(conn, post_id).await? {
        return Err(AppError::not_found("POST_NOT_FOUND", "Post not found"));
    }
    comments_repo::list_by_post(conn, post_id).await
}

pub async fn create_comment<C: ConnectionTrait>(
    conn: &C,
    new: NewComment<'_>,
) -> Result<comments::Model, AppError> {
    if new.content.trim().is_empty() {
        return Err(AppError::validation(
            "EMPTY_COMMENT",
            "Comment must not be empty",
        ));
    }
    if !posts_repo::exists(conn, new.post_id).await? {
        return Err(AppError::not_found("POST_NOT_FOUND", "Post not found"));
    }

    if new.author_id.is_none() {
        if new.anonymous_name.map_or(true, |n| n.trim().is_empty()) {
            return Err(AppError::validation(
                "MISSING_ANONYMOUS_NAME",
                "Anonymous comments need a display name",
            ));
        }
        if new.delete_password.map_or(true, |p| p.is_empty()) {
            return Err(AppError::validation(
                "MISSING_DELETE_PASSWORD",
                "Anonymous comments need a delete password",
            ));
        }
    }

    comments_repo::create(conn, new).await
}

pub async fn update_comment<C: ConnectionTrait>(
    conn: &C,
    comment_id: i64,
    user_id: Option<i64>,
    password: Option<&str>,
    content: &str,
) -> Result<comments::Model, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::validation(
            "EMPTY_COMMENT",
            "Comment must not be empty",
        ));
    }

    let comment = require_comment(conn, comment_id).await?;
    check_access(&comment, user_id, password)?;
    comments_repo::update_content(conn, comment, content).await
}

pub async fn delete_comment<C: ConnectionTrait>(
    conn: &C,
    comment_id: i64,
    user_id: Option<i64>,
    password: Option<&str>,
) -> Result<(), AppError> {
    let comment = require_comment(conn, comment_id).await?;
    check_access(&comment, user_id, password)?;
    comments_repo::delete(conn, comment.id).await
}

async fn require_comment<C: ConnectionTrait>(
    conn: &C,
    comment_id: i64,
) -> Result<comments::Model, AppError> {
    comments_repo::find_by_id(conn, comment_id)
        .await?
        .ok_or_else(|| AppError::not_found("COMMENT_NOT_FOUND", "Comment not found"))
}

fn check_access(
    comment: &comments::Model,
    user_id: Option<i64>,
    password: Option<&str>,
) -> Result<(), AppError> {
    match comment.can_access(user_id, password) {
        AccessResult::Allowed => Ok(()),
        AccessResult::InvalidPassword => Err(AppError::bad_request(
            "INVALID_DELETE_PASSWORD",
            "Delete password does not match",
        )),
        AccessResult::NotAuthor | AccessResult::NotAllowed => Err(AppError::forbidden()),
    }
}
