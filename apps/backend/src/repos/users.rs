//! User and role-change-request persistence, generic over the connection
//! so services can run them inside or outside a transaction.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use time::OffsetDateTime;

use crate::entities::role_change_requests::{self, RequestStatus};
use crate::entities::users::{self, Role};
use crate::error::AppError;

pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
) -> Result<Option<users::Model>, AppError> {
    Ok(users::Entity::find_by_id(user_id).one(conn).await?)
}

pub async fn find_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<users::Model>, AppError> {
    Ok(users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(conn)
        .await?)
}

pub async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> Result<Option<users::Model>, AppError> {
    Ok(users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await?)
}

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<users::Model, AppError> {
    let now = OffsetDateTime::now_utc();
    let user = users::ActiveModel {
        id: NotSet,
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(user.insert(conn).await?)
}

pub async fn update_password<C: ConnectionTrait>(
    conn: &C,
    user: users::Model,
    password_hash: &str,
) -> Result<users::Model, AppError> {
    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(password_hash.to_string());
    active.updated_at = Set(OffsetDateTime::now_utc());
    Ok(active.update(conn).await?)
}

pub async fn update_username<C: ConnectionTrait>(
    conn: &C,
    user: users::Model,
    username: &str,
) -> Result<users::Model, AppError> {
    let mut active: users::ActiveModel = user.into();
    active.username = Set(username.to_string());
    active.updated_at = Set(OffsetDateTime::now_utc());
    Ok(active.update(conn).await?)
}

pub async fn update_role<C: ConnectionTrait>(
    conn: &C,
    user: users::Model,
    role: Role,
) -> Result<users::Model, AppError> {
    let mut active: users::ActiveModel = user.into();
    active.role = Set(role);
    active.updated_at = Set(OffsetDateTime::now_utc());
    Ok(active.update(conn).await?)
}

pub async fn create_role_change_request<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
) -> Result<role_change_requests::Model, AppError> {
    let request = role_change_requests::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        status: Set(RequestStatus::Pending),
        requested_at: Set(OffsetDateTime::now_utc()),
        processed_at: Set(None),
    };
    Ok(request.insert(conn).await?)
}

pub async fn find_role_change_request<C: ConnectionTrait>(
    conn: &C,
    request_id: i64,
) -> Result<Option<role_change_requests::Model>, AppError> {
    Ok(role_change_requests::Entity::find_by_id(request_id)
        .one(conn)
        .await?)
}

pub async fn list_role_change_requests<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<role_change_requests::Model>, AppError> {
    Ok(role_change_requests::Entity::find()
        .order_by_desc(role_change_requests::Column::RequestedAt)
        .all(conn)
        .await?)
}

pub async fn update_role_change_status<C: ConnectionTrait>(
    conn: &C,
    request: role_change_requests::Model,
    status: RequestStatus,
) -> Result<role_change_requests::Model, AppError> {
    let mut active: role_change_requests::ActiveModel = request.into();
    active.status = Set(status);
    active.processed_at = Set(Some(OffsetDateTime::now_utc()));
    Ok(active.update(conn).await?)
}
