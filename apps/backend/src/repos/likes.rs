use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, Set,
};
use time::OffsetDateTime;

use crate::entities::likes;
use crate::error::AppError;

pub async fn find_by_post_and_device<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
    device_id: &str,
) -> Result<Option<likes::Model>, AppError> {
    Ok(likes::Entity::find()
        .filter(likes::Column::PostId.eq(post_id))
        .filter(likes::Column::DeviceId.eq(device_id))
        .one(conn)
        .await?)
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
    device_id: &str,
) -> Result<likes::Model, AppError> {
    let like = likes::ActiveModel {
        id: NotSet,
        post_id: Set(post_id),
        device_id: Set(device_id.to_string()),
        created_at: Set(OffsetDateTime::now_utc()),
    };
    Ok(like.insert(conn).await?)
}

pub async fn delete<C: ConnectionTrait>(conn: &C, like_id: i64) -> Result<(), AppError> {
    likes::Entity::delete_by_id(like_id).exec(conn).await?;
    Ok(())
}

pub async fn count_by_post<C: ConnectionTrait>(conn: &C, post_id: i64) -> Result<u64, AppError> {
    Ok(likes::Entity::find()
        .filter(likes::Column::PostId.eq(post_id))
        .count(conn)
        .await?)
}

/// Like counts for a set of posts; posts with no likes are absent.
pub async fn counts_for_posts<C: ConnectionTrait>(
    conn: &C,
    post_ids: &[i64],
) -> Result<HashMap<i64, u64>, AppError> {
    let likes = likes::Entity::find()
        .filter(likes::Column::PostId.is_in(post_ids.iter().copied()))
        .all(conn)
        .await?;

    let mut counts = HashMap::new();
    for like in likes {
        *counts.entry(like.post_id).or_insert(0) += 1;
    }
    Ok(counts)
}

pub async fn delete_by_post<C: ConnectionTrait>(conn: &C, post_id: i64) -> Result<(), AppError> {
    likes::Entity::delete_many()
        .filter(likes::Column::PostId.eq(post_id))
        .exec(conn)
        .await?;
    Ok(())
}
