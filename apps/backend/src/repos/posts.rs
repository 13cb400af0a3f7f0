use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::entities::posts;
use crate::error::AppError;

pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
) -> Result<Option<posts::Model>, AppError> {
    Ok(posts::Entity::find_by_id(post_id).one(conn).await?)
}

pub async fn exists<C: ConnectionTrait>(conn: &C, post_id: i64) -> Result<bool, AppError> {
    let count = posts::Entity::find()
        .filter(posts::Column::Id.eq(post_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    title: &str,
    content: &str,
    author_id: i64,
) -> Result<posts::Model, AppError> {
    let now = OffsetDateTime::now_utc();
    let post = posts::ActiveModel {
        id: NotSet,
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        author_id: Set(author_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(post.insert(conn).await?)
}

pub async fn update<C: ConnectionTrait>(
    conn: &C,
    post: posts::Model,
    title: &str,
    content: &str,
) -> Result<posts::Model, AppError> {
    let mut active: posts::ActiveModel = post.into();
    active.title = Set(title.to_string());
    active.content = Set(content.to_string());
    active.updated_at = Set(OffsetDateTime::now_utc());
    Ok(active.update(conn).await?)
}

pub async fn delete<C: ConnectionTrait>(conn: &C, post_id: i64) -> Result<(), AppError> {
    posts::Entity::delete_by_id(post_id).exec(conn).await?;
    Ok(())
}

/// One page of posts, newest first, optionally restricted to an id set
/// (used by the tag filter). Returns the page plus the total matching count.
pub async fn page_recent<C: ConnectionTrait>(
    conn: &C,
    page: u64,
    size: u64,
    id_filter: Option<Vec<i64>>,
) -> Result<(Vec<posts::Model>, u64), AppError> {
    let mut query = posts::Entity::find().order_by_desc(posts::Column::CreatedAt);
    if let Some(ids) = id_filter {
        query = query.filter(posts::Column::Id.is_in(ids));
    }

    let total = query.clone().count(conn).await?;
    let items = query
        .offset(page.saturating_mul(size))
        .limit(size)
        .all(conn)
        .await?;

    Ok((items, total))
}
