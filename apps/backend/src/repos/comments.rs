use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use time::OffsetDateTime;

use crate::entities::comments;
use crate::error::AppError;

pub struct NewComment<'a> {
    pub post_id: i64,
    pub content: &'a str,
    pub author_id: Option<i64>,
    pub anonymous_name: Option<&'a str>,
    pub delete_password: Option<&'a str>,
}

pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    comment_id: i64,
) -> Result<Option<comments::Model>, AppError> {
    Ok(comments::Entity::find_by_id(comment_id).one(conn).await?)
}

pub async fn list_by_post<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
) -> Result<Vec<comments::Model>, AppError> {
    Ok(comments::Entity::find()
        .filter(comments::Column::PostId.eq(post_id))
        .order_by_desc(comments::Column::CreatedAt)
        .all(conn)
        .await?)
}

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    new: NewComment<'_>,
) -> Result<comments::Model, AppError> {
    let now = OffsetDateTime::now_utc();
    let comment = comments::ActiveModel {
        id: NotSet,
        post_id: Set(new.post_id),
        author_id: Set(new.author_id),
        content: Set(new.content.to_string()),
        is_anonymous: Set(new.author_id.is_none()),
        anonymous_name: Set(new.anonymous_name.map(str::to_string)),
        delete_password: Set(new.delete_password.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(comment.insert(conn).await?)
}

pub async fn update_content<C: ConnectionTrait>(
    conn: &C,
    comment: comments::Model,
    content: &str,
) -> Result<comments::Model, AppError> {
    let mut active: comments::ActiveModel = comment.into();
    active.content = Set(content.to_string());
    active.updated_at = Set(OffsetDateTime::now_utc());
    Ok(active.update(conn).await?)
}

pub async fn delete<C: ConnectionTrait>(conn: &C, comment_id: i64) -> Result<(), AppError> {
    comments::Entity::delete_by_id(comment_id).exec(conn).await?;
    Ok(())
}

pub async fn delete_by_post<C: ConnectionTrait>(conn: &C, post_id: i64) -> Result<(), AppError> {
    comments::Entity::delete_many()
        .filter(comments::Column::PostId.eq(post_id))
        .exec(conn)
        .await?;
    Ok(())
}
