//! Tag and post-tag link persistence. Tags are created on first use and
//! deleted again once no post references them.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::{post_tags, tags};
use crate::error::AppError;

pub async fn find_or_create<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<tags::Model, AppError> {
    if let Some(tag) = tags::Entity::find()
        .filter(tags::Column::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(tag);
    }

    let tag = tags::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
    };
    Ok(tag.insert(conn).await?)
}

pub async fn all_names<C: ConnectionTrait>(conn: &C) -> Result<Vec<String>, AppError> {
    let tags = tags::Entity::find()
        .order_by_asc(tags::Column::Name)
        .all(conn)
        .await?;
    Ok(tags.into_iter().map(|t| t.name).collect())
}

/// Ids of tags whose name is in `names`.
pub async fn ids_by_names<C: ConnectionTrait>(
    conn: &C,
    names: &[String],
) -> Result<Vec<i64>, AppError> {
    let tags = tags::Entity::find()
        .filter(tags::Column::Name.is_in(names.iter().cloned()))
        .all(conn)
        .await?;
    Ok(tags.into_iter().map(|t| t.id).collect())
}

pub async fn link<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
    tag_id: i64,
) -> Result<post_tags::Model, AppError> {
    let link = post_tags::ActiveModel {
        id: NotSet,
        post_id: Set(post_id),
        tag_id: Set(tag_id),
        created_at: Set(OffsetDateTime::now_utc()),
    };
    Ok(link.insert(conn).await?)
}

pub async fn tag_ids_for_post<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
) -> Result<Vec<i64>, AppError> {
    let links = post_tags::Entity::find()
        .filter(post_tags::Column::PostId.eq(post_id))
        .all(conn)
        .await?;
    Ok(links.into_iter().map(|l| l.tag_id).collect())
}

pub async fn post_ids_for_tags<C: ConnectionTrait>(
    conn: &C,
    tag_ids: &[i64],
) -> Result<Vec<i64>, AppError> {
    let links = post_tags::Entity::find()
        .filter(post_tags::Column::TagId.is_in(tag_ids.iter().copied()))
        .all(conn)
        .await?;
    Ok(links.into_iter().map(|l| l.post_id).collect())
}

/// All (post_id, tag name) pairs for a set of posts, for summary assembly.
pub async fn names_for_posts<C: ConnectionTrait>(
    conn: &C,
    post_ids: &[i64],
) -> Result<Vec<(i64, String)>, AppError> {
    let links = post_tags::Entity::find()
        .filter(post_tags::Column::PostId.is_in(post_ids.iter().copied()))
        .find_also_related(tags::Entity)
        .all(conn)
        .await?;

    Ok(links
        .into_iter()
        .filter_map(|(link, tag)| tag.map(|t| (link.post_id, t.name)))
        .collect())
}

pub async fn unlink_all<C: ConnectionTrait>(conn: &C, post_id: i64) -> Result<(), AppError> {
    post_tags::Entity::delete_many()
        .filter(post_tags::Column::PostId.eq(post_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Drop any of the given tags that no longer tag a post.
pub async fn delete_orphaned<C: ConnectionTrait>(
    conn: &C,
    tag_ids: &[i64],
) -> Result<(), AppError> {
    for &tag_id in tag_ids {
        let in_use = post_tags::Entity::find()
            .filter(post_tags::Column::TagId.eq(tag_id))
            .count(conn)
            .await?;
        if in_use == 0 {
            tags::Entity::delete_by_id(tag_id).exec(conn).await?;
        }
    }
    Ok(())
}
