//! Post lifecycle plus the listing, detail, and like flows built on top
//! of it. Mutations that touch several tables run inside a transaction.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

use crate::entities::posts;
use crate::error::AppError;
use crate::repos::{
    comments as comments_repo, likes as likes_repo, posts as posts_repo, tags as tags_repo,
    users as users_repo, visits as visits_repo,
};

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub preview: String,
    pub author_username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub tags: Vec<String>,
    pub like_count: u64,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub posts: Vec<PostSummary>,
    pub page: u64,
    pub size: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub content: String,
    pub author_name: String,
    pub is_anonymous: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author_username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub tags: Vec<String>,
    pub like_count: u64,
    pub comments: Vec<CommentView>,
}

pub async fn create_post<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    author_id: i64,
    title: &str,
    content: &str,
    tag_names: &[String],
) -> Result<posts::Model, AppError> {
    if title.trim().is_empty() {
        return Err(AppError::validation("EMPTY_TITLE", "Title must not be empty"));
    }

    let txn = conn.begin().await?;
    let post = posts_repo::create(&txn, title, content, author_id).await?;
    for name in normalized_tags(tag_names) {
        let tag = tags_repo::find_or_create(&txn, &name).await?;
        tags_repo::link(&txn, post.id, tag.id).await?;
    }
    txn.commit().await?;

    info!(post_id = post.id, author_id, "post created");
    Ok(post)
}

/// Replaces title, content, and the full tag set. Tags dropped from the
/// post are deleted outright if no other post still uses them.
pub async fn update_post<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    editor_id: i64,
    post_id: i64,
    title: &str,
    content: &str,
    tag_names: &[String],
) -> Result<posts::Model, AppError> {
    let post = require_post(conn, post_id).await?;
    if post.author_id != editor_id {
        return Err(AppError::forbidden());
    }

    let txn = conn.begin().await?;
    let old_tag_ids = tags_repo::tag_ids_for_post(&txn, post_id).await?;
    let updated = posts_repo::update(&txn, post, title, content).await?;

    tags_repo::unlink_all(&txn, post_id).await?;
    for name in normalized_tags(tag_names) {
        let tag = tags_repo::find_or_create(&txn, &name).await?;
        tags_repo::link(&txn, post_id, tag.id).await?;
    }
    tags_repo::delete_orphaned(&txn, &old_tag_ids).await?;
    txn.commit().await?;

    Ok(updated)
}

/// Removes the post together with its comments, likes, tag links, and
/// any tags that end up unused.
pub async fn delete_post<C: ConnectionTrait + TransactionTrait>(
    conn: &C,
    editor_id: i64,
    post_id: i64,
) -> Result<(), AppError> {
    let post = require_post(conn, post_id).await?;
    if post.author_id != editor_id {
        return Err(AppError::forbidden());
    }

    let txn = conn.begin().await?;
    let tag_ids = tags_repo::tag_ids_for_post(&txn, post_id).await?;
    comments_repo::delete_by_post(&txn, post_id).await?;
    likes_repo::delete_by_post(&txn, post_id).await?;
    tags_repo::unlink_all(&txn, post_id).await?;
    tags_repo::delete_orphaned(&txn, &tag_ids).await?;
    posts_repo::delete(&txn, post_id).await?;
    txn.commit().await?;

    info!(post_id, editor_id, "post deleted");
    Ok(())
}

/// Newest-first page of post summaries, optionally narrowed to posts
/// carrying any of the given tags.
pub async fn recent_posts<C: ConnectionTrait>(
    conn: &C,
    page: u64,
    size: u64,
    tag_filter: &[String],
) -> Result<PostPage, AppError> {
    let id_filter = if tag_filter.is_empty() {
        None
    } else {
        let tag_ids = tags_repo::ids_by_names(conn, tag_filter).await?;
        Some(tags_repo::post_ids_for_tags(conn, &tag_ids).await?)
    };

    let (items, total) = posts_repo::page_recent(conn, page, size, id_filter).await?;
    let post_ids: Vec<i64> = items.iter().map(|p| p.id).collect();

    let mut tags_by_post: HashMap<i64, Vec<String>> = HashMap::new();
    for (post_id, name) in tags_repo::names_for_posts(conn, &post_ids).await? {
        tags_by_post.entry(post_id).or_default().push(name);
    }
    let like_counts = likes_repo::counts_for_posts(conn, &post_ids).await?;
    let usernames = author_usernames(conn, &items).await?;

    let posts = items
        .into_iter()
        .map(|post| PostSummary {
            preview: preview_of(&post.content),
            tags: tags_by_post.remove(&post.id).unwrap_or_default(),
            like_count: like_counts.get(&post.id).copied().unwrap_or(0),
            author_username: usernames
                .get(&post.author_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            id: post.id,
            title: post.title,
            created_at: post.created_at,
        })
        .collect();

    Ok(PostPage {
        posts,
        page,
        size,
        total,
    })
}

/// Full post for the detail page. Each read also appends a visit log
/// row for the daily analytics.
pub async fn post_detail<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
    visitor_ip: &str,
    user_agent: Option<&str>,
) -> Result<PostDetail, AppError> {
    let post = require_post(conn, post_id).await?;

    visits_repo::insert_visit_log(conn, post_id, visitor_ip, user_agent).await?;

    let author = users_repo::find_by_id(conn, post.author_id).await?;
    let tags: Vec<String> = tags_repo::names_for_posts(conn, &[post_id])
        .await?
        .into_iter()
        .map(|(_, name)| name)
        .collect();
    let like_count = likes_repo::count_by_post(conn, post_id).await?;

    let mut comments = Vec::new();
    for comment in comments_repo::list_by_post(conn, post_id).await? {
        let author_name = match comment.author_id {
            Some(author_id) => users_repo::find_by_id(conn, author_id)
                .await?
                .map(|u| u.username)
                .unwrap_or_else(|| "unknown".to_string()),
            None => comment
                .anonymous_name
                .clone()
                .unwrap_or_else(|| "anonymous".to_string()),
        };
        comments.push(CommentView {
            id: comment.id,
            content: comment.content,
            author_name,
            is_anonymous: comment.is_anonymous,
            created_at: comment.created_at,
        });
    }

    Ok(PostDetail {
        id: post.id,
        title: post.title,
        content: post.content,
        author_id: post.author_id,
        author_username: author
            .map(|u| u.username)
            .unwrap_or_else(|| "unknown".to_string()),
        created_at: post.created_at,
        updated_at: post.updated_at,
        tags,
        like_count,
        comments,
    })
}

/// One like per device per post. A second toggle from the same device
/// withdraws the like.
pub async fn toggle_like<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
    device_id: &str,
) -> Result<(bool, u64), AppError> {
    if !posts_repo::exists(conn, post_id).await? {
        return Err(AppError::not_found("POST_NOT_FOUND", "Post not found"));
    }

    let liked = match likes_repo::find_by_post_and_device(conn, post_id, device_id).await? {
        Some(existing) => {
            likes_repo::delete(conn, existing.id).await?;
            false
        }
        None => {
            likes_repo::insert(conn, post_id, device_id).await?;
            true
        }
    };

    let count = likes_repo::count_by_post(conn, post_id).await?;
    Ok((liked, count))
}

pub async fn like_status<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
    device_id: &str,
) -> Result<(bool, u64), AppError> {
    if !posts_repo::exists(conn, post_id).await? {
        return Err(AppError::not_found("POST_NOT_FOUND", "Post not found"));
    }

    let liked = likes_repo::find_by_post_and_device(conn, post_id, device_id)
        .await?
        .is_some();
    let count = likes_repo::count_by_post(conn, post_id).await?;
    Ok((liked, count))
}

async fn require_post<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
) -> Result<posts::Model, AppError> {
    posts_repo::find_by_id(conn, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("POST_NOT_FOUND", "Post not found"))
}

/// Username per distinct author across a page of posts. Authors whose
/// account has since been deleted are simply absent from the map.
async fn author_usernames<C: ConnectionTrait>(
    conn: &C,
    items: &[posts::Model],
) -> Result<HashMap<i64, String>, AppError> {
    let mut usernames = HashMap::new();
    for author_id in distinct_author_ids(items) {
        if let Some(user) = users_repo::find_by_id(conn, author_id).await? {
            usernames.insert(author_id, user.username);
        }
    }
    Ok(usernames)
}

fn distinct_author_ids(items: &[posts::Model]) -> Vec<i64> {
    let mut ids = Vec::new();
    for post in items {
        if !ids.contains(&post.author_id) {
            ids.push(post.author_id);
        }
    }
    ids
}

fn normalized_tags(names: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lowered = trimmed.to_lowercase();
        if !seen.contains(&lowered) {
            seen.push(lowered);
        }
    }
    seen
}

fn preview_of(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        content.to_string()
    } else {
        content.chars().take(PREVIEW_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_by(author_id: i64) -> posts::Model {
        posts::Model {
            id: 0,
            title: "t".to_string(),
            content: "c".to_string(),
            author_id,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn author_ids_are_deduplicated_in_order() {
        let page = vec![post_by(3), post_by(1), post_by(3), post_by(2)];
        assert_eq!(distinct_author_ids(&page), vec![3, 1, 2]);
    }

    #[test]
    fn preview_keeps_short_content_intact() {
        assert_eq!(preview_of("hello"), "hello");
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let long: String = "가".repeat(150);
        let preview = preview_of(&long);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn tags_are_trimmed_lowercased_and_deduplicated() {
        let raw = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            String::new(),
            "Web".to_string(),
        ];
        assert_eq!(normalized_tags(&raw), vec!["rust", "web"]);
    }
}
