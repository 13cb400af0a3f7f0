//! Site-wide visit counting and the sidebar aggregate.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::error::AppError;
use crate::repos::{tags as tags_repo, visits as visits_repo};

#[derive(Debug, Serialize)]
pub struct SidebarData {
    pub total_visits: i64,
    pub today_visits: i64,
    pub yesterday_visits: i64,
    pub tags: Vec<String>,
}

/// Counts one front-page visit against today's row and returns the new
/// daily total.
pub async fn record_visit<C: ConnectionTrait>(conn: &C) -> Result<i64, AppError> {
    let today = OffsetDateTime::now_utc().date();
    let row = visits_repo::increment_daily_count(conn, today).await?;
    Ok(row.count)
}

pub async fn sidebar_data<C: ConnectionTrait>(conn: &C) -> Result<SidebarData, AppError> {
    let today = OffsetDateTime::now_utc().date();
    let yesterday = today - Duration::days(1);

    let total_visits = visits_repo::total_count(conn).await?;
    let today_visits = visits_repo::find_count_by_date(conn, today)
        .await?
        .map_or(0, |row| row.count);
    let yesterday_visits = visits_repo::find_count_by_date(conn, yesterday)
        .await?
        .map_or(0, |row| row.count);
    let tags = tags_repo::all_names(conn).await?;

    Ok(SidebarData {
        total_visits,
        today_visits,
        yesterday_visits,
        tags,
    })
}
