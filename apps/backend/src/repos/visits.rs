//! Per-post visit logs and the site-wide daily counter.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Insert, NotSet, QueryFilter, Set,
};
use time::{Date, OffsetDateTime};

use crate::entities::{total_visit_counts, visit_logs};
use crate::error::AppError;

pub async fn insert_visit_log<C: ConnectionTrait>(
    conn: &C,
    post_id: i64,
    ip_address: &str,
    user_agent: Option<&str>,
) -> Result<visit_logs::Model, AppError> {
    let log = visit_logs::ActiveModel {
        id: NotSet,
        post_id: Set(post_id),
        ip_address: Set(ip_address.to_string()),
        user_agent: Set(user_agent.map(str::to_string)),
        visited_at: Set(OffsetDateTime::now_utc()),
    };
    Ok(log.insert(conn).await?)
}

pub async fn find_count_by_date<C: ConnectionTrait>(
    conn: &C,
    date: Date,
) -> Result<Option<total_visit_counts::Model>, AppError> {
    Ok(total_visit_counts::Entity::find()
        .filter(total_visit_counts::Column::Date.eq(date))
        .one(conn)
        .await?)
}

/// Add one to today's counter, creating the row on first visit. A
/// single upsert keyed on the date unique index, so concurrent visits
/// neither duplicate the row nor lose increments.
pub async fn increment_daily_count<C: ConnectionTrait>(
    conn: &C,
    date: Date,
) -> Result<total_visit_counts::Model, AppError> {
    Ok(daily_increment(date).exec_with_returning(conn).await?)
}

fn daily_increment(date: Date) -> Insert<total_visit_counts::ActiveModel> {
    let fresh = total_visit_counts::ActiveModel {
        id: NotSet,
        date: Set(date),
        count: Set(1),
    };
    total_visit_counts::Entity::insert(fresh).on_conflict(
        OnConflict::column(total_visit_counts::Column::Date)
            .value(
                total_visit_counts::Column::Count,
                Expr::col(total_visit_counts::Column::Count).add(1),
            )
            .to_owned(),
    )
}

/// Lifetime visit total. One row per day since launch, so summing in
/// memory stays cheap at blog scale.
pub async fn total_count<C: ConnectionTrait>(conn: &C) -> Result<i64, AppError> {
    let rows = total_visit_counts::Entity::find().all(conn).await?;
    Ok(rows.into_iter().map(|r| r.count).sum())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};
    use time::macros::date;

    use super::*;

    #[test]
    fn daily_increment_is_one_atomic_upsert() {
        let sql = daily_increment(date!(2026 - 08 - 29))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("ON CONFLICT"));
        assert!(sql.contains("\"count\" + 1"));
    }
}
