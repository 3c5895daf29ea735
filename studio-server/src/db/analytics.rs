//! First-party analytics: event storage and dashboard aggregates

use rust_decimal::Decimal;
use shared::models::{
    AnalyticsEventCreate, DailyCount, DailyRevenue, DashboardStats, EventTypeCount, PathCount, conversion_rate,
};
use sqlx::PgPool;

use super::BoxError;

/// UTC calendar day of a millisecond timestamp column.
const DAY_EXPR: &str = "to_char(to_timestamp(created_at / 1000.0) AT TIME ZONE 'UTC', 'YYYY-MM-DD')";

const TOP_PATHS_LIMIT: i64 = 10;

pub async fn insert_event(pool: &PgPool, event: &AnalyticsEventCreate) -> Result<i64, BoxError> {
    let id = super::snowflake_id();
    sqlx::query(
        "INSERT INTO analytics_events (id, event_type, path, referrer, session_id, metadata, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id)
    .bind(event.event_type.as_str())
    .bind(&event.path)
    .bind(&event.referrer)
    .bind(&event.session_id)
    .bind(&event.metadata)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    Ok(id)
}

/// Dashboard figures for `[from, to)` (Unix millis).
pub async fn dashboard(pool: &PgPool, from: i64, to: i64) -> Result<DashboardStats, BoxError> {
    let event_totals = sqlx::query_as::<_, EventTypeCount>(
        "SELECT event_type, COUNT(*) AS count FROM analytics_events \
         WHERE created_at >= $1 AND created_at < $2 GROUP BY event_type ORDER BY count DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    let daily_page_views = sqlx::query_as::<_, DailyCount>(&format!(
        "SELECT {DAY_EXPR} AS day, COUNT(*) AS count FROM analytics_events \
         WHERE event_type = 'page_view' AND created_at >= $1 AND created_at < $2 GROUP BY day ORDER BY day"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    let top_paths = sqlx::query_as::<_, PathCount>(
        "SELECT path, COUNT(*) AS views, COUNT(DISTINCT session_id) AS unique_sessions FROM analytics_events \
         WHERE event_type = 'page_view' AND created_at >= $1 AND created_at < $2 \
         GROUP BY path ORDER BY views DESC LIMIT $3",
    )
    .bind(from)
    .bind(to)
    .bind(TOP_PATHS_LIMIT)
    .fetch_all(pool)
    .await?;

    let bookings_per_day = sqlx::query_as::<_, DailyRevenue>(&format!(
        "SELECT {DAY_EXPR} AS day, COUNT(*) AS bookings, COALESCE(SUM(price - discount_amount), 0) AS revenue \
         FROM bookings WHERE status <> 'cancelled' AND created_at >= $1 AND created_at < $2 GROUP BY day ORDER BY day"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    let booking_revenue: Decimal = bookings_per_day.iter().map(|d| d.revenue).sum();

    let gift_card_sales: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(initial_amount), 0) FROM gift_cards \
         WHERE status NOT IN ('pending_payment', 'cancelled') AND created_at >= $1 AND created_at < $2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;

    let (challenges_sent, challenges_accepted): (i64, i64) = sqlx::query_as(
        "SELECT \
             COUNT(*) FILTER (WHERE is_paid AND created_at >= $1 AND created_at < $2), \
             COUNT(*) FILTER (WHERE status IN ('accepted', 'scheduled', 'completed') AND responded_at >= $1 AND responded_at < $2) \
         FROM photo_challenges",
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;

    let (visitors, converted): (i64, i64) = sqlx::query_as(
        "SELECT \
             COUNT(DISTINCT session_id) FILTER (WHERE event_type = 'page_view'), \
             COUNT(DISTINCT session_id) FILTER (WHERE event_type = 'booking_completed') \
         FROM analytics_events WHERE session_id IS NOT NULL AND created_at >= $1 AND created_at < $2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;

    Ok(DashboardStats {
        from,
        to,
        event_totals,
        daily_page_views,
        top_paths,
        bookings_per_day,
        booking_revenue,
        gift_card_sales,
        challenges_sent,
        challenges_accepted,
        conversion_rate: conversion_rate(converted, visitors),
    })
}

/// Drop events older than `cutoff`. Returns the count.
pub async fn purge_before(pool: &PgPool, cutoff: i64) -> Result<u64, BoxError> {
    let rows = sqlx::query("DELETE FROM analytics_events WHERE created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
