//! Booking calendar queries

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::availability::{self, DayAvailability, DaySummary};

use crate::api::{ApiResult, internal};
use crate::db;
use crate::services::booking::{bookable_service_type, session_duration, slot_rules};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub service_type_id: i64,
    /// YYYY-MM-DD
    pub date: String,
    pub duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub service_type_id: i64,
    /// YYYY-MM
    pub month: String,
    pub duration: Option<u32>,
}

/// GET /api/availability
pub async fn day(State(state): State<AppState>, Query(query): Query<DayQuery>) -> ApiResult<DayAvailability> {
    let service = bookable_service_type(&state.pool, query.service_type_id).await?;
    let date = availability::parse_date(&query.date)?;
    let duration = session_duration(&service, query.duration)?;
    let rules = slot_rules(&state.pool).await.map_err(internal)?;

    let booked = db::bookings::booked_ranges_for_date(&state.pool, &query.date)
        .await
        .map_err(internal)?;
    let day = availability::day_availability(date, service.kind, duration, &booked, &rules)?;
    Ok(Json(day))
}

/// GET /api/availability/month
pub async fn month(State(state): State<AppState>, Query(query): Query<MonthQuery>) -> ApiResult<Vec<DaySummary>> {
    let service = bookable_service_type(&state.pool, query.service_type_id).await?;
    let days = availability::month_days(&query.month)?;
    let duration = session_duration(&service, query.duration)?;
    let rules = slot_rules(&state.pool).await.map_err(internal)?;

    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return Ok(Json(Vec::new()));
    };
    let booked = db::bookings::booked_ranges_between(
        &state.pool,
        &first.format("%Y-%m-%d").to_string(),
        &last.format("%Y-%m-%d").to_string(),
    )
    .await
    .map_err(internal)?;

    let today = chrono::Local::now().date_naive();
    let summaries = days
        .iter()
        .map(|date| {
            let key = date.format("%Y-%m-%d").to_string();
            let ranges = booked.get(&key).map(Vec::as_slice).unwrap_or(&[]);
            availability::day_summary(*date, today, service.kind, duration, ranges, &rules)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(summaries))
}
