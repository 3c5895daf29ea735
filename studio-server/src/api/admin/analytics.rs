use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Days, Local, NaiveDate, TimeZone};
use serde::Deserialize;
use shared::availability::parse_date;
use shared::error::AppError;
use shared::models::DashboardStats;

use crate::api::{ApiResult, internal};
use crate::db;
use crate::state::AppState;

/// Default dashboard range when `from` is omitted
const DEFAULT_RANGE_DAYS: u64 = 30;
/// Longest range a single dashboard request may span
const MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// First day (YYYY-MM-DD, inclusive)
    pub from: Option<String>,
    /// Last day (YYYY-MM-DD, inclusive)
    pub to: Option<String>,
}

fn parse_field(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|v| parse_date(v).map_err(|_| AppError::invalid_field(field, "Expected YYYY-MM-DD")))
        .transpose()
}

/// Inclusive day range, defaulting to the last 30 days up to `today`.
fn date_range(query: &DashboardQuery, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
    let to = parse_field("to", query.to.as_deref())?.unwrap_or(today);
    let from = match parse_field("from", query.from.as_deref())? {
        Some(from) => from,
        None => to
            .checked_sub_days(Days::new(DEFAULT_RANGE_DAYS - 1))
            .unwrap_or(to),
    };
    if from > to {
        return Err(AppError::invalid_field("from", "Must not be after 'to'"));
    }
    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(AppError::invalid_field("from", format!("Range is limited to {MAX_RANGE_DAYS} days")));
    }
    Ok((from, to))
}

/// Studio-local midnight as Unix millis.
fn local_midnight_millis(date: NaiveDate) -> i64 {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.timestamp_millis(),
        None => midnight.and_utc().timestamp_millis(),
    }
}

/// GET /api/admin/analytics/dashboard?from=&to=
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardStats> {
    let (from, to) = date_range(&query, Local::now().date_naive())?;
    let end = to.checked_add_days(Days::new(1)).unwrap_or(to);

    let stats = db::analytics::dashboard(&state.pool, local_midnight_millis(from), local_midnight_millis(end))
        .await
        .map_err(internal)?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn query(from: Option<&str>, to: Option<&str>) -> DashboardQuery {
        DashboardQuery {
            from: from.map(Into::into),
            to: to.map(Into::into),
        }
    }

    #[test]
    fn defaults_to_last_thirty_days() {
        let (from, to) = date_range(&query(None, None), day("2026-03-31")).unwrap();
        assert_eq!(from, day("2026-03-02"));
        assert_eq!(to, day("2026-03-31"));
    }

    #[test]
    fn explicit_range_is_checked() {
        let today = day("2026-06-01");
        assert!(date_range(&query(Some("2026-05-01"), Some("2026-05-31")), today).is_ok());
        assert!(date_range(&query(Some("2026-05-31"), Some("2026-05-01")), today).is_err());
        assert!(date_range(&query(Some("2024-01-01"), Some("2026-05-01")), today).is_err());
        assert!(date_range(&query(Some("01/05/2026"), None), today).is_err());
    }

    #[test]
    fn single_day_range() {
        let (from, to) = date_range(&query(Some("2026-05-10"), Some("2026-05-10")), day("2026-06-01")).unwrap();
        assert_eq!(from, to);
    }
}
