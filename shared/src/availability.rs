//! Booking slot computation
//!
//! Sessions are booked in hourly slots starting at fixed times of day
//! (weekday evenings, two weekend slots). Weddings, events and birthdays
//! take the whole calendar day. A day with a whole-day booking offers no
//! slots at all.
//!
//! Ranges are half-open minutes from midnight: `[start, end)`. A booking
//! ending at 19:00 does not block a slot starting at 19:00.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AppError, ErrorCode};
use crate::models::ServiceKind;

pub const MINUTES_PER_DAY: u32 = 24 * 60;
pub const MIN_SESSION_HOURS: u32 = 1;
pub const MAX_SESSION_HOURS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    #[error("Session duration must be between {MIN_SESSION_HOURS} and {MAX_SESSION_HOURS} hours, got {0}")]
    InvalidDuration(u32),
    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        let message = err.to_string();
        match err {
            AvailabilityError::InvalidDuration(hours) => {
                AppError::with_message(ErrorCode::InvalidDuration, message).with_detail("duration_hours", hours)
            }
            AvailabilityError::InvalidTime(_) => AppError::invalid_field("start_time", message),
            AvailabilityError::InvalidDate(_) => AppError::invalid_field("date", message),
            AvailabilityError::InvalidMonth(_) => AppError::invalid_field("month", message),
        }
    }
}

// ========== Time helpers ==========

/// Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn parse_date(s: &str) -> Result<NaiveDate, AvailabilityError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| AvailabilityError::InvalidDate(s.to_string()))
}

pub fn parse_hhmm(s: &str) -> Result<NaiveTime, AvailabilityError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| AvailabilityError::InvalidTime(s.to_string()))
}

pub fn format_hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

pub fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// All dates of a `YYYY-MM` month.
pub fn month_days(month: &str) -> Result<Vec<NaiveDate>, AvailabilityError> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .map_err(|_| AvailabilityError::InvalidMonth(month.to_string()))?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .collect())
}

pub fn validate_duration(hours: u32) -> Result<u32, AvailabilityError> {
    if (MIN_SESSION_HOURS..=MAX_SESSION_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(AvailabilityError::InvalidDuration(hours))
    }
}

/// `HH:MM` (de)serialization for [`NaiveTime`]
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_hhmm(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}

mod hhmm_list {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(times: &[NaiveTime], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(times.iter().map(|t| super::format_hhmm(*t)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<NaiveTime>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        raw.iter()
            .map(|s| super::parse_hhmm(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

// ========== Ranges and rules ==========

/// Occupied part of a day, `[start_minute, end_minute)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedRange {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl BookedRange {
    pub const WHOLE_DAY: BookedRange = BookedRange {
        start_minute: 0,
        end_minute: MINUTES_PER_DAY,
    };

    pub fn new(start_minute: u32, end_minute: u32) -> Self {
        Self {
            start_minute,
            end_minute: end_minute.min(MINUTES_PER_DAY),
        }
    }

    /// Range of a stored booking. Rows without times are whole-day bookings.
    pub fn from_times(start: Option<&str>, end: Option<&str>) -> Result<Self, AvailabilityError> {
        match (start, end) {
            (Some(start), Some(end)) => {
                let start = minute_of_day(parse_hhmm(start)?);
                let end = minute_of_day(parse_hhmm(end)?);
                Ok(Self::new(start, end))
            }
            _ => Ok(Self::WHOLE_DAY),
        }
    }

    pub fn is_whole_day(&self) -> bool {
        self.start_minute == 0 && self.end_minute >= MINUTES_PER_DAY
    }

    pub fn overlaps(&self, other: &BookedRange) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }
}

/// Session start times per day type. Overridable through the
/// `booking.slot_rules` setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRules {
    #[serde(with = "hhmm_list")]
    pub weekday_starts: Vec<NaiveTime>,
    #[serde(with = "hhmm_list")]
    pub weekend_starts: Vec<NaiveTime>,
}

impl Default for SlotRules {
    fn default() -> Self {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            weekday_starts: vec![at(18)],
            weekend_starts: vec![at(17), at(19)],
        }
    }
}

impl SlotRules {
    pub fn starts_for(&self, date: NaiveDate) -> &[NaiveTime] {
        if is_weekend(date) {
            &self.weekend_starts
        } else {
            &self.weekday_starts
        }
    }
}

/// Candidate session slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub blocked: bool,
}

impl TimeSlot {
    pub fn range(&self) -> BookedRange {
        BookedRange::new(minute_of_day(self.start), minute_of_day(self.end))
    }
}

/// Session slots of a date. Slots must end by midnight; longer ones are
/// not offered.
pub fn session_slots(
    date: NaiveDate,
    duration_hours: u32,
    booked: &[BookedRange],
    rules: &SlotRules,
) -> Result<Vec<TimeSlot>, AvailabilityError> {
    let duration = validate_duration(duration_hours)?;
    let day_taken = booked.iter().any(BookedRange::is_whole_day);

    let mut starts = rules.starts_for(date).to_vec();
    starts.sort();
    starts.dedup();

    let slots = starts
        .into_iter()
        .filter_map(|start| {
            let start_minute = minute_of_day(start);
            let end_minute = start_minute + duration * 60;
            if end_minute >= MINUTES_PER_DAY {
                return None;
            }
            let end = NaiveTime::from_num_seconds_from_midnight_opt(end_minute * 60, 0)?;
            let range = BookedRange::new(start_minute, end_minute);
            let blocked = day_taken || booked.iter().any(|b| b.overlaps(&range));
            Some(TimeSlot { start, end, blocked })
        })
        .collect();
    Ok(slots)
}

// ========== Day availability ==========

/// Availability of a single date for one service type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DayAvailability {
    /// Wedding, event, birthday: all or nothing
    WholeDay { available: bool },
    Slots { slots: Vec<TimeSlot> },
}

/// Calendar colouring of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Available,
    Partial,
    Full,
}

impl DayAvailability {
    pub fn status(&self) -> DayStatus {
        match self {
            Self::WholeDay { available: true } => DayStatus::Available,
            Self::WholeDay { available: false } => DayStatus::Full,
            Self::Slots { slots } => {
                let free = slots.iter().filter(|s| !s.blocked).count();
                if free == 0 {
                    DayStatus::Full
                } else if free == slots.len() {
                    DayStatus::Available
                } else {
                    DayStatus::Partial
                }
            }
        }
    }
}

/// One entry of the month calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: String,
    pub status: DayStatus,
}

pub fn day_availability(
    date: NaiveDate,
    kind: ServiceKind,
    duration_hours: u32,
    booked: &[BookedRange],
    rules: &SlotRules,
) -> Result<DayAvailability, AvailabilityError> {
    if kind.blocks_whole_day() {
        return Ok(DayAvailability::WholeDay {
            available: booked.is_empty(),
        });
    }
    Ok(DayAvailability::Slots {
        slots: session_slots(date, duration_hours, booked, rules)?,
    })
}

/// Month calendar entry. Days before `today` cannot be booked and show as full.
pub fn day_summary(
    date: NaiveDate,
    today: NaiveDate,
    kind: ServiceKind,
    duration_hours: u32,
    booked: &[BookedRange],
    rules: &SlotRules,
) -> Result<DaySummary, AvailabilityError> {
    let status = if date < today {
        DayStatus::Full
    } else {
        day_availability(date, kind, duration_hours, booked, rules)?.status()
    };
    Ok(DaySummary {
        date: date.format("%Y-%m-%d").to_string(),
        status,
    })
}

/// Check a session request against the day's bookings and return the range
/// to store.
pub fn validate_session_request(
    date: NaiveDate,
    start: NaiveTime,
    duration_hours: u32,
    booked: &[BookedRange],
    rules: &SlotRules,
) -> Result<TimeSlot, AppError> {
    let slots = session_slots(date, duration_hours, booked, rules)?;
    let slot = slots
        .into_iter()
        .find(|s| s.start == start)
        .ok_or_else(|| {
            AppError::new(ErrorCode::SlotNotOffered)
                .with_detail("date", date.to_string())
                .with_detail("start_time", format_hhmm(start))
        })?;

    if booked.iter().any(BookedRange::is_whole_day) {
        return Err(AppError::new(ErrorCode::DayFullyBooked).with_detail("date", date.to_string()));
    }
    if slot.blocked {
        return Err(AppError::new(ErrorCode::SlotUnavailable)
            .with_detail("date", date.to_string())
            .with_detail("start_time", format_hhmm(start)));
    }
    Ok(slot)
}

/// A whole-day service needs an empty day.
pub fn validate_whole_day_request(date: NaiveDate, booked: &[BookedRange]) -> Result<(), AppError> {
    if booked.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::DayFullyBooked).with_detail("date", date.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        parse_hhmm(s).unwrap()
    }

    fn range(start: &str, end: &str) -> BookedRange {
        BookedRange::from_times(Some(start), Some(end)).unwrap()
    }

    // 2024-06-12 is a Wednesday, 2024-06-15 a Saturday
    const WEDNESDAY: &str = "2024-06-12";
    const SATURDAY: &str = "2024-06-15";

    fn starts(slots: &[TimeSlot]) -> Vec<String> {
        slots.iter().map(|s| format_hhmm(s.start)).collect()
    }

    #[test]
    fn weekend_detection() {
        assert!(!is_weekend(date(WEDNESDAY)));
        assert!(is_weekend(date(SATURDAY)));
        assert!(is_weekend(date("2024-06-16")));
    }

    #[test]
    fn weekday_single_evening_slot() {
        let rules = SlotRules::default();
        let one = session_slots(date(WEDNESDAY), 1, &[], &rules).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].start, time("18:00"));
        assert_eq!(one[0].end, time("19:00"));

        let two = session_slots(date(WEDNESDAY), 2, &[], &rules).unwrap();
        assert_eq!(two[0].end, time("20:00"));
        assert!(!two[0].blocked);
    }

    #[test]
    fn weekend_two_slots() {
        let slots = session_slots(date(SATURDAY), 1, &[], &SlotRules::default()).unwrap();
        assert_eq!(starts(&slots), vec!["17:00", "19:00"]);
    }

    #[test]
    fn overlapping_booking_blocks_slot() {
        let booked = [range("17:30", "18:30")];
        let slots = session_slots(date(WEDNESDAY), 1, &booked, &SlotRules::default()).unwrap();
        assert!(slots[0].blocked);
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        let booked = [range("17:00", "18:00")];
        let slots = session_slots(date(WEDNESDAY), 1, &booked, &SlotRules::default()).unwrap();
        assert!(!slots[0].blocked);

        let booked = [range("17:00", "19:00")];
        let slots = session_slots(date(SATURDAY), 2, &booked, &SlotRules::default()).unwrap();
        assert!(slots[0].blocked);
        assert!(!slots[1].blocked);
    }

    #[test]
    fn two_hour_slot_reaches_next_booking() {
        let booked = [range("19:30", "20:30")];
        let rules = SlotRules::default();
        let one = session_slots(date(WEDNESDAY), 1, &booked, &rules).unwrap();
        assert!(!one[0].blocked);
        let two = session_slots(date(WEDNESDAY), 2, &booked, &rules).unwrap();
        assert!(two[0].blocked);
    }

    #[test]
    fn whole_day_booking_blocks_every_slot() {
        let booked = [BookedRange::WHOLE_DAY];
        let slots = session_slots(date(SATURDAY), 1, &booked, &SlotRules::default()).unwrap();
        assert!(slots.iter().all(|s| s.blocked));
    }

    #[test]
    fn rows_without_times_are_whole_day() {
        let r = BookedRange::from_times(None, None).unwrap();
        assert!(r.is_whole_day());
        assert!(!range("17:00", "19:00").is_whole_day());
    }

    #[test]
    fn invalid_duration_rejected() {
        let rules = SlotRules::default();
        assert_eq!(
            session_slots(date(WEDNESDAY), 0, &[], &rules),
            Err(AvailabilityError::InvalidDuration(0))
        );
        assert_eq!(
            session_slots(date(WEDNESDAY), 3, &[], &rules),
            Err(AvailabilityError::InvalidDuration(3))
        );
    }

    #[test]
    fn slots_past_midnight_are_dropped() {
        let rules = SlotRules {
            weekday_starts: vec![time("18:00"), time("23:00")],
            weekend_starts: vec![],
        };
        let slots = session_slots(date(WEDNESDAY), 2, &[], &rules).unwrap();
        assert_eq!(starts(&slots), vec!["18:00"]);
    }

    #[test]
    fn whole_day_kind_is_all_or_nothing() {
        let rules = SlotRules::default();
        let free = day_availability(date(SATURDAY), ServiceKind::Wedding, 1, &[], &rules).unwrap();
        assert_eq!(free, DayAvailability::WholeDay { available: true });

        let booked = [range("17:00", "18:00")];
        let taken = day_availability(date(SATURDAY), ServiceKind::Birthday, 1, &booked, &rules).unwrap();
        assert_eq!(taken, DayAvailability::WholeDay { available: false });
        assert_eq!(taken.status(), DayStatus::Full);
    }

    #[test]
    fn past_days_show_as_full() {
        let rules = SlotRules::default();
        let today = date(SATURDAY);

        let past = day_summary(date(WEDNESDAY), today, ServiceKind::Session, 1, &[], &rules).unwrap();
        assert_eq!(past.date, WEDNESDAY);
        assert_eq!(past.status, DayStatus::Full);

        let past_wedding = day_summary(date(WEDNESDAY), today, ServiceKind::Wedding, 1, &[], &rules).unwrap();
        assert_eq!(past_wedding.status, DayStatus::Full);

        let current = day_summary(today, today, ServiceKind::Session, 1, &[], &rules).unwrap();
        assert_eq!(current.status, DayStatus::Available);
    }

    #[test]
    fn day_status_for_sessions() {
        let rules = SlotRules::default();
        let booked = [range("17:00", "18:00")];
        let partial = day_availability(date(SATURDAY), ServiceKind::Session, 1, &booked, &rules).unwrap();
        assert_eq!(partial.status(), DayStatus::Partial);

        let empty = day_availability(date(SATURDAY), ServiceKind::Session, 1, &[], &rules).unwrap();
        assert_eq!(empty.status(), DayStatus::Available);

        let full = day_availability(date(WEDNESDAY), ServiceKind::Session, 1, &[BookedRange::WHOLE_DAY], &rules).unwrap();
        assert_eq!(full.status(), DayStatus::Full);
    }

    #[test]
    fn session_request_validation() {
        let rules = SlotRules::default();
        let ok = validate_session_request(date(WEDNESDAY), time("18:00"), 2, &[], &rules).unwrap();
        assert_eq!(ok.end, time("20:00"));

        let err = validate_session_request(date(WEDNESDAY), time("18:30"), 1, &[], &rules).unwrap_err();
        assert_eq!(err.code, ErrorCode::SlotNotOffered);

        let err = validate_session_request(date(WEDNESDAY), time("18:00"), 1, &[range("18:00", "19:00")], &rules)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SlotUnavailable);

        let err = validate_session_request(date(WEDNESDAY), time("18:00"), 1, &[BookedRange::WHOLE_DAY], &rules)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DayFullyBooked);

        let err = validate_session_request(date(WEDNESDAY), time("18:00"), 5, &[], &rules).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDuration);
    }

    #[test]
    fn whole_day_request_needs_empty_day() {
        assert!(validate_whole_day_request(date(SATURDAY), &[]).is_ok());
        let err = validate_whole_day_request(date(SATURDAY), &[range("19:00", "20:00")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DayFullyBooked);
    }

    #[test]
    fn month_days_counts() {
        assert_eq!(month_days("2024-02").unwrap().len(), 29);
        assert_eq!(month_days("2023-02").unwrap().len(), 28);
        assert_eq!(month_days("2024-12").unwrap().len(), 31);
        assert!(month_days("2024-13").is_err());
    }

    #[test]
    fn parse_errors() {
        assert!(parse_hhmm("25:00").is_err());
        assert!(parse_date("12/06/2024").is_err());
    }

    #[test]
    fn slot_rules_json() {
        let json = serde_json::to_value(SlotRules::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"weekday_starts": ["18:00"], "weekend_starts": ["17:00", "19:00"]})
        );
        let back: SlotRules = serde_json::from_value(json).unwrap();
        assert_eq!(back, SlotRules::default());
    }

    #[test]
    fn day_availability_wire_shape() {
        let day = DayAvailability::Slots {
            slots: vec![TimeSlot {
                start: time("18:00"),
                end: time("19:00"),
                blocked: false,
            }],
        };
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["mode"], "slots");
        assert_eq!(json["slots"][0]["start"], "18:00");
        assert_eq!(json["slots"][0]["end"], "19:00");
    }
}
