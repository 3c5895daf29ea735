//! Booking Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Booking status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether a booking in this status holds its calendar range.
    pub fn occupies_calendar(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Admin-driven status changes.
    ///
    /// Cancelled and completed bookings are final; a pending booking may be
    /// confirmed or cancelled; a confirmed one may be completed or cancelled.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (*self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub service_type_id: i64,
    /// Calendar date (YYYY-MM-DD, studio local)
    pub date: String,
    /// Slot start (HH:MM); None for whole-day services
    pub start_time: Option<String>,
    /// Slot end (HH:MM); None for whole-day services
    pub end_time: Option<String>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    /// Package price before discounts
    pub price: Decimal,
    pub discount_amount: Decimal,
    pub gift_card_amount: Decimal,
    /// Amount left to pay
    pub total: Decimal,
    pub promo_code: Option<String>,
    pub gift_card_code: Option<String>,
    pub challenge_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public booking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreate {
    pub service_type_id: i64,
    pub date: String,
    /// Required for sessions, ignored for whole-day services
    pub start_time: Option<String>,
    /// Session length in hours; defaults to the service type's duration
    pub duration_hours: Option<u32>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub promo_code: Option<String>,
    pub gift_card_code: Option<String>,
}

/// Admin edit of booking contact details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingUpdate {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
}

/// Admin status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}

/// Admin list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingQuery {
    /// Inclusive lower date bound (YYYY-MM-DD)
    pub from: Option<String>,
    /// Inclusive upper date bound (YYYY-MM-DD)
    pub to: Option<String>,
    pub status: Option<BookingStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Confirmed));
    }

    #[test]
    fn cancelled_frees_the_calendar() {
        assert!(BookingStatus::Pending.occupies_calendar());
        assert!(BookingStatus::Completed.occupies_calendar());
        assert!(!BookingStatus::Cancelled.occupies_calendar());
    }

    #[test]
    fn status_db_roundtrip() {
        for s in ["pending", "confirmed", "cancelled", "completed"] {
            assert_eq!(BookingStatus::from_db(s).map(|v| v.as_str()), Some(s));
        }
    }
}
