//! Analytics Model (first-party event tracking + admin dashboard)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tracked event type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventType {
    PageView,
    BookingStarted,
    BookingCompleted,
    GiftCardViewed,
    GiftCardPurchased,
    ChallengeSent,
    ChallengeAccepted,
    CtaClick,
}

impl AnalyticsEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PageView => "page_view",
            Self::BookingStarted => "booking_started",
            Self::BookingCompleted => "booking_completed",
            Self::GiftCardViewed => "gift_card_viewed",
            Self::GiftCardPurchased => "gift_card_purchased",
            Self::ChallengeSent => "challenge_sent",
            Self::ChallengeAccepted => "challenge_accepted",
            Self::CtaClick => "cta_click",
        }
    }
}

/// Event posted by the public site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEventCreate {
    pub event_type: AnalyticsEventType,
    pub path: String,
    pub referrer: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Count per event type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EventTypeCount {
    pub event_type: String,
    pub count: i64,
}

/// Count per day (YYYY-MM-DD)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DailyCount {
    pub day: String,
    pub count: i64,
}

/// Page views per path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PathCount {
    pub path: String,
    pub views: i64,
    pub unique_sessions: i64,
}

/// Booking volume and revenue per booking date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DailyRevenue {
    pub day: String,
    pub bookings: i64,
    pub revenue: Decimal,
}

/// Admin dashboard payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Range start (Unix millis, inclusive)
    pub from: i64,
    /// Range end (Unix millis, exclusive)
    pub to: i64,
    pub event_totals: Vec<EventTypeCount>,
    pub daily_page_views: Vec<DailyCount>,
    pub top_paths: Vec<PathCount>,
    pub bookings_per_day: Vec<DailyRevenue>,
    pub booking_revenue: Decimal,
    pub gift_card_sales: Decimal,
    pub challenges_sent: i64,
    pub challenges_accepted: i64,
    /// page view sessions that reached `booking_completed`, in percent
    pub conversion_rate: f64,
}

/// Share of `visitors` that converted, in percent with one decimal.
pub fn conversion_rate(converted: i64, visitors: i64) -> f64 {
    if visitors <= 0 {
        return 0.0;
    }
    let rate = converted as f64 * 100.0 / visitors as f64;
    (rate * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_rate_handles_zero_visitors() {
        assert_eq!(conversion_rate(3, 0), 0.0);
    }

    #[test]
    fn conversion_rate_rounds_to_one_decimal() {
        assert_eq!(conversion_rate(1, 3), 33.3);
        assert_eq!(conversion_rate(2, 3), 66.7);
        assert_eq!(conversion_rate(5, 5), 100.0);
    }

    #[test]
    fn event_type_wire_names() {
        let json = serde_json::to_value(AnalyticsEventType::GiftCardPurchased).unwrap();
        assert_eq!(json, "gift_card_purchased");
        assert_eq!(
            AnalyticsEventType::GiftCardPurchased.as_str(),
            "gift_card_purchased"
        );
    }
}
