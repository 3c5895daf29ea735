//! Service Type Model (bookable packages)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What kind of calendar occupancy a service has
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Studio session booked in hourly slots
    Session,
    Wedding,
    Event,
    Birthday,
}

impl ServiceKind {
    /// Whole-day services occupy the entire calendar day.
    pub fn blocks_whole_day(&self) -> bool {
        !matches!(self, Self::Session)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Wedding => "wedding",
            Self::Event => "event",
            Self::Birthday => "birthday",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "session" => Some(Self::Session),
            "wedding" => Some(Self::Wedding),
            "event" => Some(Self::Event),
            "birthday" => Some(Self::Birthday),
            _ => None,
        }
    }
}

/// Service type entity (package offered on the site)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub kind: ServiceKind,
    pub price: Decimal,
    /// Default session length in hours (1..=2); unused for whole-day kinds
    pub duration_hours: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create service type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTypeCreate {
    pub name: String,
    pub slug: String,
    pub kind: ServiceKind,
    pub price: Decimal,
    pub duration_hours: Option<i32>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

/// Update service type payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceTypeUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub kind: Option<ServiceKind>,
    pub price: Option<Decimal>,
    pub duration_hours: Option<i32>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sessions_use_slots() {
        assert!(!ServiceKind::Session.blocks_whole_day());
        assert!(ServiceKind::Wedding.blocks_whole_day());
        assert!(ServiceKind::Event.blocks_whole_day());
        assert!(ServiceKind::Birthday.blocks_whole_day());
    }

    #[test]
    fn kind_db_names_match_serde() {
        for kind in [
            ServiceKind::Session,
            ServiceKind::Wedding,
            ServiceKind::Event,
            ServiceKind::Birthday,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json.as_str(), Some(kind.as_str()));
            assert_eq!(ServiceKind::from_db(kind.as_str()), Some(kind));
        }
        assert_eq!(ServiceKind::from_db("funeral"), None);
    }
}
