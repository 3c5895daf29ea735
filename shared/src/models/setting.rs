//! Site Setting Model (generic key/value store)

use serde::{Deserialize, Serialize};

/// Studio contact block shown in the footer and emails
pub const KEY_STUDIO_CONTACT: &str = "studio.contact";
/// Navbar layout variant picked in the admin panel
pub const KEY_NAVBAR_LAYOUT: &str = "navbar.layout";
/// Override of the session start times (see `availability::SlotRules`)
pub const KEY_SLOT_RULES: &str = "booking.slot_rules";
/// Discount granted to photo challenge recipients, in percent
pub const KEY_CHALLENGE_DISCOUNT: &str = "challenge.discount_percent";

/// Setting entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: i64,
}

/// Upsert payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingUpsert {
    pub value: serde_json::Value,
}

/// Setting keys are dotted lowercase identifiers.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 64
        && key
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_are_valid() {
        for key in [
            KEY_STUDIO_CONTACT,
            KEY_NAVBAR_LAYOUT,
            KEY_SLOT_RULES,
            KEY_CHALLENGE_DISCOUNT,
        ] {
            assert!(is_valid_key(key), "{key}");
        }
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("Studio.Contact"));
        assert!(!is_valid_key("studio..contact"));
        assert!(!is_valid_key("studio contact"));
    }
}
