//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Domain of an error, taken from the thousands digit of its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Booking,
    Challenge,
    Payment,
    /// Gift cards and promo codes
    Voucher,
    /// Pages, menus, testimonials, settings
    Content,
    /// Infrastructure failures; logged when returned
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Booking,
            4000..5000 => Self::Challenge,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Voucher,
            7000..8000 => Self::Content,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Booking);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Challenge);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Payment);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Voucher);
        assert_eq!(ErrorCategory::from_code(7201), ErrorCategory::Content);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::SlotUnavailable.category(), ErrorCategory::Booking);
        assert_eq!(
            ErrorCode::ChallengeExpired.category(),
            ErrorCategory::Challenge
        );
        assert_eq!(ErrorCode::GiftCardDepleted.category(), ErrorCategory::Voucher);
        assert_eq!(ErrorCode::PageSlugExists.category(), ErrorCategory::Content);
        assert_eq!(ErrorCode::EmailFailed.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Challenge).unwrap();
        assert_eq!(json, "\"challenge\"");

        let category: ErrorCategory = serde_json::from_str("\"voucher\"").unwrap();
        assert_eq!(category, ErrorCategory::Voucher);
    }
}
