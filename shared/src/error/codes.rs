//! Unified error codes for the studio back-end
//!
//! This module defines all error codes returned by the API and consumed by
//! the public site and the admin panel. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Booking errors
//! - 4xxx: Photo challenge errors
//! - 5xxx: Payment errors
//! - 6xxx: Voucher errors (gift cards, promo codes)
//! - 7xxx: Content errors (pages, menus, testimonials, settings)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests from one client
    RateLimited = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Booking ====================
    /// Booking not found
    BookingNotFound = 3001,
    /// Requested slot is already taken
    SlotUnavailable = 3002,
    /// Requested day is fully booked
    DayFullyBooked = 3003,
    /// Start time is not one of the offered slots
    SlotNotOffered = 3004,
    /// Session duration out of the 1-2 hour range
    InvalidDuration = 3005,
    /// Booking date is in the past
    BookingDateInPast = 3006,
    /// Service type not found
    ServiceTypeNotFound = 3101,
    /// Service type is not bookable
    ServiceTypeInactive = 3102,
    /// Booking status change not allowed
    BookingInvalidStatus = 3201,

    // ==================== 4xxx: Photo challenge ====================
    /// Challenge not found
    ChallengeNotFound = 4001,
    /// Challenge has expired
    ChallengeExpired = 4002,
    /// Challenge status change not allowed
    ChallengeInvalidTransition = 4003,
    /// Challenge has not been paid for
    ChallengeNotPaid = 4004,
    /// Challenge was already answered
    ChallengeAlreadyAnswered = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Payment provider rejected the session
    PaymentSetupFailed = 5002,
    /// Webhook signature invalid
    WebhookSignatureInvalid = 5003,
    /// Payment amount invalid
    PaymentInvalidAmount = 5004,

    // ==================== 6xxx: Vouchers ====================
    /// Gift card not found
    GiftCardNotFound = 6001,
    /// Gift card expired
    GiftCardExpired = 6002,
    /// Gift card has no remaining balance
    GiftCardDepleted = 6003,
    /// Gift card is not active
    GiftCardInactive = 6004,
    /// Promo code not found
    PromoCodeNotFound = 6101,
    /// Promo code expired
    PromoCodeExpired = 6102,
    /// Promo code not yet valid
    PromoCodeNotYetValid = 6103,
    /// Promo code usage limit reached
    PromoCodeExhausted = 6104,
    /// Order below promo minimum
    PromoCodeMinimumNotMet = 6105,
    /// Promo code disabled
    PromoCodeInactive = 6106,
    /// Voucher code already exists
    VoucherCodeExists = 6201,

    // ==================== 7xxx: Content ====================
    /// Page not found
    PageNotFound = 7001,
    /// Page slug already exists
    PageSlugExists = 7002,
    /// Menu item not found
    MenuItemNotFound = 7101,
    /// Menu item parent invalid
    MenuItemInvalidParent = 7102,
    /// Testimonial not found
    TestimonialNotFound = 7201,
    /// Setting not found
    SettingNotFound = 7301,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Email delivery failed
    EmailFailed = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::RateLimited => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Booking
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::SlotUnavailable => "Selected time slot is no longer available",
            ErrorCode::DayFullyBooked => "Selected day is fully booked",
            ErrorCode::SlotNotOffered => "Selected start time is not offered on this day",
            ErrorCode::InvalidDuration => "Session duration must be 1 or 2 hours",
            ErrorCode::BookingDateInPast => "Booking date is in the past",
            ErrorCode::ServiceTypeNotFound => "Service type not found",
            ErrorCode::ServiceTypeInactive => "Service type is not available for booking",
            ErrorCode::BookingInvalidStatus => "Booking status change is not allowed",

            // Photo challenge
            ErrorCode::ChallengeNotFound => "Photo challenge not found",
            ErrorCode::ChallengeExpired => "Photo challenge has expired",
            ErrorCode::ChallengeInvalidTransition => "Photo challenge status change is not allowed",
            ErrorCode::ChallengeNotPaid => "Photo challenge has not been paid for",
            ErrorCode::ChallengeAlreadyAnswered => "Photo challenge was already answered",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentSetupFailed => "Payment setup failed",
            ErrorCode::WebhookSignatureInvalid => "Webhook signature is invalid",
            ErrorCode::PaymentInvalidAmount => "Payment amount is invalid",

            // Vouchers
            ErrorCode::GiftCardNotFound => "Gift card not found",
            ErrorCode::GiftCardExpired => "Gift card has expired",
            ErrorCode::GiftCardDepleted => "Gift card has no remaining balance",
            ErrorCode::GiftCardInactive => "Gift card is not active",
            ErrorCode::PromoCodeNotFound => "Promo code not found",
            ErrorCode::PromoCodeExpired => "Promo code has expired",
            ErrorCode::PromoCodeNotYetValid => "Promo code is not valid yet",
            ErrorCode::PromoCodeExhausted => "Promo code usage limit reached",
            ErrorCode::PromoCodeMinimumNotMet => "Order amount is below the promo code minimum",
            ErrorCode::PromoCodeInactive => "Promo code is disabled",
            ErrorCode::VoucherCodeExists => "Voucher code already exists",

            // Content
            ErrorCode::PageNotFound => "Page not found",
            ErrorCode::PageSlugExists => "Page slug already exists",
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidParent => "Menu item parent is invalid",
            ErrorCode::TestimonialNotFound => "Testimonial not found",
            ErrorCode::SettingNotFound => "Setting not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::EmailFailed => "Email delivery failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::RateLimited),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Booking
            3001 => Ok(ErrorCode::BookingNotFound),
            3002 => Ok(ErrorCode::SlotUnavailable),
            3003 => Ok(ErrorCode::DayFullyBooked),
            3004 => Ok(ErrorCode::SlotNotOffered),
            3005 => Ok(ErrorCode::InvalidDuration),
            3006 => Ok(ErrorCode::BookingDateInPast),
            3101 => Ok(ErrorCode::ServiceTypeNotFound),
            3102 => Ok(ErrorCode::ServiceTypeInactive),
            3201 => Ok(ErrorCode::BookingInvalidStatus),

            // Photo challenge
            4001 => Ok(ErrorCode::ChallengeNotFound),
            4002 => Ok(ErrorCode::ChallengeExpired),
            4003 => Ok(ErrorCode::ChallengeInvalidTransition),
            4004 => Ok(ErrorCode::ChallengeNotPaid),
            4005 => Ok(ErrorCode::ChallengeAlreadyAnswered),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentSetupFailed),
            5003 => Ok(ErrorCode::WebhookSignatureInvalid),
            5004 => Ok(ErrorCode::PaymentInvalidAmount),

            // Vouchers
            6001 => Ok(ErrorCode::GiftCardNotFound),
            6002 => Ok(ErrorCode::GiftCardExpired),
            6003 => Ok(ErrorCode::GiftCardDepleted),
            6004 => Ok(ErrorCode::GiftCardInactive),
            6101 => Ok(ErrorCode::PromoCodeNotFound),
            6102 => Ok(ErrorCode::PromoCodeExpired),
            6103 => Ok(ErrorCode::PromoCodeNotYetValid),
            6104 => Ok(ErrorCode::PromoCodeExhausted),
            6105 => Ok(ErrorCode::PromoCodeMinimumNotMet),
            6106 => Ok(ErrorCode::PromoCodeInactive),
            6201 => Ok(ErrorCode::VoucherCodeExists),

            // Content
            7001 => Ok(ErrorCode::PageNotFound),
            7002 => Ok(ErrorCode::PageSlugExists),
            7101 => Ok(ErrorCode::MenuItemNotFound),
            7102 => Ok(ErrorCode::MenuItemInvalidParent),
            7201 => Ok(ErrorCode::TestimonialNotFound),
            7301 => Ok(ErrorCode::SettingNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::EmailFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::SlotUnavailable.code(), 3002);
        assert_eq!(ErrorCode::ChallengeExpired.code(), 4002);
        assert_eq!(ErrorCode::PromoCodeExhausted.code(), 6104);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1001), Ok(ErrorCode::NotAuthenticated));
        assert_eq!(ErrorCode::try_from(3003), Ok(ErrorCode::DayFullyBooked));
        assert_eq!(
            ErrorCode::try_from(4003),
            Ok(ErrorCode::ChallengeInvalidTransition)
        );
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::NotFound).unwrap();
        assert_eq!(json, "3");

        let json = serde_json::to_string(&ErrorCode::BookingNotFound).unwrap();
        assert_eq!(json, "3001");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("6001").unwrap();
        assert_eq!(code, ErrorCode::GiftCardNotFound);

        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::PageNotFound), "7001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(
            ErrorCode::InvalidDuration.message(),
            "Session duration must be 1 or 2 hours"
        );
    }

    #[test]
    fn test_every_code_roundtrips_through_u16() {
        let codes = [
            ErrorCode::RateLimited,
            ErrorCode::TokenInvalid,
            ErrorCode::AdminRequired,
            ErrorCode::ServiceTypeInactive,
            ErrorCode::BookingInvalidStatus,
            ErrorCode::ChallengeAlreadyAnswered,
            ErrorCode::PaymentInvalidAmount,
            ErrorCode::VoucherCodeExists,
            ErrorCode::SettingNotFound,
            ErrorCode::EmailFailed,
        ];

        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }
}
