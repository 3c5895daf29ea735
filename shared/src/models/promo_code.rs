//! Promo Code Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discount type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "PERCENTAGE",
            Self::FixedAmount => "FIXED_AMOUNT",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "PERCENTAGE" => Some(Self::Percentage),
            "FIXED_AMOUNT" => Some(Self::FixedAmount),
            _ => None,
        }
    }
}

/// Promo code entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: i64,
    /// Stored upper-case; matched case-insensitively
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Percentage: 15 = 15%, fixed: 50.00 = 50 PLN
    pub discount_value: Decimal,
    pub min_order_amount: Option<Decimal>,
    /// None = unlimited
    pub max_uses: Option<i32>,
    pub used_count: i32,
    /// Valid from (Unix millis)
    pub valid_from: Option<i64>,
    /// Valid until (Unix millis)
    pub valid_until: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create promo code payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCodeCreate {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub is_active: Option<bool>,
}

/// Update promo code payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromoCodeUpdate {
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub min_order_amount: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub is_active: Option<bool>,
}

/// Public validation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoValidateRequest {
    pub code: String,
    pub service_type_id: i64,
    pub gift_card_code: Option<String>,
}
