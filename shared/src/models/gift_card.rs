//! Gift Card Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Gift card status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GiftCardStatus {
    /// Created by the storefront, waiting for the payment webhook
    PendingPayment,
    Active,
    /// Balance fully used
    Redeemed,
    Expired,
    Cancelled,
}

impl GiftCardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::Active => "active",
            Self::Redeemed => "redeemed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending_payment" => Some(Self::PendingPayment),
            "active" => Some(Self::Active),
            "redeemed" => Some(Self::Redeemed),
            "expired" => Some(Self::Expired),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Gift card entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCard {
    pub id: i64,
    pub code: String,
    pub initial_amount: Decimal,
    pub balance: Decimal,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub message: Option<String>,
    pub status: GiftCardStatus,
    /// Expiry (Unix millis)
    pub expires_at: i64,
    pub payment_session_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Storefront purchase request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCardPurchase {
    pub amount: Decimal,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub message: Option<String>,
}

/// Admin-issued gift card (already paid, e.g. sold at the studio)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCardCreate {
    pub amount: Decimal,
    /// Custom code; generated when absent
    pub code: Option<String>,
    pub purchaser_name: String,
    pub purchaser_email: String,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub message: Option<String>,
    pub expires_at: Option<i64>,
}

/// Admin update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiftCardUpdate {
    pub balance: Option<Decimal>,
    pub status: Option<GiftCardStatus>,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub message: Option<String>,
    pub expires_at: Option<i64>,
}

/// Public balance lookup response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCardBalance {
    pub code: String,
    pub balance: Decimal,
    pub status: GiftCardStatus,
    pub expires_at: i64,
}

impl From<&GiftCard> for GiftCardBalance {
    fn from(card: &GiftCard) -> Self {
        Self {
            code: card.code.clone(),
            balance: card.balance,
            status: card.status,
            expires_at: card.expires_at,
        }
    }
}

/// Storefront checkout redirect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub id: i64,
    pub checkout_url: String,
}
