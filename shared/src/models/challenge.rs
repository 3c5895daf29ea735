//! Photo Challenge Model
//!
//! A customer pays for a discounted session and invites someone else to take
//! it. The status machine lives in [`crate::challenge`].

use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeStatus;

/// Photo challenge entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoChallenge {
    pub id: i64,
    /// Invitation link token; never exposed in admin lists to other parties
    pub token: String,
    pub sender_name: String,
    pub sender_email: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub message: Option<String>,
    pub service_type_id: i64,
    /// Discount granted to the recipient, 0..=100
    pub discount_percent: i32,
    pub status: ChallengeStatus,
    /// Set by the payment webhook; the invitation is only sent once paid
    pub is_paid: bool,
    pub booking_id: Option<i64>,
    pub payment_session_id: Option<String>,
    /// Expiry (Unix millis)
    pub expires_at: i64,
    pub viewed_at: Option<i64>,
    pub responded_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public request to send a challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoChallengeCreate {
    pub sender_name: String,
    pub sender_email: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub message: Option<String>,
    pub service_type_id: i64,
}

/// Recipient's answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeRespond {
    pub accept: bool,
}

/// Recipient picks a slot after accepting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeSchedule {
    pub date: String,
    pub start_time: Option<String>,
    pub duration_hours: Option<u32>,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
}

/// Admin status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeStatusUpdate {
    pub status: ChallengeStatus,
}

/// What the recipient sees when opening the invitation link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeInvitation {
    pub sender_name: String,
    pub recipient_name: String,
    pub message: Option<String>,
    pub service_type_id: i64,
    pub discount_percent: i32,
    pub status: ChallengeStatus,
    pub expires_at: i64,
}

impl From<&PhotoChallenge> for ChallengeInvitation {
    fn from(c: &PhotoChallenge) -> Self {
        Self {
            sender_name: c.sender_name.clone(),
            recipient_name: c.recipient_name.clone(),
            message: c.message.clone(),
            service_type_id: c.service_type_id,
            discount_percent: c.discount_percent,
            status: c.status,
            expires_at: c.expires_at,
        }
    }
}
