//! Photo challenge database operations
//!
//! Status changes are guarded by the expected current status, so two
//! concurrent answers cannot both win.

use shared::challenge::ChallengeStatus;
use shared::models::{PhotoChallenge, PhotoChallengeCreate};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

const COLUMNS: &str = "id, token, sender_name, sender_email, recipient_name, recipient_email, message, service_type_id, \
     discount_percent, status, is_paid, booking_id, payment_session_id, expires_at, viewed_at, responded_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ChallengeRow {
    id: i64,
    token: String,
    sender_name: String,
    sender_email: String,
    recipient_name: String,
    recipient_email: String,
    message: Option<String>,
    service_type_id: i64,
    discount_percent: i32,
    status: String,
    is_paid: bool,
    booking_id: Option<i64>,
    payment_session_id: Option<String>,
    expires_at: i64,
    viewed_at: Option<i64>,
    responded_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl ChallengeRow {
    fn into_challenge(self) -> PhotoChallenge {
        let status = ChallengeStatus::from_db(&self.status).unwrap_or_else(|| {
            tracing::warn!(status = %self.status, id = self.id, "Invalid challenge status, defaulting to expired");
            ChallengeStatus::Expired
        });
        PhotoChallenge {
            id: self.id,
            token: self.token,
            sender_name: self.sender_name,
            sender_email: self.sender_email,
            recipient_name: self.recipient_name,
            recipient_email: self.recipient_email,
            message: self.message,
            service_type_id: self.service_type_id,
            discount_percent: self.discount_percent,
            status,
            is_paid: self.is_paid,
            booking_id: self.booking_id,
            payment_session_id: self.payment_session_id,
            expires_at: self.expires_at,
            viewed_at: self.viewed_at,
            responded_at: self.responded_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub async fn list(pool: &PgPool, status: Option<ChallengeStatus>) -> Result<Vec<PhotoChallenge>, BoxError> {
    let rows = sqlx::query_as::<_, ChallengeRow>(&format!(
        "SELECT {COLUMNS} FROM photo_challenges WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY created_at DESC"
    ))
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ChallengeRow::into_challenge).collect())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<PhotoChallenge>, BoxError> {
    let row = sqlx::query_as::<_, ChallengeRow>(&format!("SELECT {COLUMNS} FROM photo_challenges WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(ChallengeRow::into_challenge))
}

pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<PhotoChallenge>, BoxError> {
    let row = sqlx::query_as::<_, ChallengeRow>(&format!(
        "SELECT {COLUMNS} FROM photo_challenges WHERE token = $1"
    ))
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ChallengeRow::into_challenge))
}

pub async fn create(
    pool: &PgPool,
    data: &PhotoChallengeCreate,
    token: &str,
    discount_percent: i32,
    expires_at: i64,
) -> Result<PhotoChallenge, BoxError> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, ChallengeRow>(&format!(
        "INSERT INTO photo_challenges (id, token, sender_name, sender_email, recipient_name, recipient_email, message, \
         service_type_id, discount_percent, status, is_paid, expires_at, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'sent', FALSE, $10, $11, $11) RETURNING {COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(token)
    .bind(data.sender_name.trim())
    .bind(data.sender_email.trim().to_lowercase())
    .bind(data.recipient_name.trim())
    .bind(data.recipient_email.trim().to_lowercase())
    .bind(&data.message)
    .bind(data.service_type_id)
    .bind(discount_percent)
    .bind(expires_at)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row.into_challenge())
}

pub async fn set_payment_session(pool: &PgPool, id: i64, session_id: &str) -> Result<(), BoxError> {
    sqlx::query("UPDATE photo_challenges SET payment_session_id = $1, updated_at = $2 WHERE id = $3")
        .bind(session_id)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Mark the challenge paid through `session_id`. `None` if already paid or unknown.
pub async fn mark_paid_by_session(pool: &PgPool, session_id: &str) -> Result<Option<PhotoChallenge>, BoxError> {
    let row = sqlx::query_as::<_, ChallengeRow>(&format!(
        "UPDATE photo_challenges SET is_paid = TRUE, updated_at = $1 \
         WHERE payment_session_id = $2 AND NOT is_paid RETURNING {COLUMNS}"
    ))
    .bind(shared::util::now_millis())
    .bind(session_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ChallengeRow::into_challenge))
}

/// Mark a challenge paid without a checkout (nothing to pay).
pub async fn mark_paid(pool: &PgPool, id: i64) -> Result<Option<PhotoChallenge>, BoxError> {
    let row = sqlx::query_as::<_, ChallengeRow>(&format!(
        "UPDATE photo_challenges SET is_paid = TRUE, updated_at = $1 WHERE id = $2 AND NOT is_paid RETURNING {COLUMNS}"
    ))
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ChallengeRow::into_challenge))
}

/// Move `id` from `from` to `to`, stamping `viewed_at` / `responded_at`.
/// `None` when the status changed in the meantime.
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    from: ChallengeStatus,
    to: ChallengeStatus,
) -> Result<Option<PhotoChallenge>, BoxError> {
    let now = shared::util::now_millis();
    let viewed = to == ChallengeStatus::Viewed;
    let responded = matches!(to, ChallengeStatus::Accepted | ChallengeStatus::Rejected);
    let row = sqlx::query_as::<_, ChallengeRow>(&format!(
        "UPDATE photo_challenges SET status = $1, \
         viewed_at = CASE WHEN $2 THEN COALESCE(viewed_at, $4) ELSE viewed_at END, \
         responded_at = CASE WHEN $3 THEN $4 ELSE responded_at END, updated_at = $4 \
         WHERE id = $5 AND status = $6 RETURNING {COLUMNS}"
    ))
    .bind(to.as_str())
    .bind(viewed)
    .bind(responded)
    .bind(now)
    .bind(id)
    .bind(from.as_str())
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ChallengeRow::into_challenge))
}

/// Link the booking and move an accepted, paid challenge to `scheduled`.
pub async fn attach_booking(
    conn: &mut PgConnection,
    challenge_id: i64,
    booking_id: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE photo_challenges SET status = 'scheduled', booking_id = $1, updated_at = $2 \
         WHERE id = $3 AND status = 'accepted' AND is_paid AND booking_id IS NULL AND expires_at > $2",
    )
    .bind(booking_id)
    .bind(now)
    .bind(challenge_id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

const RELEASE_BOOKING: &str = "UPDATE photo_challenges SET status = 'accepted', booking_id = NULL, updated_at = $2 \
     WHERE booking_id = $1 AND status = 'scheduled'";

const COMPLETE_BOOKING: &str = "UPDATE photo_challenges SET status = 'completed', updated_at = $2 \
     WHERE booking_id = $1 AND status = 'scheduled'";

/// The challenge's booking was cancelled or deleted: back to `accepted`
/// with no booking, so the recipient can book again before it expires.
pub async fn release_booking(conn: &mut PgConnection, booking_id: i64, now: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(RELEASE_BOOKING)
        .bind(booking_id)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// The challenge's session took place.
pub async fn complete_booking(conn: &mut PgConnection, booking_id: i64, now: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(COMPLETE_BOOKING)
        .bind(booking_id)
        .bind(now)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Expire open challenges past `expires_at`. Returns the count.
pub async fn expire_overdue(pool: &PgPool, now: i64) -> Result<u64, BoxError> {
    let rows = sqlx::query(
        "UPDATE photo_challenges SET status = 'expired', updated_at = $1 \
         WHERE status IN ('sent', 'viewed', 'accepted') AND expires_at <= $1",
    )
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Challenges whose scheduled session date is over are completed.
pub async fn complete_past_sessions(pool: &PgPool, today: &str) -> Result<u64, BoxError> {
    let rows = sqlx::query(
        "UPDATE photo_challenges c SET status = 'completed', updated_at = $1 \
         FROM bookings b \
         WHERE c.booking_id = b.id AND c.status = 'scheduled' AND b.status IN ('confirmed', 'completed') AND b.date < $2",
    )
    .bind(shared::util::now_millis())
    .bind(today)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_only_touches_scheduled_challenges() {
        assert!(RELEASE_BOOKING.contains("status = 'accepted', booking_id = NULL"));
        assert!(RELEASE_BOOKING.contains("WHERE booking_id = $1 AND status = 'scheduled'"));
        assert!(COMPLETE_BOOKING.contains("WHERE booking_id = $1 AND status = 'scheduled'"));
    }
}
