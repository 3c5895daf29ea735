//! Gift card database operations

use rust_decimal::Decimal;
use shared::models::{GiftCard, GiftCardCreate, GiftCardPurchase, GiftCardStatus, GiftCardUpdate};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

const COLUMNS: &str = "id, code, initial_amount, balance, purchaser_name, purchaser_email, recipient_name, recipient_email, \
     message, status, expires_at, payment_session_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct GiftCardRow {
    id: i64,
    code: String,
    initial_amount: Decimal,
    balance: Decimal,
    purchaser_name: String,
    purchaser_email: String,
    recipient_name: Option<String>,
    recipient_email: Option<String>,
    message: Option<String>,
    status: String,
    expires_at: i64,
    payment_session_id: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl GiftCardRow {
    fn into_gift_card(self) -> GiftCard {
        let status = GiftCardStatus::from_db(&self.status).unwrap_or_else(|| {
            tracing::warn!(status = %self.status, id = self.id, "Invalid gift card status, defaulting to cancelled");
            GiftCardStatus::Cancelled
        });
        GiftCard {
            id: self.id,
            code: self.code,
            initial_amount: self.initial_amount,
            balance: self.balance,
            purchaser_name: self.purchaser_name,
            purchaser_email: self.purchaser_email,
            recipient_name: self.recipient_name,
            recipient_email: self.recipient_email,
            message: self.message,
            status,
            expires_at: self.expires_at,
            payment_session_id: self.payment_session_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<GiftCard>, BoxError> {
    let rows = sqlx::query_as::<_, GiftCardRow>(&format!(
        "SELECT {COLUMNS} FROM gift_cards ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(GiftCardRow::into_gift_card).collect())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<GiftCard>, BoxError> {
    let row = sqlx::query_as::<_, GiftCardRow>(&format!("SELECT {COLUMNS} FROM gift_cards WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(GiftCardRow::into_gift_card))
}

pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<GiftCard>, BoxError> {
    let row = sqlx::query_as::<_, GiftCardRow>(&format!("SELECT {COLUMNS} FROM gift_cards WHERE code = $1"))
        .bind(shared::util::normalize_code(code))
        .fetch_optional(pool)
        .await?;
    Ok(row.map(GiftCardRow::into_gift_card))
}

/// Storefront purchase, waiting for payment.
pub async fn create_pending(
    pool: &PgPool,
    data: &GiftCardPurchase,
    code: &str,
    expires_at: i64,
) -> Result<GiftCard, BoxError> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, GiftCardRow>(&format!(
        "INSERT INTO gift_cards (id, code, initial_amount, balance, purchaser_name, purchaser_email, recipient_name, \
         recipient_email, message, status, expires_at, created_at, updated_at) \
         VALUES ($1, $2, $3, $3, $4, $5, $6, $7, $8, 'pending_payment', $9, $10, $10) RETURNING {COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(code)
    .bind(data.amount)
    .bind(data.purchaser_name.trim())
    .bind(data.purchaser_email.trim().to_lowercase())
    .bind(&data.recipient_name)
    .bind(data.recipient_email.as_deref().map(|e| e.trim().to_lowercase()))
    .bind(&data.message)
    .bind(expires_at)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row.into_gift_card())
}

/// Card issued from the back office, active immediately.
pub async fn create_issued(
    pool: &PgPool,
    data: &GiftCardCreate,
    code: &str,
    expires_at: i64,
) -> Result<GiftCard, BoxError> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, GiftCardRow>(&format!(
        "INSERT INTO gift_cards (id, code, initial_amount, balance, purchaser_name, purchaser_email, recipient_name, \
         recipient_email, message, status, expires_at, created_at, updated_at) \
         VALUES ($1, $2, $3, $3, $4, $5, $6, $7, $8, 'active', $9, $10, $10) RETURNING {COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(code)
    .bind(data.amount)
    .bind(&data.purchaser_name)
    .bind(data.purchaser_email.trim().to_lowercase())
    .bind(&data.recipient_name)
    .bind(&data.recipient_email)
    .bind(&data.message)
    .bind(expires_at)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row.into_gift_card())
}

pub async fn update(pool: &PgPool, id: i64, data: &GiftCardUpdate) -> Result<Option<GiftCard>, BoxError> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, GiftCardRow>(&format!(
        "UPDATE gift_cards SET balance = COALESCE($1, balance), status = COALESCE($2, status), \
         recipient_name = COALESCE($3, recipient_name), recipient_email = COALESCE($4, recipient_email), \
         message = COALESCE($5, message), expires_at = COALESCE($6, expires_at), updated_at = $7 \
         WHERE id = $8 RETURNING {COLUMNS}"
    ))
    .bind(data.balance)
    .bind(data.status.map(|s| s.as_str()))
    .bind(&data.recipient_name)
    .bind(&data.recipient_email)
    .bind(&data.message)
    .bind(data.expires_at)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(GiftCardRow::into_gift_card))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM gift_cards WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_payment_session(pool: &PgPool, id: i64, session_id: &str) -> Result<(), BoxError> {
    sqlx::query("UPDATE gift_cards SET payment_session_id = $1, updated_at = $2 WHERE id = $3")
        .bind(session_id)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Activate the card paid through `session_id`.
///
/// Returns `None` when no pending card matches, which makes webhook
/// redelivery a no-op.
pub async fn activate_by_session(pool: &PgPool, session_id: &str) -> Result<Option<GiftCard>, BoxError> {
    let row = sqlx::query_as::<_, GiftCardRow>(&format!(
        "UPDATE gift_cards SET status = 'active', updated_at = $1 \
         WHERE payment_session_id = $2 AND status = 'pending_payment' RETURNING {COLUMNS}"
    ))
    .bind(shared::util::now_millis())
    .bind(session_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(GiftCardRow::into_gift_card))
}

/// Take `amount` off an active, unexpired card with enough balance.
/// A card reaching zero becomes `redeemed`.
pub async fn debit(conn: &mut PgConnection, code: &str, amount: Decimal, now: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE gift_cards SET balance = balance - $1, \
         status = CASE WHEN balance - $1 = 0 THEN 'redeemed' ELSE status END, updated_at = $2 \
         WHERE code = $3 AND status = 'active' AND balance >= $1 AND expires_at > $2",
    )
    .bind(amount)
    .bind(now)
    .bind(shared::util::normalize_code(code))
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Refund: the card reopens only while it has not expired.
const CREDIT: &str = "UPDATE gift_cards SET balance = LEAST(balance + $1, initial_amount), \
     status = CASE WHEN status = 'redeemed' AND expires_at > $2 THEN 'active' ELSE status END, updated_at = $2 \
     WHERE code = $3";

/// Return `amount` to a card, reopening it if it was used up.
pub async fn credit(conn: &mut PgConnection, code: &str, amount: Decimal, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query(CREDIT)
        .bind(amount)
        .bind(now)
        .bind(shared::util::normalize_code(code))
        .execute(conn)
        .await?;
    Ok(())
}

/// Mark active cards past their expiry as expired. Returns the count.
pub async fn expire_overdue(pool: &PgPool, now: i64) -> Result<u64, BoxError> {
    let rows = sqlx::query(
        "UPDATE gift_cards SET status = 'expired', updated_at = $1 WHERE status = 'active' AND expires_at <= $1",
    )
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Abandoned checkouts older than `cutoff` are cancelled.
pub async fn cancel_stale_pending(pool: &PgPool, cutoff: i64) -> Result<u64, BoxError> {
    let rows = sqlx::query(
        "UPDATE gift_cards SET status = 'cancelled', updated_at = $1 \
         WHERE status = 'pending_payment' AND created_at < $2",
    )
    .bind(shared::util::now_millis())
    .bind(cutoff)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_does_not_reopen_expired_cards() {
        assert!(CREDIT.contains("WHEN status = 'redeemed' AND expires_at > $2 THEN 'active'"));
        assert!(CREDIT.contains("LEAST(balance + $1, initial_amount)"));
    }
}
