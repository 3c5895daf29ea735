//! Booking database operations
//!
//! Bookings for one calendar date are created under a row lock on
//! `booking_day_locks`, so the availability check and the insert see the
//! same set of bookings. The partial unique indexes on `bookings` back this
//! up for the common collisions.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::availability::BookedRange;
use shared::error::{AppError, ErrorCode};
use shared::models::{Booking, BookingQuery, BookingStatus, BookingUpdate};
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use crate::error::{ServiceError, ServiceResult};

const COLUMNS: &str = "id, service_type_id, date, start_time, end_time, client_name, client_email, client_phone, notes, \
     status, price, discount_amount, gift_card_amount, total, promo_code, gift_card_code, challenge_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    service_type_id: i64,
    date: String,
    start_time: Option<String>,
    end_time: Option<String>,
    client_name: String,
    client_email: String,
    client_phone: Option<String>,
    notes: Option<String>,
    status: String,
    price: Decimal,
    discount_amount: Decimal,
    gift_card_amount: Decimal,
    total: Decimal,
    promo_code: Option<String>,
    gift_card_code: Option<String>,
    challenge_id: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl BookingRow {
    fn into_booking(self) -> Booking {
        let status = BookingStatus::from_db(&self.status).unwrap_or_else(|| {
            tracing::warn!(status = %self.status, id = self.id, "Invalid booking status, defaulting to pending");
            BookingStatus::Pending
        });
        Booking {
            id: self.id,
            service_type_id: self.service_type_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            client_name: self.client_name,
            client_email: self.client_email,
            client_phone: self.client_phone,
            notes: self.notes,
            status,
            price: self.price,
            discount_amount: self.discount_amount,
            gift_card_amount: self.gift_card_amount,
            total: self.total,
            promo_code: self.promo_code,
            gift_card_code: self.gift_card_code,
            challenge_id: self.challenge_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Fully priced booking ready to be stored
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub service_type_id: i64,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub price: Decimal,
    pub discount_amount: Decimal,
    pub gift_card_amount: Decimal,
    pub total: Decimal,
    pub promo_code: Option<String>,
    pub gift_card_code: Option<String>,
    pub challenge_id: Option<i64>,
}

// ── Reads ──

pub async fn list(pool: &PgPool, query: &BookingQuery) -> Result<Vec<Booking>, BoxError> {
    let rows = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {COLUMNS} FROM bookings \
         WHERE ($1::TEXT IS NULL OR date >= $1) AND ($2::TEXT IS NULL OR date <= $2) AND ($3::TEXT IS NULL OR status = $3) \
         ORDER BY date DESC, start_time DESC NULLS FIRST"
    ))
    .bind(&query.from)
    .bind(&query.to)
    .bind(query.status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(BookingRow::into_booking).collect())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Booking>, BoxError> {
    let row = sqlx::query_as::<_, BookingRow>(&format!("SELECT {COLUMNS} FROM bookings WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(BookingRow::into_booking))
}

async fn fetch_ranges(conn: &mut PgConnection, date: &str) -> Result<Vec<BookedRange>, BoxError> {
    let rows: Vec<(Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT start_time, end_time FROM bookings WHERE date = $1 AND status <> 'cancelled'",
    )
    .bind(date)
    .fetch_all(conn)
    .await?;
    rows.iter()
        .map(|(start, end)| BookedRange::from_times(start.as_deref(), end.as_deref()).map_err(BoxError::from))
        .collect()
}

/// Calendar ranges held by live bookings on `date`.
pub async fn booked_ranges_for_date(pool: &PgPool, date: &str) -> Result<Vec<BookedRange>, BoxError> {
    let mut conn = pool.acquire().await?;
    fetch_ranges(&mut conn, date).await
}

/// Live booking ranges per date for an inclusive date range.
pub async fn booked_ranges_between(
    pool: &PgPool,
    from: &str,
    to: &str,
) -> Result<HashMap<String, Vec<BookedRange>>, BoxError> {
    let rows: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT date, start_time, end_time FROM bookings \
         WHERE date >= $1 AND date <= $2 AND status <> 'cancelled'",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    let mut by_date: HashMap<String, Vec<BookedRange>> = HashMap::new();
    for (date, start, end) in rows {
        let range = BookedRange::from_times(start.as_deref(), end.as_deref())?;
        by_date.entry(date).or_default().push(range);
    }
    Ok(by_date)
}

// ── Writes ──

/// Store a booking after re-checking the day under lock.
///
/// `check` receives the live ranges of the date. Promo usage, gift card
/// debit and the challenge link are applied in the same transaction.
pub async fn create_checked<F>(pool: &PgPool, new: &NewBooking, check: F) -> ServiceResult<Booking>
where
    F: FnOnce(&[BookedRange]) -> Result<(), AppError>,
{
    let now = shared::util::now_millis();
    let id = super::snowflake_id();
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO booking_day_locks (date) VALUES ($1) ON CONFLICT DO NOTHING")
        .bind(&new.date)
        .execute(&mut *tx)
        .await?;
    sqlx::query("SELECT date FROM booking_day_locks WHERE date = $1 FOR UPDATE")
        .bind(&new.date)
        .execute(&mut *tx)
        .await?;

    let booked = fetch_ranges(&mut tx, &new.date).await?;
    check(&booked)?;

    if let Some(code) = &new.promo_code
        && !super::promo_codes::increment_usage(&mut tx, code, now).await?
    {
        return Err(AppError::new(ErrorCode::PromoCodeExhausted).into());
    }

    if let Some(code) = &new.gift_card_code
        && new.gift_card_amount > Decimal::ZERO
        && !super::gift_cards::debit(&mut tx, code, new.gift_card_amount, now).await?
    {
        return Err(AppError::new(ErrorCode::GiftCardDepleted).into());
    }

    if let Some(challenge_id) = new.challenge_id
        && !super::challenges::attach_booking(&mut tx, challenge_id, id, now).await?
    {
        return Err(AppError::new(ErrorCode::ChallengeInvalidTransition)
            .with_detail("challenge_id", challenge_id)
            .into());
    }

    let inserted = sqlx::query_as::<_, BookingRow>(&format!(
        "INSERT INTO bookings (id, service_type_id, date, start_time, end_time, client_name, client_email, client_phone, notes, \
         status, price, discount_amount, gift_card_amount, total, promo_code, gift_card_code, challenge_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', $10, $11, $12, $13, $14, $15, $16, $17, $17) \
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(new.service_type_id)
    .bind(&new.date)
    .bind(&new.start_time)
    .bind(&new.end_time)
    .bind(&new.client_name)
    .bind(&new.client_email)
    .bind(&new.client_phone)
    .bind(&new.notes)
    .bind(new.price)
    .bind(new.discount_amount)
    .bind(new.gift_card_amount)
    .bind(new.total)
    .bind(&new.promo_code)
    .bind(&new.gift_card_code)
    .bind(new.challenge_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let row = match inserted {
        Ok(row) => row,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::new(ErrorCode::SlotUnavailable)
                .with_detail("date", new.date.clone())
                .into());
        }
        Err(e) => return Err(ServiceError::from(e)),
    };

    tx.commit().await?;
    Ok(row.into_booking())
}

pub async fn update(pool: &PgPool, id: i64, data: &BookingUpdate) -> Result<Option<Booking>, BoxError> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, BookingRow>(&format!(
        "UPDATE bookings SET client_name = COALESCE($1, client_name), client_email = COALESCE($2, client_email), \
         client_phone = COALESCE($3, client_phone), notes = COALESCE($4, notes), updated_at = $5 \
         WHERE id = $6 RETURNING {COLUMNS}"
    ))
    .bind(&data.client_name)
    .bind(&data.client_email)
    .bind(&data.client_phone)
    .bind(&data.notes)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(BookingRow::into_booking))
}

/// Move a booking from `from` to `to`. Returns `None` when the booking is
/// gone or its status changed concurrently.
///
/// Cancelling returns the gift card amount to the card and reopens a
/// scheduled photo challenge.
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    from: BookingStatus,
    to: BookingStatus,
) -> Result<Option<Booking>, BoxError> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, BookingRow>(&format!(
        "UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4 RETURNING {COLUMNS}"
    ))
    .bind(to.as_str())
    .bind(now)
    .bind(id)
    .bind(from.as_str())
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    if to == BookingStatus::Cancelled {
        unwind(&mut tx, &row, now).await?;
    }

    tx.commit().await?;
    Ok(Some(row.into_booking()))
}

/// What deleting a booking in a given status does to the records it used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    /// Still live: handled like a cancellation
    Unwind,
    /// Cancelled earlier; the card was already credited
    Settled,
    /// The session took place
    Fulfilled,
}

impl Removal {
    fn of(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending | BookingStatus::Confirmed => Self::Unwind,
            BookingStatus::Cancelled => Self::Settled,
            BookingStatus::Completed => Self::Fulfilled,
        }
    }

    fn refunds_gift_card(self) -> bool {
        self == Self::Unwind
    }
}

/// Credit the gift card share back and release the linked challenge.
async fn unwind(conn: &mut PgConnection, row: &BookingRow, now: i64) -> Result<(), sqlx::Error> {
    if row.gift_card_amount > Decimal::ZERO
        && let Some(code) = &row.gift_card_code
    {
        super::gift_cards::credit(&mut *conn, code, row.gift_card_amount, now).await?;
    }
    if row.challenge_id.is_some() && super::challenges::release_booking(&mut *conn, row.id, now).await? {
        tracing::info!(booking_id = row.id, challenge_id = ?row.challenge_id, "Photo challenge reopened");
    }
    Ok(())
}

/// Delete a booking. A live booking is unwound first, like a cancellation.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, BookingRow>(&format!("DELETE FROM bookings WHERE id = $1 RETURNING {COLUMNS}"))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(row) = row else {
        return Ok(false);
    };

    let status = BookingStatus::from_db(&row.status).unwrap_or(BookingStatus::Pending);
    match Removal::of(status) {
        Removal::Unwind => unwind(&mut tx, &row, now).await?,
        // Older cancellations may have left the challenge scheduled
        Removal::Settled => {
            super::challenges::release_booking(&mut tx, id, now).await?;
        }
        Removal::Fulfilled => {
            super::challenges::complete_booking(&mut tx, id, now).await?;
        }
    }
    sqlx::query("UPDATE photo_challenges SET booking_id = NULL, updated_at = $2 WHERE booking_id = $1")
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleting_a_live_booking_refunds_the_gift_card() {
        assert_eq!(Removal::of(BookingStatus::Pending), Removal::Unwind);
        assert_eq!(Removal::of(BookingStatus::Confirmed), Removal::Unwind);
        assert!(Removal::of(BookingStatus::Pending).refunds_gift_card());
        assert!(Removal::of(BookingStatus::Confirmed).refunds_gift_card());
    }

    #[test]
    fn deleting_a_cancelled_or_completed_booking_refunds_nothing() {
        // Cancelling already credited the card
        assert!(!Removal::of(BookingStatus::Cancelled).refunds_gift_card());
        assert!(!Removal::of(BookingStatus::Completed).refunds_gift_card());
        assert_eq!(Removal::of(BookingStatus::Completed), Removal::Fulfilled);
    }

    #[test]
    fn every_cancellable_booking_is_unwound_on_delete() {
        use BookingStatus::*;
        for status in [Pending, Confirmed, Cancelled, Completed] {
            assert_eq!(
                Removal::of(status) == Removal::Unwind,
                status.can_transition_to(Cancelled),
                "{status:?}"
            );
        }
    }
}
