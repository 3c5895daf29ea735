//! Promo code database operations

use rust_decimal::Decimal;
use shared::models::{DiscountType, PromoCode, PromoCodeCreate, PromoCodeUpdate};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

const COLUMNS: &str = "id, code, description, discount_type, discount_value, min_order_amount, max_uses, used_count, \
     valid_from, valid_until, is_active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PromoCodeRow {
    id: i64,
    code: String,
    description: Option<String>,
    discount_type: String,
    discount_value: Decimal,
    min_order_amount: Option<Decimal>,
    max_uses: Option<i32>,
    used_count: i32,
    valid_from: Option<i64>,
    valid_until: Option<i64>,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl PromoCodeRow {
    fn into_promo_code(self) -> PromoCode {
        let discount_type = DiscountType::from_db(&self.discount_type).unwrap_or_else(|| {
            tracing::warn!(discount_type = %self.discount_type, id = self.id, "Invalid discount_type, defaulting to percentage");
            DiscountType::Percentage
        });
        PromoCode {
            id: self.id,
            code: self.code,
            description: self.description,
            discount_type,
            discount_value: self.discount_value,
            min_order_amount: self.min_order_amount,
            max_uses: self.max_uses,
            used_count: self.used_count,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<PromoCode>, BoxError> {
    let rows = sqlx::query_as::<_, PromoCodeRow>(&format!(
        "SELECT {COLUMNS} FROM promo_codes ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(PromoCodeRow::into_promo_code).collect())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<PromoCode>, BoxError> {
    let row = sqlx::query_as::<_, PromoCodeRow>(&format!("SELECT {COLUMNS} FROM promo_codes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(PromoCodeRow::into_promo_code))
}

/// Lookup by customer-entered code (case-insensitive).
pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<PromoCode>, BoxError> {
    let row = sqlx::query_as::<_, PromoCodeRow>(&format!("SELECT {COLUMNS} FROM promo_codes WHERE code = $1"))
        .bind(shared::util::normalize_code(code))
        .fetch_optional(pool)
        .await?;
    Ok(row.map(PromoCodeRow::into_promo_code))
}

pub async fn create(pool: &PgPool, data: &PromoCodeCreate) -> Result<PromoCode, BoxError> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, PromoCodeRow>(&format!(
        "INSERT INTO promo_codes (id, code, description, discount_type, discount_value, min_order_amount, max_uses, used_count, \
         valid_from, valid_until, is_active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9, $10, $11, $11) RETURNING {COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(shared::util::normalize_code(&data.code))
    .bind(&data.description)
    .bind(data.discount_type.as_str())
    .bind(data.discount_value)
    .bind(data.min_order_amount)
    .bind(data.max_uses)
    .bind(data.valid_from)
    .bind(data.valid_until)
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row.into_promo_code())
}

pub async fn update(pool: &PgPool, id: i64, data: &PromoCodeUpdate) -> Result<Option<PromoCode>, BoxError> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, PromoCodeRow>(&format!(
        "UPDATE promo_codes SET description = COALESCE($1, description), discount_type = COALESCE($2, discount_type), \
         discount_value = COALESCE($3, discount_value), min_order_amount = COALESCE($4, min_order_amount), \
         max_uses = COALESCE($5, max_uses), valid_from = COALESCE($6, valid_from), valid_until = COALESCE($7, valid_until), \
         is_active = COALESCE($8, is_active), updated_at = $9 WHERE id = $10 RETURNING {COLUMNS}"
    ))
    .bind(&data.description)
    .bind(data.discount_type.map(|t| t.as_str()))
    .bind(data.discount_value)
    .bind(data.min_order_amount)
    .bind(data.max_uses)
    .bind(data.valid_from)
    .bind(data.valid_until)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(PromoCodeRow::into_promo_code))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM promo_codes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Count one use. `false` when the code reached `max_uses` in the meantime.
pub async fn increment_usage(conn: &mut PgConnection, code: &str, now: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE promo_codes SET used_count = used_count + 1, updated_at = $1 \
         WHERE code = $2 AND is_active AND (max_uses IS NULL OR used_count < max_uses)",
    )
    .bind(now)
    .bind(shared::util::normalize_code(code))
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}
