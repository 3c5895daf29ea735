//! Service type (package) database operations

use rust_decimal::Decimal;
use shared::models::{ServiceKind, ServiceType, ServiceTypeCreate, ServiceTypeUpdate};
use sqlx::PgPool;

use super::BoxError;

const COLUMNS: &str = "id, name, slug, kind, price, duration_hours, description, is_active, sort_order, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ServiceTypeRow {
    id: i64,
    name: String,
    slug: String,
    kind: String,
    price: Decimal,
    duration_hours: i32,
    description: Option<String>,
    is_active: bool,
    sort_order: i32,
    created_at: i64,
    updated_at: i64,
}

impl ServiceTypeRow {
    fn into_service_type(self) -> ServiceType {
        let kind = ServiceKind::from_db(&self.kind).unwrap_or_else(|| {
            tracing::warn!(kind = %self.kind, id = self.id, "Invalid service kind, defaulting to session");
            ServiceKind::Session
        });
        ServiceType {
            id: self.id,
            name: self.name,
            slug: self.slug,
            kind,
            price: self.price,
            duration_hours: self.duration_hours,
            description: self.description,
            is_active: self.is_active,
            sort_order: self.sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<ServiceType>, BoxError> {
    let rows = sqlx::query_as::<_, ServiceTypeRow>(&format!(
        "SELECT {COLUMNS} FROM service_types WHERE ($1 = FALSE OR is_active) ORDER BY sort_order, name"
    ))
    .bind(active_only)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ServiceTypeRow::into_service_type).collect())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<ServiceType>, BoxError> {
    let row = sqlx::query_as::<_, ServiceTypeRow>(&format!(
        "SELECT {COLUMNS} FROM service_types WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ServiceTypeRow::into_service_type))
}

pub async fn create(pool: &PgPool, data: &ServiceTypeCreate) -> Result<ServiceType, BoxError> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, ServiceTypeRow>(&format!(
        "INSERT INTO service_types (id, name, slug, kind, price, duration_hours, description, is_active, sort_order, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $9, $9) RETURNING {COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(&data.name)
    .bind(&data.slug)
    .bind(data.kind.as_str())
    .bind(data.price)
    .bind(data.duration_hours.unwrap_or(1))
    .bind(&data.description)
    .bind(data.sort_order.unwrap_or(0))
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row.into_service_type())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &ServiceTypeUpdate,
) -> Result<Option<ServiceType>, BoxError> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, ServiceTypeRow>(&format!(
        "UPDATE service_types SET name = COALESCE($1, name), slug = COALESCE($2, slug), kind = COALESCE($3, kind), \
         price = COALESCE($4, price), duration_hours = COALESCE($5, duration_hours), description = COALESCE($6, description), \
         is_active = COALESCE($7, is_active), sort_order = COALESCE($8, sort_order), updated_at = $9 \
         WHERE id = $10 RETURNING {COLUMNS}"
    ))
    .bind(&data.name)
    .bind(&data.slug)
    .bind(data.kind.map(|k| k.as_str()))
    .bind(data.price)
    .bind(data.duration_hours)
    .bind(&data.description)
    .bind(data.is_active)
    .bind(data.sort_order)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ServiceTypeRow::into_service_type))
}

/// Service types referenced by bookings are deactivated instead of removed.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let mut tx = pool.begin().await?;

    let (in_use,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM bookings WHERE service_type_id = $1) \
             OR EXISTS (SELECT 1 FROM photo_challenges WHERE service_type_id = $1)",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    let rows = if in_use {
        sqlx::query("UPDATE service_types SET is_active = FALSE, updated_at = $1 WHERE id = $2")
            .bind(shared::util::now_millis())
            .bind(id)
            .execute(&mut *tx)
            .await?
    } else {
        sqlx::query("DELETE FROM service_types WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
    };

    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}
