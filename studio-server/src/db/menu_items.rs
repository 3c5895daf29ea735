//! Menu item database operations

use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, MenuReorderEntry};
use sqlx::PgPool;

use super::BoxError;

const COLUMNS: &str = "id, menu, label, url, parent_id, position, is_visible, created_at, updated_at";

pub async fn list(pool: &PgPool, menu: Option<&str>) -> Result<Vec<MenuItem>, BoxError> {
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_items WHERE ($1::TEXT IS NULL OR menu = $1) ORDER BY menu, position, id"
    ))
    .bind(menu)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<MenuItem>, BoxError> {
    let item = sqlx::query_as::<_, MenuItem>(&format!("SELECT {COLUMNS} FROM menu_items WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

/// New items go last among their siblings unless a position is given.
pub async fn create(pool: &PgPool, data: &MenuItemCreate) -> Result<MenuItem, BoxError> {
    let now = shared::util::now_millis();
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "INSERT INTO menu_items (id, menu, label, url, parent_id, position, is_visible, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, \
             COALESCE($6, (SELECT COALESCE(MAX(position) + 1, 0) FROM menu_items WHERE menu = $2 AND parent_id IS NOT DISTINCT FROM $5)), \
             $7, $8, $8) \
         RETURNING {COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(&data.menu)
    .bind(&data.label)
    .bind(&data.url)
    .bind(data.parent_id)
    .bind(data.position)
    .bind(data.is_visible.unwrap_or(true))
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(item)
}

pub async fn update(pool: &PgPool, id: i64, data: &MenuItemUpdate) -> Result<Option<MenuItem>, BoxError> {
    let now = shared::util::now_millis();
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "UPDATE menu_items SET label = COALESCE($1, label), url = COALESCE($2, url), \
         is_visible = COALESCE($3, is_visible), updated_at = $4 WHERE id = $5 RETURNING {COLUMNS}"
    ))
    .bind(&data.label)
    .bind(&data.url)
    .bind(data.is_visible)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Children are removed with their parent (`ON DELETE CASCADE`).
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM menu_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Apply a validated reorder in one transaction.
pub async fn reorder(pool: &PgPool, menu: &str, entries: &[MenuReorderEntry]) -> Result<(), BoxError> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    for entry in entries {
        let rows = sqlx::query(
            "UPDATE menu_items SET parent_id = $1, position = $2, updated_at = $3 WHERE id = $4 AND menu = $5",
        )
        .bind(entry.parent_id)
        .bind(entry.position)
        .bind(now)
        .bind(entry.id)
        .bind(menu)
        .execute(&mut *tx)
        .await?;
        if rows.rows_affected() == 0 {
            return Err(format!("Menu item {} not found in menu {menu}", entry.id).into());
        }
    }
    tx.commit().await?;
    Ok(())
}
