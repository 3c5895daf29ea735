//! Site settings (key/value) database operations

use shared::models::Setting;
use sqlx::PgPool;

use super::BoxError;

pub async fn list(pool: &PgPool) -> Result<Vec<Setting>, BoxError> {
    let rows = sqlx::query_as::<_, Setting>("SELECT key, value, updated_at FROM site_settings ORDER BY key")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, key: &str) -> Result<Option<Setting>, BoxError> {
    let row = sqlx::query_as::<_, Setting>("SELECT key, value, updated_at FROM site_settings WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Typed read; a stored value of the wrong shape is logged and ignored.
pub async fn get_typed<T: serde::de::DeserializeOwned>(pool: &PgPool, key: &str) -> Result<Option<T>, BoxError> {
    let Some(setting) = get(pool, key).await? else {
        return Ok(None);
    };
    match serde_json::from_value(setting.value) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            tracing::warn!(key = key, error = %e, "Ignoring malformed setting");
            Ok(None)
        }
    }
}

pub async fn upsert(pool: &PgPool, key: &str, value: &serde_json::Value) -> Result<Setting, BoxError> {
    let row = sqlx::query_as::<_, Setting>(
        "INSERT INTO site_settings (key, value, updated_at) VALUES ($1, $2, $3) \
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at \
         RETURNING key, value, updated_at",
    )
    .bind(key)
    .bind(value)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM site_settings WHERE key = $1")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
