//! Page database operations

use shared::models::{Page, PageCreate, PageUpdate};
use sqlx::PgPool;

use super::BoxError;

const COLUMNS: &str =
    "id, slug, title, content, meta_title, meta_description, is_published, created_at, updated_at";

pub async fn list(pool: &PgPool) -> Result<Vec<Page>, BoxError> {
    let pages = sqlx::query_as::<_, Page>(&format!("SELECT {COLUMNS} FROM pages ORDER BY slug"))
        .fetch_all(pool)
        .await?;
    Ok(pages)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Page>, BoxError> {
    let page = sqlx::query_as::<_, Page>(&format!("SELECT {COLUMNS} FROM pages WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(page)
}

/// Published page by slug (public site).
pub async fn find_published(pool: &PgPool, slug: &str) -> Result<Option<Page>, BoxError> {
    let page = sqlx::query_as::<_, Page>(&format!(
        "SELECT {COLUMNS} FROM pages WHERE slug = $1 AND is_published"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(page)
}

pub async fn create(pool: &PgPool, data: &PageCreate) -> Result<Page, BoxError> {
    let now = shared::util::now_millis();
    let content = if data.content.is_null() {
        serde_json::Value::Array(Vec::new())
    } else {
        data.content.clone()
    };
    let page = sqlx::query_as::<_, Page>(&format!(
        "INSERT INTO pages (id, slug, title, content, meta_title, meta_description, is_published, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(&data.slug)
    .bind(&data.title)
    .bind(content)
    .bind(&data.meta_title)
    .bind(&data.meta_description)
    .bind(data.is_published.unwrap_or(false))
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(page)
}

pub async fn update(pool: &PgPool, id: i64, data: &PageUpdate) -> Result<Option<Page>, BoxError> {
    let now = shared::util::now_millis();
    let page = sqlx::query_as::<_, Page>(&format!(
        "UPDATE pages SET slug = COALESCE($1, slug), title = COALESCE($2, title), content = COALESCE($3, content), \
         meta_title = COALESCE($4, meta_title), meta_description = COALESCE($5, meta_description), \
         is_published = COALESCE($6, is_published), updated_at = $7 WHERE id = $8 RETURNING {COLUMNS}"
    ))
    .bind(&data.slug)
    .bind(&data.title)
    .bind(&data.content)
    .bind(&data.meta_title)
    .bind(&data.meta_description)
    .bind(data.is_published)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(page)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM pages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
