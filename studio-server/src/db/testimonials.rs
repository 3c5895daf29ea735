//! Testimonial database operations

use shared::models::{Testimonial, TestimonialCreate, TestimonialUpdate};
use sqlx::PgPool;

use super::BoxError;

const COLUMNS: &str = "id, author_name, content, rating, photo_url, is_published, position, created_at, updated_at";

pub async fn list(pool: &PgPool, published_only: bool) -> Result<Vec<Testimonial>, BoxError> {
    let items = sqlx::query_as::<_, Testimonial>(&format!(
        "SELECT {COLUMNS} FROM testimonials WHERE ($1 = FALSE OR is_published) ORDER BY position, created_at DESC"
    ))
    .bind(published_only)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Testimonial>, BoxError> {
    let item = sqlx::query_as::<_, Testimonial>(&format!("SELECT {COLUMNS} FROM testimonials WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

pub async fn create(pool: &PgPool, data: &TestimonialCreate) -> Result<Testimonial, BoxError> {
    let now = shared::util::now_millis();
    let item = sqlx::query_as::<_, Testimonial>(&format!(
        "INSERT INTO testimonials (id, author_name, content, rating, photo_url, is_published, position, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {COLUMNS}"
    ))
    .bind(super::snowflake_id())
    .bind(&data.author_name)
    .bind(&data.content)
    .bind(data.rating)
    .bind(&data.photo_url)
    .bind(data.is_published.unwrap_or(false))
    .bind(data.position.unwrap_or(0))
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(item)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &TestimonialUpdate,
) -> Result<Option<Testimonial>, BoxError> {
    let now = shared::util::now_millis();
    let item = sqlx::query_as::<_, Testimonial>(&format!(
        "UPDATE testimonials SET author_name = COALESCE($1, author_name), content = COALESCE($2, content), \
         rating = COALESCE($3, rating), photo_url = COALESCE($4, photo_url), is_published = COALESCE($5, is_published), \
         position = COALESCE($6, position), updated_at = $7 WHERE id = $8 RETURNING {COLUMNS}"
    ))
    .bind(&data.author_name)
    .bind(&data.content)
    .bind(data.rating)
    .bind(&data.photo_url)
    .bind(data.is_published)
    .bind(data.position)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM testimonials WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
