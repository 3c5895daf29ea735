//! Processed Stripe webhook events (idempotency)

use sqlx::PgPool;

use super::BoxError;

/// Record an event id. `false` if it was already processed.
pub async fn record(pool: &PgPool, event_id: &str, event_type: &str) -> Result<bool, BoxError> {
    let rows = sqlx::query(
        "INSERT INTO processed_webhook_events (event_id, event_type, processed_at) \
         VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Forget an event so Stripe's retry is processed again.
pub async fn forget(pool: &PgPool, event_id: &str) -> Result<(), BoxError> {
    sqlx::query("DELETE FROM processed_webhook_events WHERE event_id = $1")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}
