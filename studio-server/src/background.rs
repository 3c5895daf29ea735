//! Periodic maintenance tasks

use std::time::Duration;

use crate::state::AppState;

/// Expiry sweep period
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Unpaid gift card checkouts are abandoned after a day
const PENDING_GIFT_CARD_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Raw analytics events are kept for two years
const ANALYTICS_RETENTION_MS: i64 = 730 * 24 * 60 * 60 * 1000;

/// Rate limiter cleanup every 5 minutes
pub fn spawn_rate_limit_cleanup(state: &AppState) {
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });
}

/// Challenge and gift card expiry, abandoned checkouts, analytics retention
pub fn spawn_sweeper(state: &AppState) {
    let state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweep(&state).await;
        }
    });
}

async fn sweep(state: &AppState) {
    let now = shared::util::now_millis();
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();

    match crate::db::challenges::expire_overdue(&state.pool, now).await {
        Ok(n) if n > 0 => tracing::info!(count = n, "Expired photo challenges"),
        Ok(_) => {}
        Err(e) => tracing::error!(error = %e, "Challenge expiry sweep failed"),
    }

    match crate::db::challenges::complete_past_sessions(&state.pool, &today).await {
        Ok(n) if n > 0 => tracing::info!(count = n, "Completed photo challenges"),
        Ok(_) => {}
        Err(e) => tracing::error!(error = %e, "Challenge completion sweep failed"),
    }

    match crate::db::gift_cards::expire_overdue(&state.pool, now).await {
        Ok(n) if n > 0 => tracing::info!(count = n, "Expired gift cards"),
        Ok(_) => {}
        Err(e) => tracing::error!(error = %e, "Gift card expiry sweep failed"),
    }

    match crate::db::gift_cards::cancel_stale_pending(&state.pool, now - PENDING_GIFT_CARD_TTL_MS).await {
        Ok(n) if n > 0 => tracing::info!(count = n, "Cancelled unpaid gift cards"),
        Ok(_) => {}
        Err(e) => tracing::error!(error = %e, "Gift card checkout sweep failed"),
    }

    match crate::db::analytics::purge_before(&state.pool, now - ANALYTICS_RETENTION_MS).await {
        Ok(n) if n > 0 => tracing::debug!(count = n, "Purged old analytics events"),
        Ok(_) => {}
        Err(e) => tracing::error!(error = %e, "Analytics retention sweep failed"),
    }
}
