//! First-party page tracking

use axum::{Json, extract::State, http::StatusCode};
use shared::error::AppError;
use shared::models::AnalyticsEventCreate;

use crate::api::internal;
use crate::db;
use crate::state::AppState;

const MAX_PATH_LEN: usize = 512;
const MAX_METADATA_BYTES: usize = 4096;

fn validate_event(event: &AnalyticsEventCreate) -> Result<(), AppError> {
    if !event.path.starts_with('/') || event.path.len() > MAX_PATH_LEN {
        return Err(AppError::invalid_field("path", "Path must start with '/' and be at most 512 characters"));
    }
    if event.referrer.as_ref().is_some_and(|r| r.len() > MAX_PATH_LEN * 4) {
        return Err(AppError::invalid_field("referrer", "Referrer is too long"));
    }
    if let Some(metadata) = &event.metadata
        && metadata.to_string().len() > MAX_METADATA_BYTES
    {
        return Err(AppError::invalid_field("metadata", "Metadata is too large"));
    }
    Ok(())
}

/// POST /api/analytics/events
pub async fn track(State(state): State<AppState>, Json(event): Json<AnalyticsEventCreate>) -> Result<StatusCode, AppError> {
    validate_event(&event)?;
    db::analytics::insert_event(&state.pool, &event)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::AnalyticsEventType;

    fn event(path: &str) -> AnalyticsEventCreate {
        AnalyticsEventCreate {
            event_type: AnalyticsEventType::PageView,
            path: path.to_string(),
            referrer: None,
            session_id: Some("s-1".into()),
            metadata: None,
        }
    }

    #[test]
    fn paths_must_be_site_relative() {
        assert!(validate_event(&event("/portfolio")).is_ok());
        assert!(validate_event(&event("https://evil.example")).is_err());
        assert!(validate_event(&event(&format!("/{}", "a".repeat(MAX_PATH_LEN)))).is_err());
    }

    #[test]
    fn metadata_is_bounded() {
        let mut e = event("/");
        e.metadata = Some(serde_json::json!({ "blob": "x".repeat(MAX_METADATA_BYTES) }));
        assert!(validate_event(&e).is_err());
    }
}
