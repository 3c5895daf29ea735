use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::availability::SlotRules;
use shared::error::{AppError, ErrorCode};
use shared::models::{KEY_CHALLENGE_DISCOUNT, KEY_SLOT_RULES, Setting, SettingUpsert, is_valid_key};

use crate::api::{ApiResult, internal};
use crate::db;
use crate::state::AppState;

use super::deleted;

fn check_key(key: &str) -> Result<(), AppError> {
    if !is_valid_key(key) {
        return Err(AppError::invalid_field("key", "Keys are dotted lowercase identifiers"));
    }
    Ok(())
}

/// Keys the server reads itself must hold a value of the expected shape.
fn check_value(key: &str, value: &serde_json::Value) -> Result<(), AppError> {
    match key {
        KEY_SLOT_RULES => {
            let rules: SlotRules = serde_json::from_value(value.clone())
                .map_err(|e| AppError::invalid_field("value", format!("Invalid slot rules: {e}")))?;
            if rules.weekday_starts.is_empty() && rules.weekend_starts.is_empty() {
                return Err(AppError::invalid_field("value", "At least one start time is required"));
            }
        }
        KEY_CHALLENGE_DISCOUNT => {
            let in_range = value.as_i64().is_some_and(|v| (0..=100).contains(&v));
            if !in_range {
                return Err(AppError::new(ErrorCode::ValueOutOfRange).with_detail("field", "value"));
            }
        }
        _ => {}
    }
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Setting>> {
    let settings = db::settings::list(&state.pool).await.map_err(internal)?;
    Ok(Json(settings))
}

pub async fn get(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<Setting> {
    check_key(&key)?;
    let setting = db::settings::get(&state.pool, &key)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::SettingNotFound))?;
    Ok(Json(setting))
}

pub async fn put(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SettingUpsert>,
) -> ApiResult<Setting> {
    check_key(&key)?;
    check_value(&key, &req.value)?;
    let setting = db::settings::upsert(&state.pool, &key, &req.value).await.map_err(internal)?;
    tracing::info!(key = %key, "Setting updated");
    Ok(Json(setting))
}

pub async fn delete(State(state): State<AppState>, Path(key): Path<String>) -> Result<StatusCode, AppError> {
    check_key(&key)?;
    let removed = db::settings::delete(&state.pool, &key).await.map_err(internal)?;
    deleted(removed, ErrorCode::SettingNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slot_rules_value_is_parsed() {
        let ok = json!({ "weekday_starts": ["18:00"], "weekend_starts": ["10:00", "12:00"] });
        assert!(check_value(KEY_SLOT_RULES, &ok).is_ok());

        let bad = json!({ "weekday_starts": ["6pm"], "weekend_starts": [] });
        assert!(check_value(KEY_SLOT_RULES, &bad).is_err());

        let empty = json!({ "weekday_starts": [], "weekend_starts": [] });
        assert!(check_value(KEY_SLOT_RULES, &empty).is_err());
    }

    #[test]
    fn challenge_discount_is_a_percentage() {
        assert!(check_value(KEY_CHALLENGE_DISCOUNT, &json!(25)).is_ok());
        assert!(check_value(KEY_CHALLENGE_DISCOUNT, &json!(101)).is_err());
        assert!(check_value(KEY_CHALLENGE_DISCOUNT, &json!("25")).is_err());
    }

    #[test]
    fn other_keys_accept_any_json() {
        assert!(check_value("studio.contact", &json!({ "phone": "+48 600 000 000" })).is_ok());
        assert!(check_key("Studio Contact").is_err());
    }
}
