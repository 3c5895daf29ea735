//! Admin login

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::api::ApiResult;
use crate::auth::AdminIdentity;
use crate::auth::admin_auth::{self, JWT_EXPIRY_HOURS};
use crate::state::AppState;
use crate::util::verify_password;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// POST /api/admin/login
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let email_matches = req.email.trim().eq_ignore_ascii_case(&state.admin_email);
    // Always hash, so a wrong email costs as much as a wrong password
    let password_matches = verify_password(&req.password, &state.admin_password_hash);

    if !(email_matches && password_matches) {
        tracing::warn!(email = %req.email.trim(), "Admin login failed");
        return Err(AppError::invalid_credentials());
    }

    let token = admin_auth::create_token(&state.admin_email, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::internal("Failed to create session")
    })?;

    tracing::info!(email = %state.admin_email, "Admin logged in");
    Ok(Json(LoginResponse {
        token,
        expires_in: JWT_EXPIRY_HOURS * 3600,
    }))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub email: String,
}

/// GET /api/admin/me
pub async fn me(Extension(identity): Extension<AdminIdentity>) -> ApiResult<MeResponse> {
    Ok(Json(MeResponse { email: identity.email }))
}
