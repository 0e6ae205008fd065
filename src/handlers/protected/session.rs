use axum::extract::State;
use serde::Serialize;

use crate::database::UserProfile;
use crate::error::ApiError;
use crate::middleware::{ActingUser, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LogoutResult {
    pub logged_out: bool,
}

/// GET /api/me - profile of the user that owns the presented session
pub async fn me(State(state): State<AppState>, acting: ActingUser) -> ApiResult<UserProfile> {
    let profile = state
        .users
        .find_user(acting.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(profile))
}

/// POST /api/logout - end the presented session
///
/// Only this token is removed; the user's other sessions stay valid.
pub async fn logout(State(state): State<AppState>, acting: ActingUser) -> ApiResult<LogoutResult> {
    let logged_out = state.sessions.delete_token(acting.token()).await?;
    tracing::info!(user_id = %acting.user_id, "session ended");
    Ok(ApiResponse::success(LogoutResult { logged_out }))
}
