use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use super::utils;
use crate::error::ApiError;
use crate::middleware::{ActingUser, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteAccountResult {
    pub deleted: bool,
}

/// DELETE /api/account - permanently remove the acting user
///
/// Expected Input:
/// ```json
/// { "confirm": true }
/// ```
///
/// Sessions, saved posts and pokes go with the user row, so the token used
/// for this request stops working immediately.
pub async fn delete_account(
    State(state): State<AppState>,
    acting: ActingUser,
    payload: Result<Json<DeleteAccountRequest>, JsonRejection>,
) -> ApiResult<DeleteAccountResult> {
    let payload = utils::body(payload)?;
    if !payload.confirm {
        return Err(ApiError::invalid_field("confirm", "must be true to delete the account"));
    }

    if !state.users.delete_account(acting.user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = %acting.user_id, "account deleted");
    Ok(ApiResponse::success(DeleteAccountResult { deleted: true }))
}
