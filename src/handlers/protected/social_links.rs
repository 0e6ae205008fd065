use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::collections::BTreeMap;

use super::utils;
use crate::database::{SocialLinks, SocialLinksUpdate};
use crate::error::ApiError;
use crate::middleware::{ActingUser, ApiResponse, ApiResult};
use crate::state::AppState;

/// Column width of the social link fields on `Wo_Users`.
pub const MAX_LINK_LEN: usize = 255;

/// GET /api/social-links
pub async fn get(State(state): State<AppState>, acting: ActingUser) -> ApiResult<SocialLinks> {
    let links = state
        .users
        .social_links(acting.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(links))
}

/// PUT /api/social-links - partial update of the acting user's links
///
/// Unknown fields, including any `user_id`, are ignored: the row updated is
/// always the acting user's.
pub async fn update(
    State(state): State<AppState>,
    acting: ActingUser,
    payload: Result<Json<SocialLinksUpdate>, JsonRejection>,
) -> ApiResult<SocialLinks> {
    let update = utils::body(payload)?;

    let field_errors: BTreeMap<String, String> = update
        .fields()
        .into_iter()
        .filter(|(_, value)| value.chars().count() > MAX_LINK_LEN)
        .map(|(column, _)| (column.to_string(), format!("must be at most {MAX_LINK_LEN} characters")))
        .collect();
    if !field_errors.is_empty() {
        return Err(ApiError::ValidationError {
            message: "Validation failed".to_string(),
            field_errors,
        });
    }

    let links = state.users.update_social_links(acting.user_id, &update).await?;
    Ok(ApiResponse::success(links))
}
