use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use super::utils::{self, PageQuery};
use crate::database::Poke;
use crate::error::ApiError;
use crate::middleware::{ActingUser, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::{Paginated, UserId};

/// Body of `POST /api/pokes`. `user_id` is the recipient; the sender is
/// always the acting user.
#[derive(Debug, Deserialize)]
pub struct PokeRequest {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct DismissResult {
    pub id: i64,
    pub dismissed: bool,
}

/// GET /api/pokes - pokes received by the acting user
pub async fn list(
    State(state): State<AppState>,
    acting: ActingUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Paginated<Poke>> {
    let page = utils::query(query)?.page(&state.page_limits);
    let pokes = state.pokes.received(acting.user_id, page).await?;
    Ok(ApiResponse::success(Paginated::new(pokes, page)))
}

/// POST /api/pokes - poke another user
///
/// Expected Input:
/// ```json
/// { "user_id": 42 }
/// ```
pub async fn create(
    State(state): State<AppState>,
    acting: ActingUser,
    payload: Result<Json<PokeRequest>, JsonRejection>,
) -> ApiResult<Poke> {
    let PokeRequest { user_id: target } = utils::body(payload)?;

    if target == acting.user_id {
        return Err(ApiError::invalid_field("user_id", "You cannot poke yourself"));
    }
    if state.users.find_user(target).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let poke = state.pokes.poke(acting.user_id, target).await?;
    tracing::debug!(sender = %acting.user_id, receiver = %target, "poke sent");
    Ok(ApiResponse::created(poke))
}

/// DELETE /api/pokes/:id - dismiss a poke the acting user received
pub async fn dismiss(
    State(state): State<AppState>,
    acting: ActingUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<DismissResult> {
    let id = utils::path(id)?;
    if !state.pokes.dismiss(acting.user_id, id).await? {
        return Err(ApiError::not_found("Poke not found"));
    }
    Ok(ApiResponse::success(DismissResult { id, dismissed: true }))
}
