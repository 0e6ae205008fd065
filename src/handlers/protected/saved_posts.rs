use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query, State,
};
use serde::Serialize;

use super::utils::{self, PageQuery};
use crate::database::Post;
use crate::error::ApiError;
use crate::middleware::{ActingUser, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::Paginated;

#[derive(Debug, Serialize)]
pub struct SaveResult {
    pub post_id: i64,
    pub saved: bool,
}

/// GET /api/saved-posts - posts the acting user saved, most recent first
pub async fn list(
    State(state): State<AppState>,
    acting: ActingUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Paginated<Post>> {
    let page = utils::query(query)?.page(&state.page_limits);
    let posts = state.posts.saved_posts(acting.user_id, page).await?;
    Ok(ApiResponse::success(Paginated::new(posts, page)))
}

/// PUT /api/saved-posts/:post_id - save a post (idempotent)
pub async fn save(
    State(state): State<AppState>,
    acting: ActingUser,
    post_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<SaveResult> {
    let post_id = utils::path(post_id)?;
    if !state.posts.post_exists(post_id).await? {
        return Err(ApiError::not_found("Post not found"));
    }

    let created = state.posts.save_post(acting.user_id, post_id).await?;
    let result = SaveResult { post_id, saved: true };
    if created {
        tracing::debug!(user_id = %acting.user_id, post_id, "post saved");
        Ok(ApiResponse::created(result))
    } else {
        Ok(ApiResponse::success(result))
    }
}

/// DELETE /api/saved-posts/:post_id
pub async fn unsave(
    State(state): State<AppState>,
    acting: ActingUser,
    post_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<SaveResult> {
    let post_id = utils::path(post_id)?;
    if !state.posts.unsave_post(acting.user_id, post_id).await? {
        return Err(ApiError::not_found("Post is not saved"));
    }
    Ok(ApiResponse::success(SaveResult { post_id, saved: false }))
}
