use axum::extract::{rejection::QueryRejection, Query, State};
use chrono::NaiveDate;
use serde::Deserialize;

use super::utils;
use crate::database::Post;
use crate::error::ApiError;
use crate::middleware::{ActingUser, ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct MemoriesQuery {
    /// `YYYY-MM-DD`; defaults to today (UTC).
    pub date: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// GET /api/memories - the acting user's posts from this day in past years
pub async fn list(
    State(state): State<AppState>,
    acting: ActingUser,
    query: Result<Query<MemoriesQuery>, QueryRejection>,
) -> ApiResult<Paginated<Post>> {
    let query = utils::query(query)?;
    let on = match query.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::invalid_field("date", "expected YYYY-MM-DD"))?,
        None => chrono::Utc::now().date_naive(),
    };
    let page = state.page_limits.page(query.limit, query.offset);

    let posts = state.posts.memories(acting.user_id, on, page).await?;
    Ok(ApiResponse::success(Paginated::new(posts, page)))
}
