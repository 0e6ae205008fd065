use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::Resolution;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::UserId;

/// Identity resolved from the session token, injected by [`require_session`].
///
/// Handlers scope every query with `user_id`; it never comes from the
/// request body, path or query.
#[derive(Clone)]
pub struct ActingUser {
    pub user_id: UserId,
    token: String,
}

impl ActingUser {
    /// The presented session token, needed to end this session on logout.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for ActingUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActingUser")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Authenticates the request before anything else runs. Rejections end the
/// request with 401; a failing session store ends it with 503.
pub async fn require_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let acting = match state.authenticator.resolve(&headers).await {
        Ok(Resolution::Session { user_id, token }) => ActingUser {
            user_id,
            token: token.to_string(),
        },
        Ok(Resolution::Rejected(reason)) => return ApiError::Unauthorized(reason).into_response(),
        Err(e) => return ApiError::from(e).into_response(),
    };

    request.extensions_mut().insert(acting);
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ActingUser>().cloned().ok_or_else(|| {
            tracing::error!("ActingUser requested on a route without session middleware");
            ApiError::internal_server_error("Authentication pipeline misconfigured")
        })
    }
}
