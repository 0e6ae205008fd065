use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "ok": true,
        "data": {
            "name": "wowapi",
            "version": env!("CARGO_PKG_VERSION"),
            "auth": "Authorization: Bearer <session token>",
            "endpoints": {
                "health": "/health (public)",
                "me": "/api/me, /api/logout, /api/account",
                "feelings": "/api/feelings",
                "saved_posts": "/api/saved-posts[/:post_id]",
                "pokes": "/api/pokes[/:id]",
                "memories": "/api/memories",
                "social_links": "/api/social-links",
            }
        }
    }))
}

/// GET /health - liveness plus session store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.sessions.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "ok": false,
                    "message": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
