pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod types;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::public;
use crate::state::AppState;

/// Builds the full router: public routes plus the `/api` tier behind the
/// session middleware.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(protected_routes(state.clone()))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use crate::handlers::protected::{
        account, feelings, memories, pokes, saved_posts, session, social_links,
    };

    Router::new()
        .route("/api/me", get(session::me))
        .route("/api/logout", post(session::logout))
        .route("/api/account", axum::routing::delete(account::delete_account))
        .route("/api/feelings", get(feelings::list))
        .route("/api/saved-posts", get(saved_posts::list))
        .route(
            "/api/saved-posts/:post_id",
            put(saved_posts::save).delete(saved_posts::unsave),
        )
        .route("/api/pokes", get(pokes::list).post(pokes::create))
        .route("/api/pokes/:id", axum::routing::delete(pokes::dismiss))
        .route("/api/memories", get(memories::list))
        .route(
            "/api/social-links",
            get(social_links::get).put(social_links::update),
        )
        // route_layer: authentication runs before any handler extractor,
        // and unmatched paths still 404 instead of 401.
        .route_layer(from_fn_with_state(state, middleware::require_session))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE])
}
