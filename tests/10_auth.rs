mod common;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use common::TestApp;
use wowapi::auth::{AuthOutcome, RejectReason, SessionAuthenticator};
use wowapi::database::{DatabaseError, MemoryStore, SessionStore};
use wowapi::state::AppState;
use wowapi::types::UserId;

fn auth_headers(value: &str) -> axum::http::HeaderMap {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(header::AUTHORIZATION, value.parse().unwrap());
    headers
}

/// Session store whose backing database is down.
struct UnreachableStore;

#[async_trait]
impl SessionStore for UnreachableStore {
    async fn user_id_for_token(&self, _token: &str) -> Result<Option<UserId>, DatabaseError> {
        Err(DatabaseError::Unavailable("connection refused".into()))
    }
    async fn delete_token(&self, _token: &str) -> Result<bool, DatabaseError> {
        Err(DatabaseError::Unavailable("connection refused".into()))
    }
    async fn delete_for_user(&self, _user_id: UserId) -> Result<u64, DatabaseError> {
        Err(DatabaseError::Unavailable("connection refused".into()))
    }
    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(DatabaseError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn missing_header_is_unauthorized() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/api/me", None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"ok": false, "message": "Unauthorized"}));
    Ok(())
}

#[tokio::test]
async fn wrong_scheme_case_or_missing_space_is_unauthorized() -> Result<()> {
    let app = TestApp::new();
    app.user_with_session(42, "alice").await;

    for value in ["bearer tok-alice", "Bearer", "Bearertok-alice", "Token tok-alice"] {
        let request = Request::get("/api/me")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())?;
        let (status, body) = app.raw(request).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {value:?}");
        assert_eq!(body["message"], "Unauthorized", "header {value:?}");
    }
    Ok(())
}

#[tokio::test]
async fn unknown_token_is_invalid_token() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/api/me", Some("xyz123")).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"ok": false, "message": "Invalid token"}));
    Ok(())
}

#[tokio::test]
async fn known_token_resolves_acting_user() -> Result<()> {
    let app = TestApp::new();
    let token = app.user_with_session(42, "alice").await;

    let (status, body) = app.get("/api/me", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["id"], 42);
    assert_eq!(body["data"]["username"], "alice");
    Ok(())
}

#[tokio::test]
async fn token_must_match_exactly() -> Result<()> {
    let app = TestApp::new();
    app.user_with_session(42, "alice").await;

    for near_miss in ["TOK-ALICE", "tok-alice ", "Tok-alice"] {
        let (status, body) = app.get("/api/me", Some(near_miss)).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{near_miss:?}");
        assert_eq!(body["message"], "Invalid token");
    }

    // Logout with a near miss must not end the real session.
    let (status, _) = app
        .send(axum::http::Method::POST, "/api/logout", Some("TOK-ALICE"), None)
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.session_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn authenticate_matches_documented_outcomes() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("xyz123", UserId(42)).await;
    let auth = SessionAuthenticator::new(store);

    assert_eq!(
        auth.authenticate(&axum::http::HeaderMap::new()).await?,
        AuthOutcome::Rejected(RejectReason::MissingHeader)
    );
    assert_eq!(
        auth.authenticate(&auth_headers("bearer xyz123")).await?,
        AuthOutcome::Rejected(RejectReason::MissingHeader)
    );
    assert_eq!(
        auth.authenticate(&auth_headers("Bearer nope")).await?,
        AuthOutcome::Rejected(RejectReason::UnknownToken)
    );
    assert_eq!(
        auth.authenticate(&auth_headers("Bearer xyz123")).await?,
        AuthOutcome::Authenticated(UserId(42))
    );
    Ok(())
}

#[tokio::test]
async fn header_name_lookup_is_case_insensitive() -> Result<()> {
    let app = TestApp::new();
    let token = app.user_with_session(42, "alice").await;

    let request = Request::get("/api/me")
        .header("AUTHORIZATION", format!("Bearer {token}"))
        .body(Body::empty())?;
    let (status, _) = app.raw(request).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn authentication_is_idempotent_and_leaves_session_untouched() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store.insert_session("xyz123", UserId(42)).await;
    let before = store.session("xyz123").await;
    let auth = SessionAuthenticator::new(store.clone());

    for _ in 0..2 {
        assert_eq!(
            auth.authenticate(&auth_headers("Bearer xyz123")).await?,
            AuthOutcome::Authenticated(UserId(42))
        );
    }

    assert_eq!(store.session("xyz123").await, before);
    assert_eq!(store.session_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_lookups_never_cross_tokens() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    for id in 1..=50 {
        store.insert_session(&format!("token-{id}"), UserId(id)).await;
    }
    let auth = SessionAuthenticator::new(store);

    let lookups = (1..=50).cycle().take(500).map(|id| {
        let auth = auth.clone();
        tokio::spawn(async move {
            let outcome = auth
                .authenticate(&auth_headers(&format!("Bearer token-{id}")))
                .await
                .unwrap();
            (id, outcome)
        })
    });

    for joined in futures::future::join_all(lookups).await {
        let (id, outcome) = joined?;
        assert_eq!(outcome, AuthOutcome::Authenticated(UserId(id)));
    }
    Ok(())
}

#[tokio::test]
async fn store_outage_is_503_not_401() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        Arc::new(UnreachableStore),
        store.clone(),
        store.clone(),
        store.clone(),
        Default::default(),
    );
    let app = TestApp::with_state(store, state);

    let (status, body) = app.get("/api/me", Some("anything")).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ok"], false);
    assert_eq!(body["message"], "Session store unavailable");

    // A missing header never reaches the store, so it is still a plain 401.
    let (status, _) = app.get("/api/me", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn rejected_request_performs_no_work() -> Result<()> {
    let app = TestApp::new();
    let post_id = app.store.insert_post(UserId(7), "hello", 1_600_000_000).await;

    let (status, _) = app
        .send(
            axum::http::Method::PUT,
            &format!("/api/saved-posts/{post_id}"),
            Some("not-a-session"),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.user_with_session(7, "seven").await;
    let (_, body) = app.get("/api/saved-posts", Some(&token)).await?;
    assert_eq!(body["data"]["items"], json!([]));
    Ok(())
}

#[tokio::test]
async fn authentication_runs_before_body_validation() -> Result<()> {
    let app = TestApp::new();
    let request = Request::post("/api/pokes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;

    let (status, body) = app.raw(request).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn public_routes_need_no_token() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, _) = app.get("/", None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
