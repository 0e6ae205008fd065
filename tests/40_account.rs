mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use wowapi::types::UserId;

#[tokio::test]
async fn logout_ends_only_the_presented_session() -> Result<()> {
    let app = TestApp::new();
    let phone = app.user_with_session(7, "seven").await;
    app.store.insert_session("laptop", UserId(7)).await;

    let (status, body) = app.send(Method::POST, "/api/logout", Some(&phone), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["logged_out"], true);

    let (status, body) = app.get("/api/me", Some(&phone)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let (status, _) = app.get("/api/me", Some("laptop")).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn delete_account_requires_confirmation() -> Result<()> {
    let app = TestApp::new();
    let token = app.user_with_session(7, "seven").await;

    let (status, body) = app
        .send(Method::DELETE, "/api/account", Some(&token), Some(json!({})))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["confirm"].is_string());
    assert!(app.store.user_exists(UserId(7)).await);
    Ok(())
}

#[tokio::test]
async fn delete_account_removes_user_and_every_session() -> Result<()> {
    let app = TestApp::new();
    let token = app.user_with_session(7, "seven").await;
    app.store.insert_session("second-device", UserId(7)).await;
    let other = app.user_with_session(8, "eight").await;

    let (status, body) = app
        .send(Method::DELETE, "/api/account", Some(&token), Some(json!({"confirm": true})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    assert!(!app.store.user_exists(UserId(7)).await);
    for t in [token.as_str(), "second-device"] {
        let (status, _) = app.get("/api/me", Some(t)).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, _) = app.get("/api/me", Some(&other)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn feelings_require_a_session() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app.get("/api/feelings", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.user_with_session(7, "seven").await;
    let (status, body) = app.get("/api/feelings", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0], json!({"name": "happy", "label": "Happy"}));
    Ok(())
}
