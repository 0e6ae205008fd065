#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use wowapi::config::{AppConfig, Environment};
use wowapi::database::MemoryStore;
use wowapi::state::AppState;
use wowapi::types::UserId;

/// The real router wired to an in-memory store the test can seed and inspect.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_state(store.clone(), AppState::in_memory(store, Default::default()))
    }

    pub fn with_state(store: Arc<MemoryStore>, state: AppState) -> Self {
        let config = AppConfig::preset(Environment::Development);
        Self {
            router: wowapi::app(state, &config),
            store,
        }
    }

    /// Creates a user with one session and returns the token.
    pub async fn user_with_session(&self, user_id: i64, username: &str) -> String {
        let token = format!("tok-{username}");
        self.store.insert_user(UserId(user_id), username).await;
        self.store.insert_session(&token, UserId(user_id)).await;
        token
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.raw(request).await
    }

    pub async fn raw(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, json))
    }
}
