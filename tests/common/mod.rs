#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use tourista_api::{
    app,
    auth::TokenService,
    cors_layer,
    database::{Collection, DocumentStore, Filter, MemoryStore},
    AppState,
};
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: TokenService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(1))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenService::new(SECRET, ttl);
        let shared: Arc<dyn DocumentStore> = store.clone();
        let state = AppState::new(shared, tokens.clone());
        let router = app(state, cors_layer(&["http://localhost:5173".to_string()]));
        Self {
            router,
            store,
            tokens,
        }
    }

    pub fn token_for(&self, uid: &str) -> String {
        let claims = json!({ "uid": uid });
        self.tokens
            .issue(claims.as_object().cloned().unwrap_or_default())
            .expect("issue token")
    }

    /// Send a request and decode the body as JSON (plain text becomes a JSON string)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok((status, value))
    }

    /// Exact number of stored documents in `collection`
    pub async fn stored(&self, collection: Collection) -> Result<u64> {
        Ok(self.store.count(collection, &Filter::all()).await?)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, token, Some(body)).await
    }
}
