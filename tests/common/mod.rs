#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use devconnector_api::config::AppConfig;
use devconnector_api::database::MemoryStore;
use devconnector_api::{app, AppState};

pub const TOKEN_HEADER: &str = "x-auth-token";

/// The full router over a fresh in-memory store
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let state = AppState::new(AppConfig::testing(), Arc::new(MemoryStore::new()))
            .context("failed to build test state")?;
        Ok(Self { router: app(state) })
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
            builder = builder.header(TOKEN_HEADER, token);
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
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, token, body).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Register a user and return its token
    pub async fn register(&self, name: &str, email: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/api/users",
                None,
                json!({ "name": name, "email": email, "password": "secret1" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "registration failed: {status} {body}");

        body["token"]
            .as_str()
            .map(str::to_string)
            .context("registration response has no token")
    }

    /// Id of the user behind `token`
    pub async fn user_id(&self, token: &str) -> Result<String> {
        let (_, body) = self.get("/api/auth", Some(token)).await?;
        body["id"]
            .as_str()
            .map(str::to_string)
            .context("current user has no id")
    }
}
