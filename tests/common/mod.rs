#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use blog_admin_api::app::{app, AppState};
use blog_admin_api::auth::{generate_jwt, Claims};
use blog_admin_api::config::config;
use blog_admin_api::database::models::User;
use blog_admin_api::database::{Backend, MemoryStore, RoleOracle, UserDirectory};

/// Router over a fresh in-memory store. Each test builds its own, so tests
/// can run in parallel without sharing state.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(Backend::memory(store.clone()));
        Self {
            router: app(state, config()),
            store,
        }
    }

    pub async fn user(&self, name: &str) -> Result<TestUser> {
        let user = User::new(name);
        self.store.create_user(&user).await?;
        let token = generate_jwt(&Claims::new(user.id, name))?;
        Ok(TestUser { id: user.id, token })
    }

    pub async fn admin(&self, name: &str) -> Result<TestUser> {
        let user = self.user(name).await?;
        self.store.grant(user.id).await?;
        Ok(user)
    }

    pub async fn is_admin(&self, id: Uuid) -> Result<bool> {
        Ok(self.store.is_admin(id).await?)
    }

    /// Send one request through the router and decode the JSON body
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
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, who: &TestUser) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(&who.token), None).await
    }

    pub async fn post(&self, uri: &str, who: &TestUser, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(&who.token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, who: &TestUser) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, Some(&who.token), None).await
    }

    /// Submit a promotion request and return its id
    pub async fn submit(&self, who: &TestUser) -> Result<Uuid> {
        let (status, body) = self
            .post("/api/admin/requests", who, serde_json::json!({ "message": "let me in" }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "submit failed: {} {}", status, body);
        let id = body["data"]["id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing request id in {}", body))?;
        Ok(id.parse()?)
    }

    pub async fn vote(&self, request_id: Uuid, who: &TestUser, approve: bool) -> Result<(StatusCode, Value)> {
        self.post(
            &format!("/api/admin/requests/{}/votes", request_id),
            who,
            serde_json::json!({ "approve": approve }),
        )
        .await
    }
}
