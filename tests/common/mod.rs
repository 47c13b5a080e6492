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
use tower_http::normalize_path::NormalizePath;

use softdesk_api::auth::{generate_jwt, Claims};
use softdesk_api::config::PermissionsConfig;
use softdesk_api::database::models::UserId;
use softdesk_api::database::{EntityStore, MemoryStore};
use softdesk_api::{app, AppState};

/// The full router over a fresh in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    service: NormalizePath<Router>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn id(&self) -> i64 {
        self.body["data"]["id"].as_i64().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_permissions(PermissionsConfig::default())
    }

    pub fn with_permissions(permissions: PermissionsConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), permissions);
        Self {
            store,
            service: app(state),
        }
    }

    pub async fn user(&self, username: &str) -> Result<UserId> {
        Ok(self.store.create_user(username).await?.id)
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        user: Option<UserId>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(user_id) = user {
            let token = generate_jwt(Claims::new(user_id))?;
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        self.raw(request).await
    }

    pub async fn raw(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.service.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, path: &str, user: UserId) -> Result<TestResponse> {
        self.send(Method::GET, path, Some(user), None).await
    }

    pub async fn post(&self, path: &str, user: UserId, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, path, Some(user), Some(body)).await
    }

    pub async fn put(&self, path: &str, user: UserId, body: Value) -> Result<TestResponse> {
        self.send(Method::PUT, path, Some(user), Some(body)).await
    }

    pub async fn patch(&self, path: &str, user: UserId, body: Value) -> Result<TestResponse> {
        self.send(Method::PATCH, path, Some(user), Some(body)).await
    }

    pub async fn delete(&self, path: &str, user: UserId) -> Result<TestResponse> {
        self.send(Method::DELETE, path, Some(user), None).await
    }

    /// Creates a project as `author` through the API
    pub async fn project(&self, author: UserId, title: &str) -> Result<i64> {
        let res = self
            .post(
                "/projects/",
                author,
                serde_json::json!({
                    "title": title,
                    "description": format!("{} description", title),
                    "type": "back-end"
                }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "project create failed: {}", res.body);
        Ok(res.id())
    }

    /// Adds `user` to the project, acting as the project author
    pub async fn enroll(&self, project: i64, author: UserId, user: UserId, role: &str) -> Result<()> {
        let res = self
            .post(
                &format!("/projects/{}/users/", project),
                author,
                serde_json::json!({ "user_id": user, "role": role }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "enroll failed: {}", res.body);
        Ok(())
    }

    pub async fn issue(&self, project: i64, author: UserId, title: &str) -> Result<i64> {
        let res = self
            .post(&format!("/projects/{}/issues/", project), author, issue_body(title))
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "issue create failed: {}", res.body);
        Ok(res.id())
    }

    pub async fn comment(&self, project: i64, issue: i64, author: UserId, text: &str) -> Result<i64> {
        let res = self
            .post(
                &format!("/projects/{}/issues/{}/comments/", project, issue),
                author,
                serde_json::json!({ "description": text }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "comment create failed: {}", res.body);
        Ok(res.id())
    }
}

pub fn issue_body(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "description": format!("{} details", title),
        "tag": "bug",
        "priority": "medium",
        "status": "todo"
    })
}
