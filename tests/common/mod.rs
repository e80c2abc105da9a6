#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use project_hub::sql::QueryBuf;
use project_hub::store::{Row, Store};
use project_hub::config::{parse_resources, resolve, ResolvedModel};
use project_hub::{app_router, builtin_model, AppState};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Store double: pops queued responses in order and records every statement.
#[derive(Default)]
pub struct ScriptedStore {
    responses: Mutex<Vec<Result<Vec<Row>, sqlx::Error>>>,
    pub seen: Mutex<Vec<QueryBuf>>,
    pub down: bool,
}

impl ScriptedStore {
    pub fn with(mut responses: Vec<Result<Vec<Row>, sqlx::Error>>) -> Arc<Self> {
        responses.reverse();
        Arc::new(ScriptedStore {
            responses: Mutex::new(responses),
            ..Default::default()
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(ScriptedStore {
            down: true,
            ..Default::default()
        })
    }

    pub fn statements(&self) -> Vec<QueryBuf> {
        self.seen.lock().unwrap().clone()
    }

    fn next(&self, q: &QueryBuf) -> Result<Vec<Row>, sqlx::Error> {
        self.seen.lock().unwrap().push(q.clone());
        self.responses.lock().unwrap().pop().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl Store for ScriptedStore {
    async fn fetch_all(&self, query: &QueryBuf) -> Result<Vec<Row>, sqlx::Error> {
        self.next(query)
    }

    async fn fetch_optional(&self, query: &QueryBuf) -> Result<Option<Row>, sqlx::Error> {
        self.next(query).map(|rows| rows.into_iter().next())
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        if self.down {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

pub fn row(v: Value) -> Row {
    v.as_object().expect("row must be an object").clone()
}

pub fn app(store: Arc<ScriptedStore>) -> Router {
    app_with_model(store, builtin_model().expect("builtin model"))
}

pub fn app_with_model(store: Arc<ScriptedStore>, model: ResolvedModel) -> Router {
    app_router(AppState::new(store, model), 64 * 1024)
}

/// Resolve a resource definition document for tests that need non-text fields.
pub fn model(json: &str) -> ResolvedModel {
    resolve(&parse_resources(json).expect("parse resources")).expect("resolve resources")
}

pub async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, json)
}
