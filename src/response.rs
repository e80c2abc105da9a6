//! Response envelopes: records are keyed by the resource's singular or plural name.

use crate::config::{Record, ResolvedResource};
use axum::{http::StatusCode, Json};
use serde_json::{Map, Value};

fn keyed(key: &str, value: Value) -> Json<Value> {
    let mut body = Map::new();
    body.insert(key.to_string(), value);
    Json(Value::Object(body))
}

/// 200 `{ "<plural>": [...] }`.
pub fn success_many(resource: &ResolvedResource, records: Vec<Record>) -> (StatusCode, Json<Value>) {
    let items = records.into_iter().map(Value::Object).collect();
    (StatusCode::OK, keyed(&resource.plural, Value::Array(items)))
}

/// 201 `{ "<name>": {...} }`.
pub fn success_one(resource: &ResolvedResource, record: Record) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, keyed(&resource.name, Value::Object(record)))
}

/// 200 `{ "<name>": {...} }`.
pub fn success_one_ok(resource: &ResolvedResource, record: Record) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, keyed(&resource.name, Value::Object(record)))
}

/// 200 `{ "message": "<Label> deleted successfully" }`.
pub fn deleted(resource: &ResolvedResource) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, keyed("message", Value::String(resource.deleted_message())))
}
