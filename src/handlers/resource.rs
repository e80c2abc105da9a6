//! Resource CRUD handlers: list, create, read, update, delete.
//! Every store fault becomes a 500 with the resource-specific message; absent records become 404.

use crate::config::{Operation, ResolvedResource};
use crate::error::AppError;
use crate::response::{deleted, success_many, success_one, success_one_ok};
use crate::service::{ListQuery, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

fn resolve<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a ResolvedResource, AppError> {
    state
        .model
        .resource_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound("Not found".into()))
}

fn body_to_map(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    let Json(value) = payload?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn failed(resource: &ResolvedResource, op: Operation) -> impl FnOnce(AppError) -> AppError + '_ {
    move |e| {
        if let AppError::Db(ref source) = e {
            tracing::error!(resource = %resource.name, op = op.as_str(), error = %source, "store failure");
        }
        e.with_failure_message(resource.failure_message(op))
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&state, &path_segment)?;
    let query = ListQuery::from_params(resource, &params)?;
    let records = state
        .crud()
        .list(resource, &query)
        .await
        .map_err(failed(resource, Operation::List))?;
    Ok(success_many(resource, records))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&state, &path_segment)?;
    let body = body_to_map(payload)?;
    let input = RequestValidator::create_input(resource, &body)?;
    let record = state
        .crud()
        .create(resource, &input)
        .await
        .map_err(failed(resource, Operation::Create))?;
    Ok(success_one(resource, record))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&state, &path_segment)?;
    let record = state
        .crud()
        .get_by_id(resource, &id)
        .await
        .map_err(failed(resource, Operation::Get))?
        .ok_or_else(|| AppError::NotFound(resource.not_found_message()))?;
    Ok(success_one_ok(resource, record))
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&state, &path_segment)?;
    let body = body_to_map(payload)?;
    let input = RequestValidator::update_input(resource, &body)?;
    let record = state
        .crud()
        .update(resource, &id, &input)
        .await
        .map_err(failed(resource, Operation::Update))?
        .ok_or_else(|| AppError::NotFound(resource.not_found_message()))?;
    Ok(success_one_ok(resource, record))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let resource = resolve(&state, &path_segment)?;
    let removed = state
        .crud()
        .delete(resource, &id)
        .await
        .map_err(failed(resource, Operation::Delete))?;
    if !removed {
        return Err(AppError::NotFound(resource.not_found_message()));
    }
    Ok(deleted(resource))
}
