//! Router assembly: common routes at the root, resources under `/api`.

mod common;
mod resource;

pub use common::common_routes;
pub use resource::resource_routes;

use crate::error::AppError;
use crate::state::AppState;
use axum::Router;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub const API_PREFIX: &str = "/api";

async fn not_found() -> AppError {
    AppError::NotFound("Not found".into())
}

pub(crate) async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Full application router with body limit and request tracing.
pub fn app_router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(API_PREFIX, resource_routes(state))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
}
