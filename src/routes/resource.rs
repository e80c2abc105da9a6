//! Resource CRUD routes. One parameterized path serves every resource in the model;
//! handlers resolve the resource from the first segment.

use super::method_not_allowed;
use crate::handlers::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/:path_segment", get(list).post(create).fallback(method_not_allowed))
        .route(
            "/:path_segment/:id",
            get(read)
                .put(update)
                .patch(update)
                .delete(delete_handler)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}
