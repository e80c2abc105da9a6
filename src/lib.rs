//! project-hub: configuration-driven REST backend for projects, users and items on PostgreSQL.

pub mod case;
pub mod config;
pub mod error;
pub mod migration;
pub mod response;
pub mod sql;
pub mod state;
pub mod store;
pub mod service;
pub mod handlers;
pub mod routes;

pub use config::{builtin_model, load_from_path, resolve, ResolvedModel, ResolvedResource, Settings};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use state::AppState;
pub use store::{ensure_database_exists, PgStore, Store};
pub use routes::{app_router, common_routes, resource_routes};
pub use service::CrudService;
