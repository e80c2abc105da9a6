//! project-hub server: loads settings, prepares the database, serves the resource API.

use project_hub::{
    app_router, apply_migrations, builtin_model, ensure_database_exists, load_from_path, resolve, AppState, PgStore,
    Settings,
};
use project_hub::config::settings::DEFAULT_LOG_FILTER;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let settings = Settings::from_env();

    let model = match &settings.resources_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading resource definitions");
            resolve(&load_from_path(path).await?)?
        }
        None => builtin_model()?,
    };

    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    apply_migrations(&pool, &model).await?;

    let state = AppState::new(Arc::new(PgStore::new(pool)), model);
    let app = app_router(state, settings.body_limit_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
