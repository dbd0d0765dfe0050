use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::api::state::AppState;
use crate::core::{AppConfig, db::async_db};

pub fn app(shared_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    crate::cli::init_tracing(&format!(
        // axum logs rejections from built-in extractors with the `axum::rejection`
        // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
        "{}=debug,tower_http=debug,axum::rejection=trace",
        env!("CARGO_CRATE_NAME")
    ));

    let db = async_db(&config.db_path).await?;
    db.call(|conn| {
        crate::core::db::migrate_db(conn)?;
        Ok(())
    })
    .await?;

    let app_state = AppState::new(db, config);
    let app = app(Arc::new(app_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
