//! HTTP server setup and routing.

pub mod error;
pub mod handlers;
pub mod headers;

use axum::{
    routing::{get, post},
    Router,
};
use entity_sync_shared::Entity;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::create_cors_layer;
use crate::config::Dependencies;
use crate::sync::EntitySyncService;
use crate::AppError;

pub use error::ApiError;

/// Routes for one entity type, mounted under `/api/{collection}` and
/// `/api/_search/{collection}`.
pub fn entity_routes<E: Entity>(service: Arc<EntitySyncService<E>>) -> Router {
    let collection = format!("/api/{}", E::COLLECTION);

    Router::new()
        .route(
            &collection,
            post(handlers::create_entity::<E>)
                .put(handlers::update_entity::<E>)
                .get(handlers::list_entities::<E>),
        )
        .route(
            &format!("{}/:id", collection),
            get(handlers::get_entity::<E>).delete(handlers::delete_entity::<E>),
        )
        .route(
            &format!("/api/_search/{}", E::COLLECTION),
            get(handlers::search_entities::<E>),
        )
        .with_state(service)
}

/// Create the Axum application router with all routes and middleware
pub fn create_app(deps: &Dependencies, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(entity_routes(Arc::clone(&deps.samples)))
        .merge(entity_routes(Arc::clone(&deps.payment_methods)))
        .layer(create_cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Run the server on the specified address until Ctrl+C.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "Server listening");
    info!("- Health endpoint: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(e) => {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
