//! HTTP API server with observability for the checkout saga.
//!
//! Provides REST endpoints for cart management, checkout, saga inspection,
//! and purchase tokens, with structured logging (tracing) and Prometheus
//! metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::StaticTokenVerifier;
use routes::{AppState, Orchestrator};
use saga::{
    CheckoutOrchestrator, InMemoryCartProvider, InMemoryCatalogChecker, InMemoryOwnershipChecker,
    InMemoryPaymentGateway, InMemoryPurchaseStore, InMemorySagaStore,
};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::get))
        .route("/cart/items", post(routes::cart::add_item))
        .route("/cart/items/{item_id}", delete(routes::cart::remove_item))
        .route("/cart/checkout", post(routes::cart::checkout))
        .route("/sagas/{id}", get(routes::sagas::get))
        .route("/tokens", get(routes::tokens::list))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over in-memory collaborators.
///
/// Also returns the catalog and payment handles so callers (the binary,
/// tests) can seed tours and configure gateway behavior.
pub fn create_default_state() -> (
    Arc<AppState>,
    StaticTokenVerifier,
    InMemoryCatalogChecker,
    InMemoryPaymentGateway,
) {
    let carts = InMemoryCartProvider::new();
    let catalog = InMemoryCatalogChecker::new();
    let ownership = InMemoryOwnershipChecker::new();
    let payment = InMemoryPaymentGateway::new();
    let purchases = InMemoryPurchaseStore::new();
    let sagas = InMemorySagaStore::new();
    let verifier = StaticTokenVerifier::new();

    let orchestrator: Orchestrator = CheckoutOrchestrator::new(
        carts.clone(),
        catalog.clone(),
        ownership,
        payment.clone(),
        purchases.clone(),
        sagas,
    );

    let state = Arc::new(AppState {
        orchestrator,
        carts,
        catalog: catalog.clone(),
        purchases,
        verifier: Arc::new(verifier.clone()),
    });

    (state, verifier, catalog, payment)
}
