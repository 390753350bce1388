//! HTTP route handlers and shared application state.

pub mod cart;
pub mod health;
pub mod metrics;
pub mod sagas;
pub mod tokens;

use std::sync::Arc;

use saga::{
    CheckoutOrchestrator, InMemoryCartProvider, InMemoryCatalogChecker, InMemoryOwnershipChecker,
    InMemoryPaymentGateway, InMemoryPurchaseStore, InMemorySagaStore,
};

use crate::auth::IdentityVerifier;

/// The orchestrator wired over the in-memory collaborators.
pub type Orchestrator = CheckoutOrchestrator<
    InMemoryCartProvider,
    InMemoryCatalogChecker,
    InMemoryOwnershipChecker,
    InMemoryPaymentGateway,
    InMemoryPurchaseStore,
    InMemorySagaStore,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub carts: InMemoryCartProvider,
    pub catalog: InMemoryCatalogChecker,
    pub purchases: InMemoryPurchaseStore,
    pub verifier: Arc<dyn IdentityVerifier>,
}
