//! Checkout saga orchestration for the tour platform.
//!
//! This crate coordinates a multi-step purchase across independently-owned
//! stores and services (cart storage, tour catalog, payment gateway) without
//! a shared transaction. The checkout saga runs six steps in strict order:
//!
//! 1. Fetch the cart
//! 2. Check for tours the user already owns
//! 3. Check catalog availability
//! 4. Process payment
//! 5. Create the token/purchase pair per item
//! 6. Clear the cart
//!
//! Business rejections (empty cart, duplicate ownership, unavailable tour,
//! declined payment) end the saga with no compensation. Any other failure
//! triggers the compensation engine, which deletes created tokens and
//! purchase records and refunds a processed payment. Every saga persists an
//! append-only step log for audit and recovery.

pub mod checkout;
pub mod compensation;
pub mod error;
pub mod lock;
pub mod orchestrator;
pub mod record;
pub mod services;
pub mod state;
mod steps;
pub mod store;

pub use compensation::CompensationEngine;
pub use error::{BusinessError, CheckoutError, SagaStoreError, ServiceError, StepError};
pub use lock::UserLocks;
pub use orchestrator::{CheckoutOrchestrator, CheckoutResult};
pub use record::{PurchasePair, SagaState, StepRecord};
pub use services::{
    CartProvider, CatalogChecker, InMemoryCartProvider, InMemoryCatalogChecker,
    InMemoryOwnershipChecker, InMemoryPaymentGateway, InMemoryPurchaseStore, OwnershipChecker,
    PaymentGateway, PurchaseStore,
};
pub use state::{SagaStatus, StepStatus};
pub use store::{InMemorySagaStore, SagaStore};
