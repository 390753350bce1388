//! External collaborator traits and in-memory implementations.
//!
//! The saga only ever talks to these interfaces; it does not own the cart
//! store, the catalog, the ownership index, the payment gateway, or the
//! purchase store.

pub mod cart;
pub mod catalog;
pub mod ownership;
pub mod payment;
pub mod purchases;

pub use cart::{CartProvider, InMemoryCartProvider};
pub use catalog::{CatalogChecker, InMemoryCatalogChecker};
pub use ownership::{InMemoryOwnershipChecker, OwnershipChecker};
pub use payment::{InMemoryPaymentGateway, PaymentGateway};
pub use purchases::{InMemoryPurchaseStore, PurchaseStore};
