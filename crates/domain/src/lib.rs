//! Domain value objects for the tour checkout system.
//!
//! This crate holds the data the checkout saga moves between collaborators:
//! shopping carts, catalog availability, money, and the token/purchase pair
//! created for each bought tour.

mod cart;
mod money;
mod purchase;
mod tour;

pub use cart::{Cart, CartItem};
pub use money::Money;
pub use purchase::{PurchaseRecord, PurchaseToken};
pub use tour::TourStatus;
