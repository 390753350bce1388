//! Shared identifier types used across the tour checkout crates.

mod types;

pub use types::{SagaId, TourId, UserId};
