//! Shopping cart and cart line items.

use common::{TourId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// One line item in a user's shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Unique line-item ID, assigned when the item is added.
    pub id: String,
    /// The tour being purchased.
    pub tour_id: TourId,
    /// Display name of the tour at the time it was added.
    pub name: String,
    /// Price of the tour at the time it was added.
    pub price: Money,
}

impl CartItem {
    /// Creates a new cart item with a fresh line-item ID.
    pub fn new(tour_id: impl Into<TourId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tour_id: tour_id.into(),
            name: name.into(),
            price,
        }
    }
}

/// A user's shopping cart.
///
/// A cart with zero items is equivalent to no cart at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    /// Returns true if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Recomputes the cart total from its item prices.
    pub fn total(&self) -> Money {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Returns the tour IDs of all items, in cart order.
    pub fn tour_ids(&self) -> Vec<TourId> {
        self.items.iter().map(|item| item.tour_id.clone()).collect()
    }
}
