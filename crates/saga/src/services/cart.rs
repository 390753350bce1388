//! Cart provider trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;
use domain::{Cart, CartItem};

use crate::error::ServiceError;

const SERVICE: &str = "cart-provider";

/// Supplies the current cart for a user and supports clearing it.
#[async_trait]
pub trait CartProvider: Send + Sync {
    /// Returns the user's cart, or `None` if they have none.
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<Cart>, ServiceError>;

    /// Deletes the user's cart entry. Irreversible.
    async fn clear_cart(&self, user_id: &UserId) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    carts: HashMap<UserId, Cart>,
    fail_on_get: bool,
    fail_on_clear: bool,
    clear_count: usize,
}

/// In-memory cart provider.
///
/// Besides the core-facing trait it supports the cart CRUD the HTTP surface
/// exposes: adding and removing line items.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartProvider {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartProvider {
    /// Creates a new empty cart provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item to the user's cart, creating the cart if needed.
    pub fn add_item(&self, user_id: &UserId, item: CartItem) -> Cart {
        let mut state = self.state.write().unwrap();
        let cart = state
            .carts
            .entry(user_id.clone())
            .or_insert_with(|| Cart::new(user_id.clone()));
        cart.items.push(item);
        cart.clone()
    }

    /// Removes a line item by its ID. Returns the updated cart, or `None`
    /// if the user has no cart.
    pub fn remove_item(&self, user_id: &UserId, item_id: &str) -> Option<Cart> {
        let mut state = self.state.write().unwrap();
        let cart = state.carts.get_mut(user_id)?;
        cart.items.retain(|item| item.id != item_id);
        Some(cart.clone())
    }

    /// Returns how many times carts were cleared.
    pub fn clear_count(&self) -> usize {
        self.state.read().unwrap().clear_count
    }

    /// Returns true if the user currently has a cart entry.
    pub fn has_cart(&self, user_id: &UserId) -> bool {
        self.state.read().unwrap().carts.contains_key(user_id)
    }

    /// Configures the provider to fail on the next cart lookup.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.state.write().unwrap().fail_on_get = fail;
    }

    /// Configures the provider to fail on the next clear call.
    pub fn set_fail_on_clear(&self, fail: bool) {
        self.state.write().unwrap().fail_on_clear = fail;
    }
}

#[async_trait]
impl CartProvider for InMemoryCartProvider {
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<Cart>, ServiceError> {
        let state = self.state.read().unwrap();
        if state.fail_on_get {
            return Err(ServiceError::new(SERVICE, "cart store unavailable"));
        }
        Ok(state.carts.get(user_id).cloned())
    }

    async fn clear_cart(&self, user_id: &UserId) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_clear {
            return Err(ServiceError::new(SERVICE, "cart store unavailable"));
        }
        state.carts.remove(user_id);
        state.clear_count += 1;
        Ok(())
    }
}
