//! Purchase store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;
use domain::{PurchaseRecord, PurchaseToken};

use crate::error::ServiceError;

const SERVICE: &str = "purchase-store";

/// Stores the token/purchase pairs the saga creates.
///
/// Deletes are idempotent: deleting a token or record that does not exist
/// succeeds, which keeps compensation safe to run against partial writes.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Writes a purchase token.
    async fn insert_token(&self, token: PurchaseToken) -> Result<(), ServiceError>;

    /// Writes a purchase record.
    async fn insert_purchase(&self, record: PurchaseRecord) -> Result<(), ServiceError>;

    /// Deletes a token by its value.
    async fn delete_token(&self, token: &str) -> Result<(), ServiceError>;

    /// Deletes a purchase record by its token value.
    async fn delete_purchase(&self, token: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryPurchaseState {
    tokens: HashMap<String, PurchaseToken>,
    purchases: HashMap<String, PurchaseRecord>,
    fail_on_insert_token: bool,
    /// When set, `insert_purchase` fails once this many records exist.
    fail_insert_purchase_after: Option<usize>,
    fail_on_delete: bool,
}

/// In-memory purchase store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPurchaseStore {
    state: Arc<RwLock<InMemoryPurchaseState>>,
}

impl InMemoryPurchaseStore {
    /// Creates a new empty purchase store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tokens.
    pub fn token_count(&self) -> usize {
        self.state.read().unwrap().tokens.len()
    }

    /// Returns the number of stored purchase records.
    pub fn purchase_count(&self) -> usize {
        self.state.read().unwrap().purchases.len()
    }

    /// Returns true if a token with the given value exists.
    pub fn has_token(&self, token: &str) -> bool {
        self.state.read().unwrap().tokens.contains_key(token)
    }

    /// Returns all tokens belonging to a user, newest last.
    pub fn tokens_for_user(&self, user_id: &UserId) -> Vec<PurchaseToken> {
        let state = self.state.read().unwrap();
        let mut tokens: Vec<PurchaseToken> = state
            .tokens
            .values()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect();
        tokens.sort_by_key(|t| t.created_at);
        tokens
    }

    /// Configures token inserts to fail.
    pub fn set_fail_on_insert_token(&self, fail: bool) {
        self.state.write().unwrap().fail_on_insert_token = fail;
    }

    /// Configures `insert_purchase` to fail once `after` records exist.
    /// `after = 0` fails the first insert.
    pub fn fail_insert_purchase_after(&self, after: usize) {
        self.state.write().unwrap().fail_insert_purchase_after = Some(after);
    }

    /// Configures delete calls to fail.
    pub fn set_fail_on_delete(&self, fail: bool) {
        self.state.write().unwrap().fail_on_delete = fail;
    }
}

#[async_trait]
impl PurchaseStore for InMemoryPurchaseStore {
    async fn insert_token(&self, token: PurchaseToken) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_insert_token {
            return Err(ServiceError::new(SERVICE, "token write failed"));
        }
        state.tokens.insert(token.token.clone(), token);
        Ok(())
    }

    async fn insert_purchase(&self, record: PurchaseRecord) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if let Some(after) = state.fail_insert_purchase_after
            && state.purchases.len() >= after
        {
            return Err(ServiceError::new(SERVICE, "purchase write failed"));
        }
        state.purchases.insert(record.token.clone(), record);
        Ok(())
    }

    async fn delete_token(&self, token: &str) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_delete {
            return Err(ServiceError::new(SERVICE, "token delete failed"));
        }
        state.tokens.remove(token);
        Ok(())
    }

    async fn delete_purchase(&self, token: &str) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_delete {
            return Err(ServiceError::new(SERVICE, "purchase delete failed"));
        }
        state.purchases.remove(token);
        Ok(())
    }
}
