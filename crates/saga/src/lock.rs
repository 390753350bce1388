//! Per-user mutual exclusion for checkout sagas.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use common::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes checkout sagas per user.
///
/// Two concurrent checkouts by the same user would otherwise both observe
/// the same cart, both charge payment, and both create duplicate tokens.
/// Holding the guard for the whole saga closes that window; sagas for
/// different users still run freely in parallel.
#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<StdMutex<HashMap<UserId, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    /// Creates an empty lock registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for a user, waiting if another saga holds it.
    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry(user_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
