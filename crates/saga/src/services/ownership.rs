//! Ownership checker trait and in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{TourId, UserId};

use crate::error::ServiceError;

const SERVICE: &str = "ownership-index";

/// Reports which of a set of tours a user already owns.
#[async_trait]
pub trait OwnershipChecker: Send + Sync {
    /// Returns the subset of `tour_ids` already owned by the user, in the
    /// order they were queried.
    async fn find_owned(
        &self,
        user_id: &UserId,
        tour_ids: &[TourId],
    ) -> Result<Vec<TourId>, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryOwnershipState {
    owned: HashMap<UserId, HashSet<TourId>>,
    fail_on_lookup: bool,
}

/// In-memory ownership checker for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOwnershipChecker {
    state: Arc<RwLock<InMemoryOwnershipState>>,
}

impl InMemoryOwnershipChecker {
    /// Creates a new empty ownership index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a tour as already owned by a user.
    pub fn grant(&self, user_id: impl Into<UserId>, tour_id: impl Into<TourId>) {
        self.state
            .write()
            .unwrap()
            .owned
            .entry(user_id.into())
            .or_default()
            .insert(tour_id.into());
    }

    /// Configures the checker to fail on the next lookup.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_lookup = fail;
    }
}

#[async_trait]
impl OwnershipChecker for InMemoryOwnershipChecker {
    async fn find_owned(
        &self,
        user_id: &UserId,
        tour_ids: &[TourId],
    ) -> Result<Vec<TourId>, ServiceError> {
        let state = self.state.read().unwrap();
        if state.fail_on_lookup {
            return Err(ServiceError::new(SERVICE, "ownership index unavailable"));
        }
        let owned = match state.owned.get(user_id) {
            Some(set) => set,
            None => return Ok(Vec::new()),
        };
        Ok(tour_ids
            .iter()
            .filter(|id| owned.contains(id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_ownership_returns_empty() {
        let checker = InMemoryOwnershipChecker::new();
        let owned = checker
            .find_owned(&UserId::new("u1"), &[TourId::new("t1")])
            .await
            .unwrap();
        assert!(owned.is_empty());
    }

    #[tokio::test]
    async fn test_owned_tours_returned_in_query_order() {
        let checker = InMemoryOwnershipChecker::new();
        checker.grant("u1", "t3");
        checker.grant("u1", "t1");

        let owned = checker
            .find_owned(
                &UserId::new("u1"),
                &[TourId::new("t1"), TourId::new("t2"), TourId::new("t3")],
            )
            .await
            .unwrap();
        assert_eq!(owned, vec![TourId::new("t1"), TourId::new("t3")]);
    }

    #[tokio::test]
    async fn test_fail_on_lookup() {
        let checker = InMemoryOwnershipChecker::new();
        checker.set_fail_on_lookup(true);
        let result = checker
            .find_owned(&UserId::new("u1"), &[TourId::new("t1")])
            .await;
        assert!(result.is_err());
    }
}
