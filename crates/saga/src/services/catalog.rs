//! Tour catalog checker trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::TourId;
use domain::TourStatus;

use crate::error::ServiceError;

const SERVICE: &str = "tour-catalog";

/// Reports whether a tour exists and what its publication status is.
#[async_trait]
pub trait CatalogChecker: Send + Sync {
    /// Returns the tour's status, or `None` if the catalog does not know it.
    async fn tour_status(&self, tour_id: &TourId) -> Result<Option<TourStatus>, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    tours: HashMap<TourId, TourStatus>,
    fail_on_lookup: bool,
}

/// In-memory catalog checker for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogChecker {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogChecker {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tour with the given status.
    pub fn insert_tour(&self, tour_id: impl Into<TourId>, status: TourStatus) {
        self.state
            .write()
            .unwrap()
            .tours
            .insert(tour_id.into(), status);
    }

    /// Configures the checker to fail on the next lookup.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_lookup = fail;
    }
}

#[async_trait]
impl CatalogChecker for InMemoryCatalogChecker {
    async fn tour_status(&self, tour_id: &TourId) -> Result<Option<TourStatus>, ServiceError> {
        let state = self.state.read().unwrap();
        if state.fail_on_lookup {
            return Err(ServiceError::new(SERVICE, "catalog unavailable"));
        }
        Ok(state.tours.get(tour_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_known_tour() {
        let catalog = InMemoryCatalogChecker::new();
        catalog.insert_tour("t1", TourStatus::Published);

        let status = catalog.tour_status(&TourId::new("t1")).await.unwrap();
        assert_eq!(status, Some(TourStatus::Published));
    }

    #[tokio::test]
    async fn test_unknown_tour_is_none() {
        let catalog = InMemoryCatalogChecker::new();
        let status = catalog.tour_status(&TourId::new("missing")).await.unwrap();
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn test_fail_on_lookup() {
        let catalog = InMemoryCatalogChecker::new();
        catalog.set_fail_on_lookup(true);
        assert!(catalog.tour_status(&TourId::new("t1")).await.is_err());
    }
}
