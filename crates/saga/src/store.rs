//! Durable storage for saga records.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{SagaId, TourId};
use domain::Money;
use tokio::sync::RwLock;

use crate::error::SagaStoreError;
use crate::record::{SagaState, StepRecord};
use crate::state::SagaStatus;

/// Durable record of saga lifecycles — the only persisted artifact the
/// orchestrator itself owns.
///
/// Mutations are narrow, single-document operations; the step log is
/// append-only. Records are never deleted (audit retention).
#[async_trait]
pub trait SagaStore: Send + Sync {
    /// Persists a fresh saga record. This is the audit anchor and must
    /// succeed before any step runs.
    async fn insert(&self, saga: SagaState) -> Result<(), SagaStoreError>;

    /// Loads a saga record by ID.
    async fn load(&self, saga_id: SagaId) -> Result<Option<SagaState>, SagaStoreError>;

    /// Appends a step log entry and advances the saga's current step.
    async fn append_step(&self, saga_id: SagaId, record: StepRecord)
    -> Result<(), SagaStoreError>;

    /// Records the amount the payment step is about to charge.
    async fn record_payment_amount(
        &self,
        saga_id: SagaId,
        amount: Money,
    ) -> Result<(), SagaStoreError>;

    /// Marks the payment as charged. Gates the refund during compensation.
    async fn mark_payment_processed(&self, saga_id: SagaId) -> Result<(), SagaStoreError>;

    /// Records a created token/purchase pair so compensation can find it
    /// without re-deriving anything.
    async fn record_purchase(
        &self,
        saga_id: SagaId,
        tour_id: TourId,
        token: String,
    ) -> Result<(), SagaStoreError>;

    /// Transitions the saga status, optionally recording a failure reason.
    async fn set_status(
        &self,
        saga_id: SagaId,
        status: SagaStatus,
        error: Option<String>,
    ) -> Result<(), SagaStoreError>;
}

/// In-memory saga store for testing and single-process deployments.
#[derive(Clone, Default)]
pub struct InMemorySagaStore {
    sagas: Arc<RwLock<HashMap<SagaId, SagaState>>>,
    fail_on_append: Arc<AtomicBool>,
    fail_on_update: Arc<AtomicBool>,
}

impl InMemorySagaStore {
    /// Creates a new empty in-memory saga store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of saga records stored.
    pub async fn saga_count(&self) -> usize {
        self.sagas.read().await.len()
    }

    /// Returns the ID of the only stored saga. `None` unless exactly one
    /// record exists. Test helper for error paths where the caller never
    /// learns the saga ID.
    pub async fn only_saga_id(&self) -> Option<SagaId> {
        let sagas = self.sagas.read().await;
        if sagas.len() == 1 {
            sagas.keys().next().copied()
        } else {
            None
        }
    }

    /// Configures `append_step` to fail, simulating storage loss mid-saga.
    pub fn set_fail_on_append(&self, fail: bool) {
        self.fail_on_append.store(fail, Ordering::SeqCst);
    }

    /// Configures payment/purchase mutations to fail.
    pub fn set_fail_on_update(&self, fail: bool) {
        self.fail_on_update.store(fail, Ordering::SeqCst);
    }

    async fn update<F>(&self, saga_id: SagaId, mutate: F) -> Result<(), SagaStoreError>
    where
        F: FnOnce(&mut SagaState),
    {
        let mut sagas = self.sagas.write().await;
        let saga = sagas
            .get_mut(&saga_id)
            .ok_or(SagaStoreError::NotFound(saga_id))?;
        mutate(saga);
        Ok(())
    }

    fn check_update_fault(&self) -> Result<(), SagaStoreError> {
        if self.fail_on_update.load(Ordering::SeqCst) {
            return Err(SagaStoreError::Unavailable(
                "injected update failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SagaStore for InMemorySagaStore {
    async fn insert(&self, saga: SagaState) -> Result<(), SagaStoreError> {
        let mut sagas = self.sagas.write().await;
        sagas.insert(saga.saga_id, saga);
        Ok(())
    }

    async fn load(&self, saga_id: SagaId) -> Result<Option<SagaState>, SagaStoreError> {
        let sagas = self.sagas.read().await;
        Ok(sagas.get(&saga_id).cloned())
    }

    async fn append_step(
        &self,
        saga_id: SagaId,
        record: StepRecord,
    ) -> Result<(), SagaStoreError> {
        if self.fail_on_append.load(Ordering::SeqCst) {
            return Err(SagaStoreError::Unavailable(
                "injected append failure".to_string(),
            ));
        }
        self.update(saga_id, |saga| saga.append_step(record)).await
    }

    async fn record_payment_amount(
        &self,
        saga_id: SagaId,
        amount: Money,
    ) -> Result<(), SagaStoreError> {
        self.check_update_fault()?;
        self.update(saga_id, |saga| saga.payment_amount = amount)
            .await
    }

    async fn mark_payment_processed(&self, saga_id: SagaId) -> Result<(), SagaStoreError> {
        self.check_update_fault()?;
        self.update(saga_id, |saga| saga.payment_processed = true)
            .await
    }

    async fn record_purchase(
        &self,
        saga_id: SagaId,
        tour_id: TourId,
        token: String,
    ) -> Result<(), SagaStoreError> {
        self.check_update_fault()?;
        self.update(saga_id, |saga| saga.record_purchase(tour_id, token))
            .await
    }

    async fn set_status(
        &self,
        saga_id: SagaId,
        status: SagaStatus,
        error: Option<String>,
    ) -> Result<(), SagaStoreError> {
        self.update(saga_id, |saga| saga.set_status(status, error))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::STEP_FETCH_CART;
    use common::UserId;

    #[tokio::test]
    async fn test_insert_and_load_roundtrip() {
        let store = InMemorySagaStore::new();
        let saga = SagaState::new(UserId::new("u1"));
        let saga_id = saga.saga_id;

        store.insert(saga).await.unwrap();
        let loaded = store.load(saga_id).await.unwrap().unwrap();
        assert_eq!(loaded.saga_id, saga_id);
        assert_eq!(store.saga_count().await, 1);
    }

    #[tokio::test]
    async fn test_load_missing_saga_returns_none() {
        let store = InMemorySagaStore::new();
        let result = store.load(SagaId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_append_step_on_missing_saga_is_not_found() {
        let store = InMemorySagaStore::new();
        let result = store
            .append_step(SagaId::new(), StepRecord::started(STEP_FETCH_CART))
            .await;
        assert!(matches!(result, Err(SagaStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_append_step_grows_log_monotonically() {
        let store = InMemorySagaStore::new();
        let saga = SagaState::new(UserId::new("u1"));
        let saga_id = saga.saga_id;
        store.insert(saga).await.unwrap();

        store
            .append_step(saga_id, StepRecord::started(STEP_FETCH_CART))
            .await
            .unwrap();
        store
            .append_step(saga_id, StepRecord::completed(STEP_FETCH_CART))
            .await
            .unwrap();

        let loaded = store.load(saga_id).await.unwrap().unwrap();
        assert_eq!(loaded.steps_completed.len(), 2);
        assert_eq!(loaded.current_step, STEP_FETCH_CART);
    }

    #[tokio::test]
    async fn test_payment_mutations_update_record() {
        let store = InMemorySagaStore::new();
        let saga = SagaState::new(UserId::new("u1"));
        let saga_id = saga.saga_id;
        store.insert(saga).await.unwrap();

        store
            .record_payment_amount(saga_id, Money::from_cents(2500))
            .await
            .unwrap();
        store.mark_payment_processed(saga_id).await.unwrap();

        let loaded = store.load(saga_id).await.unwrap().unwrap();
        assert_eq!(loaded.payment_amount, Money::from_cents(2500));
        assert!(loaded.payment_processed);
    }

    #[tokio::test]
    async fn test_record_purchase_appends_pairs() {
        let store = InMemorySagaStore::new();
        let saga = SagaState::new(UserId::new("u1"));
        let saga_id = saga.saga_id;
        store.insert(saga).await.unwrap();

        store
            .record_purchase(saga_id, TourId::new("t1"), "tok-1".to_string())
            .await
            .unwrap();

        let loaded = store.load(saga_id).await.unwrap().unwrap();
        assert_eq!(loaded.created_tokens, vec!["tok-1"]);
        assert_eq!(loaded.created_purchases.len(), 1);
    }

    #[tokio::test]
    async fn test_injected_append_failure_surfaces_as_unavailable() {
        let store = InMemorySagaStore::new();
        let saga = SagaState::new(UserId::new("u1"));
        let saga_id = saga.saga_id;
        store.insert(saga).await.unwrap();

        store.set_fail_on_append(true);
        let result = store
            .append_step(saga_id, StepRecord::started(STEP_FETCH_CART))
            .await;
        assert!(matches!(result, Err(SagaStoreError::Unavailable(_))));

        store.set_fail_on_append(false);
        store
            .append_step(saga_id, StepRecord::started(STEP_FETCH_CART))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_status_stamps_timestamps() {
        let store = InMemorySagaStore::new();
        let saga = SagaState::new(UserId::new("u1"));
        let saga_id = saga.saga_id;
        store.insert(saga).await.unwrap();

        store
            .set_status(saga_id, SagaStatus::Completed, None)
            .await
            .unwrap();
        let loaded = store.load(saga_id).await.unwrap().unwrap();
        assert_eq!(loaded.status, SagaStatus::Completed);
        assert!(loaded.completed_at.is_some());
    }
}
