//! Checkout orchestrator: drives the saga step sequence and classifies
//! failures.

use common::{SagaId, UserId};
use domain::PurchaseRecord;
use serde::{Deserialize, Serialize};

use crate::compensation::CompensationEngine;
use crate::error::{CheckoutError, SagaStoreError, StepError};
use crate::lock::UserLocks;
use crate::record::SagaState;
use crate::services::cart::CartProvider;
use crate::services::catalog::CatalogChecker;
use crate::services::ownership::OwnershipChecker;
use crate::services::payment::PaymentGateway;
use crate::services::purchases::PurchaseStore;
use crate::state::SagaStatus;
use crate::store::SagaStore;

/// The purchases produced by a completed checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub saga_id: SagaId,
    pub user_id: UserId,
    pub purchased: Vec<PurchaseRecord>,
}

/// Orchestrates the checkout saga across the cart store, tour catalog,
/// ownership index, payment gateway, and purchase store.
///
/// Steps run strictly in order: fetch-cart, check-ownership,
/// check-availability, process-payment, create-purchases, clear-cart. A
/// business rejection stops the pipeline with no compensation; any other
/// failure triggers exactly one compensation attempt.
pub struct CheckoutOrchestrator<C, K, O, P, R, S>
where
    C: CartProvider,
    K: CatalogChecker,
    O: OwnershipChecker,
    P: PaymentGateway,
    R: PurchaseStore,
    S: SagaStore,
{
    pub(crate) carts: C,
    pub(crate) catalog: K,
    pub(crate) ownership: O,
    pub(crate) payment: P,
    pub(crate) purchases: R,
    pub(crate) sagas: S,
    compensation: CompensationEngine<P, R, S>,
    locks: UserLocks,
}

impl<C, K, O, P, R, S> CheckoutOrchestrator<C, K, O, P, R, S>
where
    C: CartProvider,
    K: CatalogChecker,
    O: OwnershipChecker,
    P: PaymentGateway + Clone,
    R: PurchaseStore + Clone,
    S: SagaStore + Clone,
{
    /// Creates a new orchestrator over the given collaborators.
    pub fn new(carts: C, catalog: K, ownership: O, payment: P, purchases: R, sagas: S) -> Self {
        let compensation =
            CompensationEngine::new(payment.clone(), purchases.clone(), sagas.clone());
        Self {
            carts,
            catalog,
            ownership,
            payment,
            purchases,
            sagas,
            compensation,
            locks: UserLocks::new(),
        }
    }
}

impl<C, K, O, P, R, S> CheckoutOrchestrator<C, K, O, P, R, S>
where
    C: CartProvider,
    K: CatalogChecker,
    O: OwnershipChecker,
    P: PaymentGateway,
    R: PurchaseStore,
    S: SagaStore,
{
    /// Runs one checkout saga for the user.
    ///
    /// Business rejections propagate verbatim. System failures surface only
    /// as the generic [`CheckoutError::System`]; the real cause is retained
    /// in the saga log.
    #[tracing::instrument(skip(self), fields(user = %user_id))]
    pub async fn checkout(&self, user_id: UserId) -> Result<CheckoutResult, CheckoutError> {
        metrics::counter!("checkout_sagas_total").increment(1);
        let start = std::time::Instant::now();

        // One saga at a time per user for the whole sequence.
        let _guard = self.locks.acquire(&user_id).await;

        // The audit anchor: persisted before any step runs.
        let saga = SagaState::new(user_id.clone());
        let saga_id = saga.saga_id;
        if let Err(e) = self.sagas.insert(saga).await {
            tracing::error!(%saga_id, error = %e, "failed to persist saga record");
            return Err(CheckoutError::System);
        }
        tracing::info!(%saga_id, "checkout saga started");

        let result = match self.run_steps(saga_id, &user_id).await {
            Ok(purchased) => {
                self.finish(saga_id, SagaStatus::Completed, None).await;
                metrics::counter!("checkout_sagas_completed").increment(1);
                tracing::info!(%saga_id, purchases = purchased.len(), "checkout completed");
                Ok(CheckoutResult {
                    saga_id,
                    user_id,
                    purchased,
                })
            }
            Err(StepError::Business(err)) => {
                // No compensation: nothing was committed, or the rejection
                // is itself the validation.
                self.finish(saga_id, SagaStatus::Failed, Some(err.to_string()))
                    .await;
                metrics::counter!("checkout_sagas_failed", "kind" => "business").increment(1);
                tracing::info!(%saga_id, reason = err.code(), "checkout rejected");
                Err(CheckoutError::Business(err))
            }
            Err(StepError::System(reason)) => {
                metrics::counter!("checkout_sagas_failed", "kind" => "system").increment(1);
                tracing::error!(%saga_id, %reason, "system failure, compensating");
                self.finish(saga_id, SagaStatus::Compensating, Some(reason))
                    .await;
                self.compensation.compensate(saga_id).await;
                Err(CheckoutError::System)
            }
        };

        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());
        result
    }

    /// Loads a saga record for audit queries.
    pub async fn saga_status(
        &self,
        saga_id: SagaId,
    ) -> Result<Option<SagaState>, SagaStoreError> {
        self.sagas.load(saga_id).await
    }

    async fn finish(&self, saga_id: SagaId, status: SagaStatus, error: Option<String>) {
        if let Err(e) = self.sagas.set_status(saga_id, status, error).await {
            tracing::error!(%saga_id, %status, error = %e, "failed to record saga status");
        }
    }
}
