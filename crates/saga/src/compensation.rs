//! Compensation engine: reverses the side effects of a failed saga.

use common::SagaId;

use crate::checkout::{STEP_COMPENSATE_PAYMENT, STEP_COMPENSATE_PURCHASES};
use crate::record::StepRecord;
use crate::services::payment::PaymentGateway;
use crate::services::purchases::PurchaseStore;
use crate::state::SagaStatus;
use crate::store::SagaStore;

/// Undoes the committed side effects of a saga that hit a system failure.
///
/// Invoked only for system failures, never for business rejections. Works
/// exclusively from the persisted saga record, so it is correct even when
/// invoked in a different process than the one that ran the steps.
pub struct CompensationEngine<P, R, S>
where
    P: PaymentGateway,
    R: PurchaseStore,
    S: SagaStore,
{
    payment: P,
    purchases: R,
    sagas: S,
}

impl<P, R, S> CompensationEngine<P, R, S>
where
    P: PaymentGateway,
    R: PurchaseStore,
    S: SagaStore,
{
    /// Creates a new compensation engine.
    pub fn new(payment: P, purchases: R, sagas: S) -> Self {
        Self {
            payment,
            purchases,
            sagas,
        }
    }

    /// Runs compensation for the given saga. Returns true if every side
    /// effect was undone and the saga ended `COMPENSATED`.
    ///
    /// Token and purchase deletions are best-effort: a single failure is
    /// logged and the remaining deletions still run, maximizing cleanup.
    /// A failed refund is the one unrecoverable outcome: the saga is marked
    /// `COMPENSATION_FAILED` and left for manual intervention.
    #[tracing::instrument(skip(self))]
    pub async fn compensate(&self, saga_id: SagaId) -> bool {
        metrics::counter!("checkout_compensations_total").increment(1);

        let saga = match self.sagas.load(saga_id).await {
            Ok(Some(saga)) => saga,
            Ok(None) => {
                tracing::error!(%saga_id, "saga not found, cannot compensate");
                return false;
            }
            Err(e) => {
                tracing::error!(%saga_id, error = %e, "failed to load saga for compensation");
                return false;
            }
        };

        let mut failures = 0usize;
        let mut deleted_tokens = 0usize;
        for token in &saga.created_tokens {
            match self.purchases.delete_token(token).await {
                Ok(()) => deleted_tokens += 1,
                Err(e) => {
                    failures += 1;
                    tracing::warn!(%saga_id, error = %e, "failed to delete token");
                }
            }
        }

        let mut deleted_purchases = 0usize;
        for pair in &saga.created_purchases {
            match self.purchases.delete_purchase(&pair.token).await {
                Ok(()) => deleted_purchases += 1,
                Err(e) => {
                    failures += 1;
                    tracing::warn!(%saga_id, tour = %pair.tour_id, error = %e, "failed to delete purchase record");
                }
            }
        }

        self.append_log(
            saga_id,
            StepRecord::completed(STEP_COMPENSATE_PURCHASES).with_metadata(serde_json::json!({
                "deleted_tokens": deleted_tokens,
                "deleted_purchases": deleted_purchases,
                "failures": failures,
            })),
        )
        .await;

        if saga.payment_processed {
            // Exactly one refund attempt of the exact charged amount.
            let refunded = match self.payment.refund(&saga.user_id, saga.payment_amount).await {
                Ok(ok) => ok,
                Err(e) => {
                    tracing::error!(%saga_id, error = %e, "refund call failed");
                    false
                }
            };

            if !refunded {
                self.append_log(
                    saga_id,
                    StepRecord::failed(STEP_COMPENSATE_PAYMENT, "refund failed"),
                )
                .await;
                self.finish(saga_id, SagaStatus::CompensationFailed).await;
                metrics::counter!("checkout_compensations_failed").increment(1);
                tracing::error!(
                    %saga_id,
                    amount = %saga.payment_amount,
                    "refund failed, manual intervention required"
                );
                return false;
            }

            self.append_log(
                saga_id,
                StepRecord::completed(STEP_COMPENSATE_PAYMENT).with_metadata(serde_json::json!({
                    "refunded_cents": saga.payment_amount.cents(),
                })),
            )
            .await;
        }

        self.finish(saga_id, SagaStatus::Compensated).await;
        tracing::info!(%saga_id, deleted_tokens, deleted_purchases, "compensation finished");
        true
    }

    async fn append_log(&self, saga_id: SagaId, record: StepRecord) {
        if let Err(e) = self.sagas.append_step(saga_id, record).await {
            tracing::warn!(%saga_id, error = %e, "failed to record compensation step");
        }
    }

    async fn finish(&self, saga_id: SagaId, status: SagaStatus) {
        if let Err(e) = self.sagas.set_status(saga_id, status, None).await {
            tracing::error!(%saga_id, %status, error = %e, "failed to record compensation outcome");
        }
    }
}
