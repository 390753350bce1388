//! The six checkout step executors.
//!
//! Each step appends a STARTED entry, performs its action against one
//! collaborator, then appends a COMPLETED or FAILED entry. Step *n+1* never
//! starts before step *n*'s COMPLETED entry is durably recorded.

use common::{SagaId, UserId};
use domain::{Cart, PurchaseRecord, PurchaseToken};

use crate::checkout::{
    STEP_CHECK_AVAILABILITY, STEP_CHECK_OWNERSHIP, STEP_CLEAR_CART, STEP_CREATE_PURCHASES,
    STEP_FETCH_CART, STEP_PROCESS_PAYMENT,
};
use crate::error::{BusinessError, StepError};
use crate::orchestrator::CheckoutOrchestrator;
use crate::record::StepRecord;
use crate::services::cart::CartProvider;
use crate::services::catalog::CatalogChecker;
use crate::services::ownership::OwnershipChecker;
use crate::services::payment::PaymentGateway;
use crate::services::purchases::PurchaseStore;
use crate::store::SagaStore;

impl<C, K, O, P, R, S> CheckoutOrchestrator<C, K, O, P, R, S>
where
    C: CartProvider,
    K: CatalogChecker,
    O: OwnershipChecker,
    P: PaymentGateway,
    R: PurchaseStore,
    S: SagaStore,
{
    /// Executes the step sequence strictly in order.
    pub(crate) async fn run_steps(
        &self,
        saga_id: SagaId,
        user_id: &UserId,
    ) -> Result<Vec<PurchaseRecord>, StepError> {
        let cart = self.fetch_cart(saga_id, user_id).await?;
        self.check_ownership(saga_id, user_id, &cart).await?;
        self.check_availability(saga_id, &cart).await?;
        self.process_payment(saga_id, user_id, &cart).await?;
        let purchased = self.create_purchases(saga_id, user_id, &cart).await?;
        self.clear_cart(saga_id, user_id).await?;
        Ok(purchased)
    }

    /// Step 1: load the cart. An absent or empty cart is a business
    /// rejection.
    async fn fetch_cart(&self, saga_id: SagaId, user_id: &UserId) -> Result<Cart, StepError> {
        self.sagas
            .append_step(saga_id, StepRecord::started(STEP_FETCH_CART))
            .await?;

        let cart = match self.carts.get_cart(user_id).await {
            Ok(cart) => cart,
            Err(e) => return Err(self.step_failed(saga_id, STEP_FETCH_CART, e.into()).await),
        };

        match cart {
            Some(cart) if !cart.is_empty() => {
                self.sagas
                    .append_step(
                        saga_id,
                        StepRecord::completed(STEP_FETCH_CART).with_metadata(serde_json::json!({
                            "items": cart.items.len(),
                            "total_cents": cart.total().cents(),
                        })),
                    )
                    .await?;
                Ok(cart)
            }
            _ => Err(self
                .step_failed(saga_id, STEP_FETCH_CART, BusinessError::CartEmpty.into())
                .await),
        }
    }

    /// Step 2: reject the checkout if the user already owns any tour in
    /// the cart, naming the first conflict in cart order.
    async fn check_ownership(
        &self,
        saga_id: SagaId,
        user_id: &UserId,
        cart: &Cart,
    ) -> Result<(), StepError> {
        self.sagas
            .append_step(saga_id, StepRecord::started(STEP_CHECK_OWNERSHIP))
            .await?;

        let tour_ids = cart.tour_ids();
        let owned = match self.ownership.find_owned(user_id, &tour_ids).await {
            Ok(owned) => owned,
            Err(e) => return Err(self.step_failed(saga_id, STEP_CHECK_OWNERSHIP, e.into()).await),
        };

        if let Some(conflict) = tour_ids.iter().find(|id| owned.contains(id)) {
            let err = BusinessError::DuplicatePurchase {
                tour_id: conflict.clone(),
            };
            return Err(self
                .step_failed(saga_id, STEP_CHECK_OWNERSHIP, err.into())
                .await);
        }

        self.sagas
            .append_step(
                saga_id,
                StepRecord::completed(STEP_CHECK_OWNERSHIP)
                    .with_metadata(serde_json::json!({ "checked": tour_ids.len() })),
            )
            .await?;
        Ok(())
    }

    /// Step 3: verify every tour exists and is purchasable. All-or-nothing:
    /// the first unavailable item aborts the saga before any token exists.
    async fn check_availability(&self, saga_id: SagaId, cart: &Cart) -> Result<(), StepError> {
        self.sagas
            .append_step(saga_id, StepRecord::started(STEP_CHECK_AVAILABILITY))
            .await?;

        for item in &cart.items {
            let status = match self.catalog.tour_status(&item.tour_id).await {
                Ok(status) => status,
                Err(e) => {
                    return Err(self
                        .step_failed(saga_id, STEP_CHECK_AVAILABILITY, e.into())
                        .await);
                }
            };

            let err = match status {
                None => BusinessError::TourNotFound {
                    tour_id: item.tour_id.clone(),
                },
                Some(status) if !status.is_purchasable() => BusinessError::TourUnavailable {
                    tour_id: item.tour_id.clone(),
                    status: status.as_str().to_string(),
                },
                Some(_) => continue,
            };
            return Err(self
                .step_failed(saga_id, STEP_CHECK_AVAILABILITY, err.into())
                .await);
        }

        self.sagas
            .append_step(
                saga_id,
                StepRecord::completed(STEP_CHECK_AVAILABILITY)
                    .with_metadata(serde_json::json!({ "checked": cart.items.len() })),
            )
            .await?;
        Ok(())
    }

    /// Step 4: charge the cart total. The amount is recorded on the saga
    /// before the charge, and `payment_processed` is set immediately after
    /// the gateway accepts, so compensation knows whether to refund.
    async fn process_payment(
        &self,
        saga_id: SagaId,
        user_id: &UserId,
        cart: &Cart,
    ) -> Result<(), StepError> {
        self.sagas
            .append_step(saga_id, StepRecord::started(STEP_PROCESS_PAYMENT))
            .await?;

        let amount = cart.total();
        self.sagas.record_payment_amount(saga_id, amount).await?;

        match self.payment.charge(user_id, amount).await {
            Ok(true) => {}
            Ok(false) => {
                let err = BusinessError::PaymentDeclined { amount };
                return Err(self
                    .step_failed(saga_id, STEP_PROCESS_PAYMENT, err.into())
                    .await);
            }
            Err(e) => {
                return Err(self.step_failed(saga_id, STEP_PROCESS_PAYMENT, e.into()).await);
            }
        }

        self.sagas.mark_payment_processed(saga_id).await?;
        self.sagas
            .append_step(
                saga_id,
                StepRecord::completed(STEP_PROCESS_PAYMENT)
                    .with_metadata(serde_json::json!({ "amount_cents": amount.cents() })),
            )
            .await?;
        Ok(())
    }

    /// Step 5: create the token/purchase pair for every cart item.
    ///
    /// Each pair is recorded on the saga before the writes, so compensation
    /// can find it even if one of the two writes fails mid-pair.
    async fn create_purchases(
        &self,
        saga_id: SagaId,
        user_id: &UserId,
        cart: &Cart,
    ) -> Result<Vec<PurchaseRecord>, StepError> {
        self.sagas
            .append_step(saga_id, StepRecord::started(STEP_CREATE_PURCHASES))
            .await?;

        let mut purchased = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let token = PurchaseToken::issue(user_id.clone(), item.tour_id.clone());
            let record = PurchaseRecord::for_token(&token);

            self.sagas
                .record_purchase(saga_id, item.tour_id.clone(), token.token.clone())
                .await?;
            if let Err(e) = self.purchases.insert_token(token).await {
                return Err(self
                    .step_failed(saga_id, STEP_CREATE_PURCHASES, e.into())
                    .await);
            }
            if let Err(e) = self.purchases.insert_purchase(record.clone()).await {
                return Err(self
                    .step_failed(saga_id, STEP_CREATE_PURCHASES, e.into())
                    .await);
            }
            purchased.push(record);
        }

        self.sagas
            .append_step(
                saga_id,
                StepRecord::completed(STEP_CREATE_PURCHASES)
                    .with_metadata(serde_json::json!({ "created": purchased.len() })),
            )
            .await?;
        Ok(purchased)
    }

    /// Step 6: clear the cart. Irreversible, therefore always last —
    /// nothing can fail downstream of it, so it is never compensated.
    async fn clear_cart(&self, saga_id: SagaId, user_id: &UserId) -> Result<(), StepError> {
        self.sagas
            .append_step(saga_id, StepRecord::started(STEP_CLEAR_CART))
            .await?;

        if let Err(e) = self.carts.clear_cart(user_id).await {
            return Err(self.step_failed(saga_id, STEP_CLEAR_CART, e.into()).await);
        }

        self.sagas
            .append_step(saga_id, StepRecord::completed(STEP_CLEAR_CART))
            .await?;
        Ok(())
    }

    /// Appends a FAILED entry for the step and hands the error back.
    /// Recording must not mask the original failure, so a store error here
    /// is only logged.
    async fn step_failed(&self, saga_id: SagaId, step: &str, err: StepError) -> StepError {
        let record = StepRecord::failed(step, err.to_string());
        if let Err(store_err) = self.sagas.append_step(saga_id, record).await {
            tracing::error!(%saga_id, step, error = %store_err, "failed to record step failure");
        }
        err
    }
}
