//! Payment gateway trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;
use domain::Money;

use crate::error::ServiceError;

const SERVICE: &str = "payment-gateway";

/// Charges and refunds an amount for a user.
///
/// Both calls report success or failure only; there is no partial-charge
/// state. `Ok(false)` is a decline or refusal (a business outcome), `Err`
/// is a system failure.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges the user. Returns false if the charge was declined.
    async fn charge(&self, user_id: &UserId, amount: Money) -> Result<bool, ServiceError>;

    /// Refunds a previously charged amount. Returns false if the refund
    /// was refused.
    async fn refund(&self, user_id: &UserId, amount: Money) -> Result<bool, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    charges: Vec<(UserId, Money)>,
    refunds: Vec<(UserId, Money)>,
    decline_charge: bool,
    decline_refund: bool,
    fail_on_charge: bool,
    fail_on_refund: bool,
}

/// In-memory payment gateway for testing.
///
/// Records every charge and refund so tests can assert the exact amounts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline charges.
    pub fn set_decline_charge(&self, decline: bool) {
        self.state.write().unwrap().decline_charge = decline;
    }

    /// Configures the gateway to refuse refunds.
    pub fn set_decline_refund(&self, decline: bool) {
        self.state.write().unwrap().decline_refund = decline;
    }

    /// Configures charge calls to fail with a system error.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().unwrap().fail_on_charge = fail;
    }

    /// Configures refund calls to fail with a system error.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.state.write().unwrap().fail_on_refund = fail;
    }

    /// Returns the number of accepted charges.
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }

    /// Returns the number of accepted refunds.
    pub fn refund_count(&self) -> usize {
        self.state.read().unwrap().refunds.len()
    }

    /// Returns all accepted refunds in order.
    pub fn refunds(&self) -> Vec<(UserId, Money)> {
        self.state.read().unwrap().refunds.clone()
    }

    /// Returns all accepted charges in order.
    pub fn charges(&self) -> Vec<(UserId, Money)> {
        self.state.read().unwrap().charges.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn charge(&self, user_id: &UserId, amount: Money) -> Result<bool, ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_charge {
            return Err(ServiceError::new(SERVICE, "gateway unreachable"));
        }
        if state.decline_charge {
            return Ok(false);
        }
        state.charges.push((user_id.clone(), amount));
        Ok(true)
    }

    async fn refund(&self, user_id: &UserId, amount: Money) -> Result<bool, ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_refund {
            return Err(ServiceError::new(SERVICE, "gateway unreachable"));
        }
        if state.decline_refund {
            return Ok(false);
        }
        state.refunds.push((user_id.clone(), amount));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_charge_and_refund_are_recorded() {
        let gateway = InMemoryPaymentGateway::new();
        let user = UserId::new("u1");

        assert!(gateway.charge(&user, Money::from_cents(2500)).await.unwrap());
        assert!(gateway.refund(&user, Money::from_cents(2500)).await.unwrap());

        assert_eq!(gateway.charge_count(), 1);
        assert_eq!(gateway.refunds(), vec![(user, Money::from_cents(2500))]);
    }

    #[tokio::test]
    async fn test_declined_charge_is_not_recorded() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_decline_charge(true);

        let accepted = gateway
            .charge(&UserId::new("u1"), Money::from_cents(2500))
            .await
            .unwrap();
        assert!(!accepted);
        assert_eq!(gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_an_error() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_charge(true);
        let result = gateway.charge(&UserId::new("u1"), Money::from_cents(100)).await;
        assert!(result.is_err());
    }
}
