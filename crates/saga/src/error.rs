//! Checkout failure taxonomy.
//!
//! Failures fall into two classes with different handling:
//! business rejections propagate to the caller verbatim and never trigger
//! compensation; system failures trigger exactly one compensation attempt and
//! surface only as a generic message, with the real cause retained in the
//! saga log.

use common::{SagaId, TourId};
use domain::Money;
use thiserror::Error;

/// Expected, user-facing checkout rejections.
///
/// The saga ends `FAILED` with no compensation: either no side effect was
/// committed yet, or the rejected side effect is itself the validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusinessError {
    /// The user's cart is missing or has no items.
    #[error("cart is empty")]
    CartEmpty,

    /// The user already owns one of the tours in the cart.
    #[error("tour {tour_id} was already purchased")]
    DuplicatePurchase { tour_id: TourId },

    /// A cart item references a tour the catalog does not know.
    #[error("tour {tour_id} not found")]
    TourNotFound { tour_id: TourId },

    /// The tour exists but is archived or otherwise not purchasable.
    #[error("tour {tour_id} is not available for purchase (status: {status})")]
    TourUnavailable { tour_id: TourId, status: String },

    /// The payment gateway declined the charge.
    #[error("payment of {amount} was declined")]
    PaymentDeclined { amount: Money },
}

impl BusinessError {
    /// Machine-readable reason code for API responses and the saga log.
    pub fn code(&self) -> &'static str {
        match self {
            BusinessError::CartEmpty => "cart_empty",
            BusinessError::DuplicatePurchase { .. } => "duplicate_purchase",
            BusinessError::TourNotFound { .. } => "tour_not_found",
            BusinessError::TourUnavailable { .. } => "tour_unavailable",
            BusinessError::PaymentDeclined { .. } => "payment_declined",
        }
    }
}

/// Failure of a call to an external collaborator (cart store, catalog,
/// ownership index, payment gateway, purchase store).
///
/// Always classified as a system failure: collaborators report business
/// outcomes in their return values, never through this type.
#[derive(Debug, Clone, Error)]
#[error("{service}: {reason}")]
pub struct ServiceError {
    pub service: &'static str,
    pub reason: String,
}

impl ServiceError {
    /// Creates a service error for the named collaborator.
    pub fn new(service: &'static str, reason: impl Into<String>) -> Self {
        Self {
            service,
            reason: reason.into(),
        }
    }
}

/// Errors raised by the saga state store.
#[derive(Debug, Error)]
pub enum SagaStoreError {
    /// No saga record exists with the given ID.
    #[error("saga {0} not found")]
    NotFound(SagaId),

    /// The store backend could not serve the request.
    #[error("saga store unavailable: {0}")]
    Unavailable(String),
}

/// Internal classification of a step failure.
///
/// `From` impls fold collaborator and store errors into the system class, so
/// step executors can use `?` and the orchestrator boundary receives an
/// already-classified failure.
#[derive(Debug, Error)]
pub enum StepError {
    /// A business rule rejected the checkout.
    #[error(transparent)]
    Business(#[from] BusinessError),

    /// An unexpected fault from a collaborator or store.
    #[error("{0}")]
    System(String),
}

impl From<ServiceError> for StepError {
    fn from(err: ServiceError) -> Self {
        StepError::System(err.to_string())
    }
}

impl From<SagaStoreError> for StepError {
    fn from(err: SagaStoreError) -> Self {
        StepError::System(err.to_string())
    }
}

/// Caller-facing checkout outcome.
///
/// System failures carry no detail: the internal cause lives only in the
/// saga log and must never leak to the caller.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Expected rejection, reported verbatim.
    #[error(transparent)]
    Business(#[from] BusinessError),

    /// Unexpected failure; compensation has been attempted.
    #[error("critical error during checkout, any payment will be refunded")]
    System,
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_error_codes() {
        assert_eq!(BusinessError::CartEmpty.code(), "cart_empty");
        assert_eq!(
            BusinessError::DuplicatePurchase {
                tour_id: TourId::new("t2")
            }
            .code(),
            "duplicate_purchase"
        );
        assert_eq!(
            BusinessError::TourNotFound {
                tour_id: TourId::new("t1")
            }
            .code(),
            "tour_not_found"
        );
        assert_eq!(
            BusinessError::TourUnavailable {
                tour_id: TourId::new("t1"),
                status: "archived".to_string()
            }
            .code(),
            "tour_unavailable"
        );
        assert_eq!(
            BusinessError::PaymentDeclined {
                amount: Money::from_cents(2500)
            }
            .code(),
            "payment_declined"
        );
    }

    #[test]
    fn test_duplicate_purchase_names_the_tour() {
        let err = BusinessError::DuplicatePurchase {
            tour_id: TourId::new("t2"),
        };
        assert!(err.to_string().contains("t2"));
    }

    #[test]
    fn test_service_error_classifies_as_system() {
        let err: StepError = ServiceError::new("payment-gateway", "timeout").into();
        assert!(matches!(err, StepError::System(_)));
    }

    #[test]
    fn test_store_error_classifies_as_system() {
        let err: StepError = SagaStoreError::Unavailable("connection reset".to_string()).into();
        assert!(matches!(err, StepError::System(_)));
    }

    #[test]
    fn test_system_checkout_error_is_generic() {
        let msg = CheckoutError::System.to_string();
        assert_eq!(msg, "critical error during checkout, any payment will be refunded");
    }
}
