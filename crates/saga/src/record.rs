//! The persisted saga record: one document per checkout attempt.

use chrono::{DateTime, Utc};
use common::{SagaId, TourId, UserId};
use domain::Money;
use serde::{Deserialize, Serialize};

use crate::checkout;
use crate::state::{SagaStatus, StepStatus};

/// One entry in the append-only step log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// The step this entry belongs to.
    pub step: String,
    pub status: StepStatus,
    pub timestamp: DateTime<Utc>,
    /// Failure reason, present only on FAILED entries.
    pub error: Option<String>,
    /// Structured step output (item counts, amounts).
    pub metadata: Option<serde_json::Value>,
}

impl StepRecord {
    /// Creates a STARTED entry for a step.
    pub fn started(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Started,
            timestamp: Utc::now(),
            error: None,
            metadata: None,
        }
    }

    /// Creates a COMPLETED entry for a step.
    pub fn completed(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Completed,
            timestamp: Utc::now(),
            error: None,
            metadata: None,
        }
    }

    /// Creates a FAILED entry carrying the failure reason.
    pub fn failed(step: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Failed,
            timestamp: Utc::now(),
            error: Some(error.into()),
            metadata: None,
        }
    }

    /// Attaches structured metadata to the entry.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A token/purchase pair created during the saga, kept for compensation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePair {
    pub tour_id: TourId,
    pub token: String,
}

/// Durable record of one checkout saga.
///
/// Created with status `STARTED` before any step runs, mutated only through
/// the saga store, and retained forever once it reaches a terminal status.
/// The step log is append-only; entries are never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaState {
    pub saga_id: SagaId,
    pub user_id: UserId,
    pub status: SagaStatus,
    /// Name of the step currently executing or last attempted.
    pub current_step: String,
    pub steps_completed: Vec<StepRecord>,
    /// Tokens created by this saga, in creation order.
    pub created_tokens: Vec<String>,
    /// Token/purchase pairs created by this saga, in creation order.
    /// Always the same length as `created_tokens`.
    pub created_purchases: Vec<PurchasePair>,
    pub payment_amount: Money,
    /// True once the gateway accepted the charge; gates the refund during
    /// compensation.
    pub payment_processed: bool,
    /// Last recorded failure reason, if any.
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub compensated_at: Option<DateTime<Utc>>,
}

impl SagaState {
    /// Creates a fresh saga record for a user's checkout attempt.
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            saga_id: SagaId::new(),
            user_id,
            status: SagaStatus::Started,
            current_step: checkout::STEP_INIT.to_string(),
            steps_completed: Vec::new(),
            created_tokens: Vec::new(),
            created_purchases: Vec::new(),
            payment_amount: Money::zero(),
            payment_processed: false,
            error: None,
            started_at: now,
            updated_at: now,
            completed_at: None,
            compensated_at: None,
        }
    }

    /// Appends a step log entry and advances `current_step`.
    pub fn append_step(&mut self, record: StepRecord) {
        self.current_step = record.step.clone();
        self.updated_at = Utc::now();
        self.steps_completed.push(record);
    }

    /// Records a created token/purchase pair.
    pub fn record_purchase(&mut self, tour_id: TourId, token: String) {
        self.created_tokens.push(token.clone());
        self.created_purchases.push(PurchasePair { tour_id, token });
        self.updated_at = Utc::now();
    }

    /// Transitions the saga status, stamping terminal timestamps.
    pub fn set_status(&mut self, status: SagaStatus, error: Option<String>) {
        let now = Utc::now();
        self.status = status;
        self.updated_at = now;
        if let Some(reason) = error {
            self.error = Some(reason);
        }
        match status {
            SagaStatus::Completed | SagaStatus::Failed => self.completed_at = Some(now),
            SagaStatus::Compensated | SagaStatus::CompensationFailed => {
                self.compensated_at = Some(now);
            }
            _ => {}
        }
    }

    /// Names of steps that reached COMPLETED, in log order.
    pub fn completed_step_names(&self) -> Vec<&str> {
        self.steps_completed
            .iter()
            .filter(|r| r.status == StepStatus::Completed)
            .map(|r| r.step.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{STEP_FETCH_CART, STEP_INIT, STEP_PROCESS_PAYMENT};

    #[test]
    fn test_new_saga_starts_at_init() {
        let saga = SagaState::new(UserId::new("u1"));
        assert_eq!(saga.status, SagaStatus::Started);
        assert_eq!(saga.current_step, STEP_INIT);
        assert!(saga.steps_completed.is_empty());
        assert!(!saga.payment_processed);
        assert!(saga.completed_at.is_none());
    }

    #[test]
    fn test_append_step_advances_current_step() {
        let mut saga = SagaState::new(UserId::new("u1"));
        saga.append_step(StepRecord::started(STEP_FETCH_CART));
        assert_eq!(saga.current_step, STEP_FETCH_CART);
        assert_eq!(saga.steps_completed.len(), 1);

        saga.append_step(StepRecord::completed(STEP_FETCH_CART));
        assert_eq!(saga.steps_completed.len(), 2);
    }

    #[test]
    fn test_step_log_is_append_only() {
        let mut saga = SagaState::new(UserId::new("u1"));
        saga.append_step(StepRecord::started(STEP_FETCH_CART));
        let first = saga.steps_completed[0].clone();

        saga.append_step(StepRecord::failed(STEP_PROCESS_PAYMENT, "declined"));
        assert_eq!(saga.steps_completed[0], first);
        assert_eq!(saga.steps_completed.len(), 2);
    }

    #[test]
    fn test_record_purchase_keeps_lists_paired() {
        let mut saga = SagaState::new(UserId::new("u1"));
        saga.record_purchase(TourId::new("t1"), "tok-1".to_string());
        saga.record_purchase(TourId::new("t2"), "tok-2".to_string());

        assert_eq!(saga.created_tokens.len(), saga.created_purchases.len());
        assert_eq!(saga.created_tokens, vec!["tok-1", "tok-2"]);
        assert_eq!(saga.created_purchases[1].tour_id, TourId::new("t2"));
    }

    #[test]
    fn test_set_status_stamps_terminal_timestamps() {
        let mut saga = SagaState::new(UserId::new("u1"));
        saga.set_status(SagaStatus::Completed, None);
        assert!(saga.completed_at.is_some());
        assert!(saga.compensated_at.is_none());

        let mut saga = SagaState::new(UserId::new("u1"));
        saga.set_status(SagaStatus::Compensated, Some("storage down".to_string()));
        assert!(saga.compensated_at.is_some());
        assert_eq!(saga.error.as_deref(), Some("storage down"));
    }

    #[test]
    fn test_set_status_keeps_existing_error_when_none_given() {
        let mut saga = SagaState::new(UserId::new("u1"));
        saga.set_status(SagaStatus::Compensating, Some("storage down".to_string()));
        saga.set_status(SagaStatus::Compensated, None);
        assert_eq!(saga.error.as_deref(), Some("storage down"));
    }

    #[test]
    fn test_completed_step_names_filters_log() {
        let mut saga = SagaState::new(UserId::new("u1"));
        saga.append_step(StepRecord::started(STEP_FETCH_CART));
        saga.append_step(StepRecord::completed(STEP_FETCH_CART));
        saga.append_step(StepRecord::started(STEP_PROCESS_PAYMENT));
        saga.append_step(StepRecord::failed(STEP_PROCESS_PAYMENT, "declined"));

        assert_eq!(saga.completed_step_names(), vec![STEP_FETCH_CART]);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut saga = SagaState::new(UserId::new("u1"));
        saga.append_step(
            StepRecord::completed(STEP_FETCH_CART)
                .with_metadata(serde_json::json!({"items": 2})),
        );
        saga.record_purchase(TourId::new("t1"), "tok-1".to_string());

        let json = serde_json::to_string(&saga).unwrap();
        let back: SagaState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.saga_id, saga.saga_id);
        assert_eq!(back.steps_completed, saga.steps_completed);
        assert_eq!(back.created_tokens, saga.created_tokens);
    }
}
