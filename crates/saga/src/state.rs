//! Saga lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The status of a checkout saga in its lifecycle.
///
/// Transitions:
/// ```text
/// Started ──┬──► Completed
///           ├──► Failed                       (business rejection)
///           └──► Compensating ──┬──► Compensated
///                               └──► CompensationFailed
/// ```
///
/// Terminal states are never left; a saga record is retained for audit and
/// never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SagaStatus {
    /// Saga record persisted, steps executing.
    #[default]
    Started,

    /// A business rule rejected the checkout (terminal, no compensation).
    Failed,

    /// All steps completed successfully (terminal).
    Completed,

    /// A system failure occurred and compensating actions are running.
    Compensating,

    /// Compensation finished cleaning up all side effects (terminal).
    Compensated,

    /// The refund failed during compensation; manual intervention required
    /// (terminal, never retried automatically).
    CompensationFailed,
}

impl SagaStatus {
    /// Returns true if the saga can begin compensation.
    pub fn can_compensate(&self) -> bool {
        matches!(self, SagaStatus::Started | SagaStatus::Compensating)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SagaStatus::Completed
                | SagaStatus::Failed
                | SagaStatus::Compensated
                | SagaStatus::CompensationFailed
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaStatus::Started => "STARTED",
            SagaStatus::Failed => "FAILED",
            SagaStatus::Completed => "COMPLETED",
            SagaStatus::Compensating => "COMPENSATING",
            SagaStatus::Compensated => "COMPENSATED",
            SagaStatus::CompensationFailed => "COMPENSATION_FAILED",
        }
    }
}

impl std::fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of one entry in the saga step log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Started,
    Completed,
    Failed,
}

impl StepStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Started => "STARTED",
            StepStatus::Completed => "COMPLETED",
            StepStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_started() {
        assert_eq!(SagaStatus::default(), SagaStatus::Started);
    }

    #[test]
    fn test_can_compensate() {
        assert!(SagaStatus::Started.can_compensate());
        assert!(SagaStatus::Compensating.can_compensate());
        assert!(!SagaStatus::Failed.can_compensate());
        assert!(!SagaStatus::Completed.can_compensate());
        assert!(!SagaStatus::Compensated.can_compensate());
        assert!(!SagaStatus::CompensationFailed.can_compensate());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SagaStatus::Started.is_terminal());
        assert!(!SagaStatus::Compensating.is_terminal());
        assert!(SagaStatus::Failed.is_terminal());
        assert!(SagaStatus::Completed.is_terminal());
        assert!(SagaStatus::Compensated.is_terminal());
        assert!(SagaStatus::CompensationFailed.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(SagaStatus::Started.to_string(), "STARTED");
        assert_eq!(
            SagaStatus::CompensationFailed.to_string(),
            "COMPENSATION_FAILED"
        );
        assert_eq!(StepStatus::Completed.to_string(), "COMPLETED");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&SagaStatus::Compensating).unwrap();
        assert_eq!(json, "\"COMPENSATING\"");
        let back: SagaStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SagaStatus::Compensating);
    }
}
