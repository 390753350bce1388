//! Purchase tokens and purchase records.
//!
//! A token is the capability proving a user's right to access a purchased
//! tour; a purchase record is the matching audit/ownership entry. The two are
//! always created together for one cart item and deleted together during
//! compensation — they share a lifecycle.

use chrono::{DateTime, Utc};
use common::{TourId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capability record proving ownership of a purchased tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseToken {
    pub token: String,
    pub user_id: UserId,
    pub tour_id: TourId,
    pub created_at: DateTime<Utc>,
}

impl PurchaseToken {
    /// Issues a fresh token for a user and tour.
    pub fn issue(user_id: UserId, tour_id: TourId) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            user_id,
            tour_id,
            created_at: Utc::now(),
        }
    }
}

/// Audit/ownership entry for one purchased tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub user_id: UserId,
    pub tour_id: TourId,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl PurchaseRecord {
    /// Creates the purchase record paired with an issued token.
    pub fn for_token(token: &PurchaseToken) -> Self {
        Self {
            user_id: token.user_id.clone(),
            tour_id: token.tour_id.clone(),
            token: token.token.clone(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_creates_unique_tokens() {
        let a = PurchaseToken::issue(UserId::new("u1"), TourId::new("t1"));
        let b = PurchaseToken::issue(UserId::new("u1"), TourId::new("t1"));
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_record_pairs_with_token() {
        let token = PurchaseToken::issue(UserId::new("u1"), TourId::new("t1"));
        let record = PurchaseRecord::for_token(&token);
        assert_eq!(record.token, token.token);
        assert_eq!(record.user_id, token.user_id);
        assert_eq!(record.tour_id, token.tour_id);
    }

    #[test]
    fn test_token_serialization_roundtrip() {
        let token = PurchaseToken::issue(UserId::new("u1"), TourId::new("t1"));
        let json = serde_json::to_string(&token).unwrap();
        let back: PurchaseToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
