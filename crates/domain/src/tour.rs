//! Tour catalog availability status.

use serde::{Deserialize, Serialize};

/// Publication status of a tour in the catalog.
///
/// Only `Published` and `Active` tours can be purchased. `Archived` and any
/// status the checkout does not recognize are treated as unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TourStatus {
    Published,
    Active,
    Archived,
    Other(String),
}

impl TourStatus {
    /// Returns true if a tour with this status can be purchased.
    pub fn is_purchasable(&self) -> bool {
        matches!(self, TourStatus::Published | TourStatus::Active)
    }

    /// Returns the status name as used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            TourStatus::Published => "published",
            TourStatus::Active => "active",
            TourStatus::Archived => "archived",
            TourStatus::Other(s) => s,
        }
    }
}

impl From<String> for TourStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "published" => TourStatus::Published,
            "active" => TourStatus::Active,
            "archived" => TourStatus::Archived,
            _ => TourStatus::Other(s),
        }
    }
}

impl From<TourStatus> for String {
    fn from(status: TourStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TourStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
