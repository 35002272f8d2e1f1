//! Address registry domain entity.
//!
//! One entry per externally assigned site identifier. Entries are never
//! deleted: an entry referenced by a new order while inactive is
//! reactivated, never the other way around from this path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Active/inactive status of an address entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AddressStatus {
    Active,
    Inactive,
}

impl AddressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressStatus::Active => "active",
            AddressStatus::Inactive => "inactive",
        }
    }

    pub fn is_inactive(&self) -> bool {
        matches!(self, AddressStatus::Inactive)
    }
}

impl From<&str> for AddressStatus {
    fn from(s: &str) -> Self {
        // Unknown values default to active, matching how legacy rows
        // with an empty status column were treated.
        match s.trim() {
            "inactive" => AddressStatus::Inactive,
            _ => AddressStatus::Active,
        }
    }
}

impl std::fmt::Display for AddressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Address registry entry, keyed by site identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddressEntry {
    /// Externally assigned site identifier
    #[schema(example = "P1042")]
    pub site_id: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub complement: Option<String>,
    pub status: AddressStatus,
    /// Username of the last inspector
    pub last_inspector: String,
    pub last_inspection_at: DateTime<Utc>,
}

/// Address fields as entered on the order form; used both to create new
/// registry entries and to overwrite existing ones.
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub complement: Option<String>,
}
