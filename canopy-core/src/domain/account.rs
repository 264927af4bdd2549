//! Account domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A financial account under a linked item
///
/// Account ids are aggregator-assigned strings, not UUIDs; transactions
/// reference accounts by this external id and rule `account` conditions
/// match against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub item_id: Uuid,
    pub name: String,
    /// Account type using aggregator nomenclature ("depository", "credit", ...)
    pub account_type: Option<String>,
    /// Last four digits of the account number, when known
    pub mask: Option<String>,
}

impl Account {
    pub fn new(id: impl Into<String>, item_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_id,
            name: name.into(),
            account_type: None,
            mask: None,
        }
    }
}
