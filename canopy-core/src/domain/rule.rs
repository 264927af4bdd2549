//! Transaction rule domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::condition::StoredConditions;

/// A persisted categorization rule
///
/// `conditions` is always the normalized storage representation; the rule
/// service converts to and from the author-facing draft form at its
/// boundary. Rule names are unique per user. Creation order decides which
/// rule wins when several match the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Category assigned to matching transactions
    pub personal_finance_category: String,
    pub conditions: StoredConditions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionRule {
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        name: impl Into<String>,
        personal_finance_category: impl Into<String>,
        conditions: StoredConditions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            name: name.into(),
            personal_finance_category: personal_finance_category.into(),
            conditions,
            created_at: now,
            updated_at: now,
        }
    }
}
