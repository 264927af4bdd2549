//! Item domain model
//!
//! An item is one linked institution connection. Accounts and their
//! transactions hang off an item; the trigger processes one item's
//! transactions as an independent unit of work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A linked institution connection owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub user_id: Uuid,
    pub institution_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn new(id: Uuid, user_id: Uuid, institution_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            institution_name: institution_name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
