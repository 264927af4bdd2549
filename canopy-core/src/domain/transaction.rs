//! Transaction domain model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single bank transaction under a linked item
///
/// Amounts are signed: money leaving the account is negative, money coming
/// in is positive. Rule conditions on `amount` are stored in this
/// convention (see the condition normalizer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub item_id: Uuid,
    /// Aggregator-assigned account id this transaction belongs to
    pub account_id: String,
    /// Aggregator-assigned transaction id (dedup key for re-imports)
    pub transaction_id: String,
    /// Raw descriptor from the institution
    pub name: String,
    /// Cleaned merchant name, when the aggregator resolved one
    pub merchant_name: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub primary_category: String,
    pub detailed_category: Option<String>,
    pub pending: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction with required fields
    ///
    /// `transaction_id` defaults to the internal id; imports overwrite it
    /// with the source's id when one is present.
    pub fn new(
        id: Uuid,
        item_id: Uuid,
        account_id: impl Into<String>,
        name: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            item_id,
            account_id: account_id.into(),
            transaction_id: id.to_string(),
            name: name.into(),
            merchant_name: None,
            amount,
            date,
            primary_category: crate::domain::category::OTHER.to_string(),
            detailed_category: None,
            pending: false,
            created_at: now,
            updated_at: now,
        }
    }
}
