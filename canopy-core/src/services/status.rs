//! Status service - data set summaries

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use crate::ports::Repository;

/// Status service for summarizing a user's data set
pub struct StatusService {
    store: Arc<dyn Repository>,
}

impl StatusService {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    /// Get an overall summary for a user
    pub async fn get_status(&self, user_id: Uuid) -> Result<StatusSummary> {
        let items = self.store.get_items(user_id).await?;
        let rules = self.store.list_rules(user_id).await?;
        let transaction_count = self.store.get_transaction_count(user_id).await?;
        let (earliest, latest) = self.store.get_transaction_date_range(user_id).await?;

        let mut item_summaries = Vec::new();
        let mut total_accounts = 0i64;
        for item in &items {
            let accounts = self.store.get_accounts_by_item(item.id).await?;
            let transactions = self.store.get_transactions_by_item(item.id).await?;
            total_accounts += accounts.len() as i64;
            item_summaries.push(ItemSummary {
                id: item.id.to_string(),
                institution_name: item.institution_name.clone(),
                accounts: accounts.len() as i64,
                transactions: transactions.len() as i64,
            });
        }

        Ok(StatusSummary {
            total_items: items.len() as i64,
            total_accounts,
            total_transactions: transaction_count,
            total_rules: rules.len() as i64,
            items: item_summaries,
            date_range: DateRange {
                earliest: earliest.map(|d| d.format("%Y-%m-%d").to_string()),
                latest: latest.map(|d| d.format("%Y-%m-%d").to_string()),
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_items: i64,
    pub total_accounts: i64,
    pub total_transactions: i64,
    pub total_rules: i64,
    pub items: Vec<ItemSummary>,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize)]
pub struct ItemSummary {
    pub id: String,
    pub institution_name: String,
    pub accounts: i64,
    pub transactions: i64,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}
