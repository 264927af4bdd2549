//! Trigger service - batch rule application
//!
//! Runs a user's rules over their transactions and reassigns categories on
//! match. The first rule in creation order that matches a transaction wins;
//! later rules are not consulted for that transaction. Items are
//! independent units of work and run concurrently; a failure in one item is
//! recorded and never aborts the others.
//!
//! Matching depends only on immutable transaction attributes, so re-running
//! the trigger is idempotent: the second run finds every matched
//! transaction already carrying its target category and writes nothing.

use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::TransactionRule;
use crate::ports::Repository;

/// Trigger service for applying rules to transactions
pub struct TriggerService {
    store: Arc<dyn Repository>,
}

/// Self-service trigger response
#[derive(Debug, Serialize)]
pub struct TriggerRunResult {
    /// Transactions whose category changed in this run
    pub num_adjusted: i64,
}

/// Outcome of one item's batch, in the multi-item response
#[derive(Debug, Clone, Serialize)]
pub struct ItemRunResult {
    pub item_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub num_adjusted: i64,
}

/// Administrative multi-item trigger response: one entry per item,
/// failures collected rather than raised
#[derive(Debug, Serialize)]
pub struct ResyncResult {
    pub results: Vec<ItemRunResult>,
}

impl TriggerService {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    /// Run the user's rules over all their transactions
    ///
    /// This response shape has no per-item failure channel, so any failed
    /// item turns the whole run into an error naming the failures.
    /// Successfully processed items keep their category changes; re-running
    /// after the underlying problem is fixed is safe.
    pub async fn run(&self, user_id: Uuid) -> Result<TriggerRunResult> {
        let results = self.apply_all(user_id).await?;

        let failed: Vec<String> = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| {
                format!(
                    "{}: {}",
                    r.item_id,
                    r.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect();
        if !failed.is_empty() {
            anyhow::bail!(
                "Rule run failed for {} of {} item(s): {}",
                failed.len(),
                results.len(),
                failed.join("; ")
            );
        }

        Ok(TriggerRunResult {
            num_adjusted: results.iter().map(|r| r.num_adjusted).sum(),
        })
    }

    /// Run a user's rules item by item, reporting per-item outcomes
    ///
    /// Used by the administrative re-sync path; shares the application
    /// algorithm with [`run`](Self::run).
    pub async fn resync(&self, user_id: Uuid) -> Result<ResyncResult> {
        Ok(ResyncResult {
            results: self.apply_all(user_id).await?,
        })
    }

    /// Shared core: evaluate rules per item, concurrently across items
    async fn apply_all(&self, user_id: Uuid) -> Result<Vec<ItemRunResult>> {
        let mut rules = self.store.list_rules(user_id).await?;
        // creation order decides first-match ties, whatever order the store
        // returned
        rules.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let items = self.store.get_items(user_id).await?;
        if rules.is_empty() {
            debug!(%user_id, "no rules to apply");
            return Ok(items
                .iter()
                .map(|item| ItemRunResult {
                    item_id: item.id,
                    success: true,
                    error: None,
                    num_adjusted: 0,
                })
                .collect());
        }

        let rules = &rules;
        let runs = items.iter().map(|item| {
            let item_id = item.id;
            async move {
                match self.apply_to_item(rules, item_id).await {
                    Ok(num_adjusted) => ItemRunResult {
                        item_id,
                        success: true,
                        error: None,
                        num_adjusted,
                    },
                    Err(e) => {
                        warn!(%item_id, error = %e, "rule application failed for item");
                        ItemRunResult {
                            item_id,
                            success: false,
                            error: Some(e.to_string()),
                            num_adjusted: 0,
                        }
                    }
                }
            }
        });

        Ok(join_all(runs).await)
    }

    /// Apply rules to one item's transactions, in rule order per
    /// transaction, first match wins
    async fn apply_to_item(&self, rules: &[TransactionRule], item_id: Uuid) -> Result<i64> {
        let transactions = self.store.get_transactions_by_item(item_id).await?;
        let mut num_adjusted = 0i64;

        for tx in &transactions {
            let winner = rules.iter().find(|rule| rule.conditions.matches(tx));
            if let Some(rule) = winner {
                if tx.primary_category != rule.personal_finance_category {
                    self.store
                        .update_transaction_category(tx.id, &rule.personal_finance_category)
                        .await?;
                    num_adjusted += 1;
                }
            }
        }

        debug!(%item_id, num_adjusted, "item processed");
        Ok(num_adjusted)
    }
}
