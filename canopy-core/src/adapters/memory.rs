//! In-memory repository adapter
//!
//! Backs tests and the demo seeding path, and provides the state model the
//! JSON file adapter persists. Insertion order is preserved per collection;
//! listing methods sort by creation time so callers get the contract order
//! regardless of how records were loaded.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, Item, Transaction, TransactionRule, User};
use crate::ports::Repository;

/// Everything the store holds, in one serializable block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub rules: Vec<TransactionRule>,
}

/// In-memory repository
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub(crate) fn snapshot(&self) -> StoreState {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().expect("store lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().expect("store lock poisoned")
    }

    /// Item ids belonging to a user
    fn user_item_ids(state: &StoreState, user_id: Uuid) -> Vec<Uuid> {
        state
            .items
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| i.id)
            .collect()
    }
}

#[async_trait]
impl Repository for MemoryStore {
    // === Users ===

    async fn upsert_user(&self, user: &User) -> Result<()> {
        let mut state = self.write();
        match state.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => state.users.push(user.clone()),
        }
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    // === Items ===

    async fn upsert_item(&self, item: &Item) -> Result<()> {
        let mut state = self.write();
        match state.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => state.items.push(item.clone()),
        }
        Ok(())
    }

    async fn get_items(&self, user_id: Uuid) -> Result<Vec<Item>> {
        let mut items: Vec<Item> = self
            .read()
            .items
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn get_item_by_institution(
        &self,
        user_id: Uuid,
        institution_name: &str,
    ) -> Result<Option<Item>> {
        Ok(self
            .read()
            .items
            .iter()
            .find(|i| i.user_id == user_id && i.institution_name == institution_name)
            .cloned())
    }

    // === Accounts ===

    async fn upsert_account(&self, account: &Account) -> Result<()> {
        let mut state = self.write();
        match state.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account.clone(),
            None => state.accounts.push(account.clone()),
        }
        Ok(())
    }

    async fn get_accounts_by_item(&self, item_id: Uuid) -> Result<Vec<Account>> {
        Ok(self
            .read()
            .accounts
            .iter()
            .filter(|a| a.item_id == item_id)
            .cloned()
            .collect())
    }

    // === Transactions ===

    async fn bulk_upsert_transactions(&self, txs: &[Transaction]) -> Result<()> {
        let mut state = self.write();
        for tx in txs {
            match state.transactions.iter_mut().find(|t| t.id == tx.id) {
                Some(existing) => *existing = tx.clone(),
                None => state.transactions.push(tx.clone()),
            }
        }
        Ok(())
    }

    async fn get_transactions_by_item(&self, item_id: Uuid) -> Result<Vec<Transaction>> {
        Ok(self
            .read()
            .transactions
            .iter()
            .filter(|t| t.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn transaction_exists_by_external_id(&self, external_id: &str) -> Result<bool> {
        Ok(self
            .read()
            .transactions
            .iter()
            .any(|t| t.transaction_id == external_id))
    }

    async fn update_transaction_category(&self, id: Uuid, primary_category: &str) -> Result<()> {
        let mut state = self.write();
        let tx = state
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found(format!("transaction {}", id)))?;
        tx.primary_category = primary_category.to_string();
        tx.updated_at = Utc::now();
        Ok(())
    }

    async fn get_transaction_count(&self, user_id: Uuid) -> Result<i64> {
        let state = self.read();
        let item_ids = Self::user_item_ids(&state, user_id);
        Ok(state
            .transactions
            .iter()
            .filter(|t| item_ids.contains(&t.item_id))
            .count() as i64)
    }

    async fn get_transaction_date_range(
        &self,
        user_id: Uuid,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        let state = self.read();
        let item_ids = Self::user_item_ids(&state, user_id);
        let dates = state
            .transactions
            .iter()
            .filter(|t| item_ids.contains(&t.item_id))
            .map(|t| t.date);
        Ok((dates.clone().min(), dates.max()))
    }

    // === Rules ===

    async fn add_rule(&self, rule: &TransactionRule) -> Result<()> {
        let mut state = self.write();
        if state.rules.iter().any(|r| r.id == rule.id) {
            return Err(Error::storage(format!("rule {} already exists", rule.id)));
        }
        state.rules.push(rule.clone());
        Ok(())
    }

    async fn update_rule(&self, rule: &TransactionRule) -> Result<()> {
        let mut state = self.write();
        let existing = state
            .rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| Error::not_found(format!("rule {}", rule.id)))?;
        *existing = rule.clone();
        Ok(())
    }

    async fn delete_rule(&self, id: Uuid) -> Result<bool> {
        let mut state = self.write();
        let before = state.rules.len();
        state.rules.retain(|r| r.id != id);
        Ok(state.rules.len() != before)
    }

    async fn get_rule(&self, id: Uuid) -> Result<Option<TransactionRule>> {
        Ok(self.read().rules.iter().find(|r| r.id == id).cloned())
    }

    async fn get_rule_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<TransactionRule>> {
        Ok(self
            .read()
            .rules
            .iter()
            .find(|r| r.user_id == user_id && r.name == name)
            .cloned())
    }

    async fn list_rules(&self, user_id: Uuid) -> Result<Vec<TransactionRule>> {
        let mut rules: Vec<TransactionRule> = self
            .read()
            .rules
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rules.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rules)
    }
}
