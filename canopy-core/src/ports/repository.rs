//! Repository port - storage abstraction
//!
//! The engine never talks to a database directly; it reads rules and
//! transactions and writes category updates through this trait. Adapters
//! provide the actual storage (in-memory, JSON file, or whatever the host
//! service owns).

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{Account, Item, Transaction, TransactionRule, User};

/// Storage abstraction for users, items, transactions and rules
#[async_trait]
pub trait Repository: Send + Sync {
    // === Users ===

    /// Insert or update a user
    async fn upsert_user(&self, user: &User) -> Result<()>;

    /// Get a user by id
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    // === Items ===

    /// Insert or update a linked item
    async fn upsert_item(&self, item: &Item) -> Result<()>;

    /// Get all items for a user, oldest first
    async fn get_items(&self, user_id: Uuid) -> Result<Vec<Item>>;

    /// Find an item by institution name
    async fn get_item_by_institution(
        &self,
        user_id: Uuid,
        institution_name: &str,
    ) -> Result<Option<Item>>;

    // === Accounts ===

    /// Insert or update an account
    async fn upsert_account(&self, account: &Account) -> Result<()>;

    /// Get all accounts under an item
    async fn get_accounts_by_item(&self, item_id: Uuid) -> Result<Vec<Account>>;

    // === Transactions ===

    /// Upsert multiple transactions
    async fn bulk_upsert_transactions(&self, txs: &[Transaction]) -> Result<()>;

    /// Get all transactions under an item
    async fn get_transactions_by_item(&self, item_id: Uuid) -> Result<Vec<Transaction>>;

    /// Whether a transaction with this aggregator-assigned id exists
    async fn transaction_exists_by_external_id(&self, external_id: &str) -> Result<bool>;

    /// Set a transaction's primary category
    async fn update_transaction_category(&self, id: Uuid, primary_category: &str) -> Result<()>;

    /// Count all transactions belonging to a user
    async fn get_transaction_count(&self, user_id: Uuid) -> Result<i64>;

    /// Earliest and latest transaction dates for a user
    async fn get_transaction_date_range(
        &self,
        user_id: Uuid,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>)>;

    // === Rules ===

    /// Add a new rule
    async fn add_rule(&self, rule: &TransactionRule) -> Result<()>;

    /// Update an existing rule
    async fn update_rule(&self, rule: &TransactionRule) -> Result<()>;

    /// Delete a rule; returns false if it did not exist
    async fn delete_rule(&self, id: Uuid) -> Result<bool>;

    /// Get a rule by id
    async fn get_rule(&self, id: Uuid) -> Result<Option<TransactionRule>>;

    /// Find a rule by its per-user unique name
    async fn get_rule_by_name(&self, user_id: Uuid, name: &str)
        -> Result<Option<TransactionRule>>;

    /// Get all rules for a user in creation order, oldest first
    async fn list_rules(&self, user_id: Uuid) -> Result<Vec<TransactionRule>>;
}
