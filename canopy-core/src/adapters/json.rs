//! JSON file repository adapter
//!
//! Single-file persistence for the CLI: the full store state lives in one
//! JSON document, loaded on open and rewritten after every mutation.
//! Writes go to a temp file first and are renamed into place, so a crash
//! mid-write never leaves a torn state file.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::adapters::memory::{MemoryStore, StoreState};
use crate::domain::result::Result;
use crate::domain::{Account, Item, Transaction, TransactionRule, User};
use crate::ports::Repository;

const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed repository persisting to a single JSON file
pub struct JsonStore {
    memory: MemoryStore,
    path: PathBuf,
}

impl JsonStore {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let state: StoreState = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            StoreState::default()
        };
        Ok(Self {
            memory: MemoryStore::from_state(state),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.memory.snapshot())?;
        let tmp = self.path.with_extension(TMP_SUFFIX);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl Repository for JsonStore {
    // === Users ===

    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.memory.upsert_user(user).await?;
        self.persist()
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.memory.get_user(id).await
    }

    // === Items ===

    async fn upsert_item(&self, item: &Item) -> Result<()> {
        self.memory.upsert_item(item).await?;
        self.persist()
    }

    async fn get_items(&self, user_id: Uuid) -> Result<Vec<Item>> {
        self.memory.get_items(user_id).await
    }

    async fn get_item_by_institution(
        &self,
        user_id: Uuid,
        institution_name: &str,
    ) -> Result<Option<Item>> {
        self.memory
            .get_item_by_institution(user_id, institution_name)
            .await
    }

    // === Accounts ===

    async fn upsert_account(&self, account: &Account) -> Result<()> {
        self.memory.upsert_account(account).await?;
        self.persist()
    }

    async fn get_accounts_by_item(&self, item_id: Uuid) -> Result<Vec<Account>> {
        self.memory.get_accounts_by_item(item_id).await
    }

    // === Transactions ===

    async fn bulk_upsert_transactions(&self, txs: &[Transaction]) -> Result<()> {
        self.memory.bulk_upsert_transactions(txs).await?;
        self.persist()
    }

    async fn get_transactions_by_item(&self, item_id: Uuid) -> Result<Vec<Transaction>> {
        self.memory.get_transactions_by_item(item_id).await
    }

    async fn transaction_exists_by_external_id(&self, external_id: &str) -> Result<bool> {
        self.memory
            .transaction_exists_by_external_id(external_id)
            .await
    }

    async fn update_transaction_category(&self, id: Uuid, primary_category: &str) -> Result<()> {
        self.memory
            .update_transaction_category(id, primary_category)
            .await?;
        self.persist()
    }

    async fn get_transaction_count(&self, user_id: Uuid) -> Result<i64> {
        self.memory.get_transaction_count(user_id).await
    }

    async fn get_transaction_date_range(
        &self,
        user_id: Uuid,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        self.memory.get_transaction_date_range(user_id).await
    }

    // === Rules ===

    async fn add_rule(&self, rule: &TransactionRule) -> Result<()> {
        self.memory.add_rule(rule).await?;
        self.persist()
    }

    async fn update_rule(&self, rule: &TransactionRule) -> Result<()> {
        self.memory.update_rule(rule).await?;
        self.persist()
    }

    async fn delete_rule(&self, id: Uuid) -> Result<bool> {
        let deleted = self.memory.delete_rule(id).await?;
        if deleted {
            self.persist()?;
        }
        Ok(deleted)
    }

    async fn get_rule(&self, id: Uuid) -> Result<Option<TransactionRule>> {
        self.memory.get_rule(id).await
    }

    async fn get_rule_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<TransactionRule>> {
        self.memory.get_rule_by_name(user_id, name).await
    }

    async fn list_rules(&self, user_id: Uuid) -> Result<Vec<TransactionRule>> {
        self.memory.list_rules(user_id).await
    }
}
