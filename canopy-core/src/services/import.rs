//! Import service - load transactions from CSV
//!
//! Gives the CLI a local ingest path in place of an aggregator feed.
//! Columns are matched by header name (configurable), amounts accept
//! currency symbols and thousands separators, and rows whose external
//! transaction id is already present are skipped so re-importing a file is
//! harmless.
//!
//! Importing never runs rules; categorization happens only through the
//! explicit trigger.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::category::{is_valid_category, OTHER};
use crate::domain::{Account, Item, Transaction};
use crate::ports::Repository;

/// Column names to read from the CSV header row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvColumns {
    #[serde(default = "default_date_column")]
    pub date: String,
    #[serde(default = "default_name_column")]
    pub name: String,
    #[serde(default = "default_amount_column")]
    pub amount: String,
    #[serde(default = "default_merchant_column")]
    pub merchant: String,
    #[serde(default = "default_account_column")]
    pub account: String,
    #[serde(default = "default_transaction_id_column")]
    pub transaction_id: String,
    #[serde(default = "default_category_column")]
    pub category: String,
}

fn default_date_column() -> String {
    "date".to_string()
}

fn default_name_column() -> String {
    "name".to_string()
}

fn default_amount_column() -> String {
    "amount".to_string()
}

fn default_merchant_column() -> String {
    "merchant_name".to_string()
}

fn default_account_column() -> String {
    "account_id".to_string()
}

fn default_transaction_id_column() -> String {
    "transaction_id".to_string()
}

fn default_category_column() -> String {
    "category".to_string()
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            date: default_date_column(),
            name: default_name_column(),
            amount: default_amount_column(),
            merchant: default_merchant_column(),
            account: default_account_column(),
            transaction_id: default_transaction_id_column(),
            category: default_category_column(),
        }
    }
}

/// Import options
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Negate all amounts (for sources that report spend as positive)
    pub flip_signs: bool,
    pub columns: CsvColumns,
}

/// Result of an import run
#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub item_id: Uuid,
    pub institution_name: String,
    /// Rows read from the file
    pub discovered: i64,
    /// Rows inserted
    pub imported: i64,
    /// Rows skipped because their transaction id already exists
    pub skipped: i64,
}

/// Import service for loading transactions
pub struct ImportService {
    store: Arc<dyn Repository>,
}

impl ImportService {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    /// Import transactions from a CSV file into an item named after the
    /// institution, creating the item on first use
    pub async fn import_csv(
        &self,
        user_id: Uuid,
        institution_name: &str,
        path: &Path,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        self.import_reader(user_id, institution_name, file, options)
            .await
    }

    /// Import transactions from any CSV reader
    pub async fn import_reader<R: Read>(
        &self,
        user_id: Uuid,
        institution_name: &str,
        reader: R,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let item = self.find_or_create_item(user_id, institution_name).await?;

        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = ResolvedColumns::resolve(&headers, &options.columns)?;

        let mut discovered = 0i64;
        let mut skipped = 0i64;
        let mut new_transactions: Vec<Transaction> = Vec::new();
        let mut seen_accounts: Vec<String> = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            discovered += 1;
            let row = discovered + 1; // header is line 1

            let external_id = columns.get(&record, columns.transaction_id);
            if let Some(id) = &external_id {
                if self.store.transaction_exists_by_external_id(id).await?
                    || new_transactions.iter().any(|t| &t.transaction_id == id)
                {
                    skipped += 1;
                    continue;
                }
            }

            let tx = columns
                .parse_row(&record, row, item.id, options.flip_signs)
                .with_context(|| format!("Row {} could not be imported", row))?;

            if !seen_accounts.contains(&tx.account_id) {
                seen_accounts.push(tx.account_id.clone());
            }
            new_transactions.push(tx);
        }

        // make sure every referenced account exists under the item
        for account_id in &seen_accounts {
            let known = self
                .store
                .get_accounts_by_item(item.id)
                .await?
                .iter()
                .any(|a| &a.id == account_id);
            if !known {
                self.store
                    .upsert_account(&Account::new(account_id.clone(), item.id, account_id.clone()))
                    .await?;
            }
        }

        self.store.bulk_upsert_transactions(&new_transactions).await?;
        debug!(
            institution = institution_name,
            imported = new_transactions.len(),
            skipped,
            "import finished"
        );

        Ok(ImportResult {
            item_id: item.id,
            institution_name: institution_name.to_string(),
            discovered,
            imported: new_transactions.len() as i64,
            skipped,
        })
    }

    async fn find_or_create_item(&self, user_id: Uuid, institution_name: &str) -> Result<Item> {
        if let Some(item) = self
            .store
            .get_item_by_institution(user_id, institution_name)
            .await?
        {
            return Ok(item);
        }
        let item = Item::new(Uuid::new_v4(), user_id, institution_name);
        self.store.upsert_item(&item).await?;
        Ok(item)
    }
}

/// Header names resolved to column indexes
struct ResolvedColumns {
    date: usize,
    name: usize,
    amount: usize,
    merchant: Option<usize>,
    account: Option<usize>,
    transaction_id: Option<usize>,
    category: Option<usize>,
}

impl ResolvedColumns {
    fn resolve(headers: &StringRecord, columns: &CsvColumns) -> Result<Self> {
        let index_of = |name: &str| -> Option<usize> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name.trim()))
        };
        let required = |name: &str| -> Result<usize> {
            index_of(name)
                .ok_or_else(|| anyhow::anyhow!("CSV is missing required column '{}'", name))
        };

        Ok(Self {
            date: required(&columns.date)?,
            name: required(&columns.name)?,
            amount: required(&columns.amount)?,
            merchant: index_of(&columns.merchant),
            account: index_of(&columns.account),
            transaction_id: index_of(&columns.transaction_id),
            category: index_of(&columns.category),
        })
    }

    /// Non-empty cell content at an optional column
    fn get(&self, record: &StringRecord, index: Option<usize>) -> Option<String> {
        index
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        row: i64,
        item_id: Uuid,
        flip_signs: bool,
    ) -> Result<Transaction> {
        let date_text = record
            .get(self.date)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Row {} has no date", row))?;
        let date = parse_date(date_text)
            .ok_or_else(|| anyhow::anyhow!("Row {} has an unrecognized date: {}", row, date_text))?;

        let name = record
            .get(self.name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Row {} has no description", row))?;

        let amount_text = record
            .get(self.amount)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Row {} has no amount", row))?;
        let mut amount = parse_amount(amount_text).ok_or_else(|| {
            anyhow::anyhow!("Row {} has an unparseable amount: {}", row, amount_text)
        })?;
        if flip_signs {
            amount = -amount;
        }

        let id = Uuid::new_v4();
        let account_id = self
            .get(record, self.account)
            .unwrap_or_else(|| "unassigned".to_string());

        let mut tx = Transaction::new(id, item_id, account_id, name, amount, date);
        tx.merchant_name = self.get(record, self.merchant);
        if let Some(external_id) = self.get(record, self.transaction_id) {
            tx.transaction_id = external_id;
        }
        if let Some(category) = self.get(record, self.category) {
            let category = category.to_uppercase();
            if is_valid_category(&category) {
                tx.primary_category = category;
            } else {
                tx.primary_category = OTHER.to_string();
            }
        }
        Ok(tx)
    }
}

/// Parse an ISO or US-style date
fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
        .ok()
}

/// Parse an amount, tolerating currency symbols and thousands separators
fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;

    const CSV: &str = "\
date,name,merchant_name,amount,account_id,transaction_id
2025-03-01,STARBUCKS STORE #123,Starbucks,-4.75,acc_1,tx-001
2025-03-02,PAYROLL ACME CORP,,\"2,500.00\",acc_1,tx-002
03/03/2025,NETFLIX.COM,Netflix,-15.49,acc_2,tx-003
";

    fn service(store: Arc<MemoryStore>) -> ImportService {
        ImportService::new(store)
    }

    #[tokio::test]
    async fn test_import_parses_rows_and_creates_item() {
        let store = Arc::new(MemoryStore::new());
        let user_id = Uuid::new_v4();
        let result = service(store.clone())
            .import_reader(user_id, "Test Bank", CSV.as_bytes(), &ImportOptions::default())
            .await
            .unwrap();

        assert_eq!(result.discovered, 3);
        assert_eq!(result.imported, 3);
        assert_eq!(result.skipped, 0);

        let txs = store.get_transactions_by_item(result.item_id).await.unwrap();
        assert_eq!(txs.len(), 3);
        let payroll = txs.iter().find(|t| t.name.starts_with("PAYROLL")).unwrap();
        assert_eq!(payroll.amount, Decimal::new(250_000, 2));
        assert!(payroll.merchant_name.is_none());
        let netflix = txs.iter().find(|t| t.transaction_id == "tx-003").unwrap();
        assert_eq!(netflix.date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
    }

    #[tokio::test]
    async fn test_reimport_skips_existing_external_ids() {
        let store = Arc::new(MemoryStore::new());
        let user_id = Uuid::new_v4();
        let service = service(store);
        service
            .import_reader(user_id, "Test Bank", CSV.as_bytes(), &ImportOptions::default())
            .await
            .unwrap();
        let second = service
            .import_reader(user_id, "Test Bank", CSV.as_bytes(), &ImportOptions::default())
            .await
            .unwrap();

        assert_eq!(second.discovered, 3);
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 3);
    }

    #[tokio::test]
    async fn test_flip_signs() {
        let store = Arc::new(MemoryStore::new());
        let csv = "date,name,amount\n2025-03-01,COFFEE,4.75\n";
        let options = ImportOptions {
            flip_signs: true,
            ..Default::default()
        };
        let result = service(store.clone())
            .import_reader(Uuid::new_v4(), "Card", csv.as_bytes(), &options)
            .await
            .unwrap();
        let txs = store.get_transactions_by_item(result.item_id).await.unwrap();
        assert_eq!(txs[0].amount, Decimal::new(-475, 2));
    }

    #[tokio::test]
    async fn test_missing_required_column_errors() {
        let store = Arc::new(MemoryStore::new());
        let csv = "date,description\n2025-03-01,COFFEE\n";
        let err = service(store)
            .import_reader(
                Uuid::new_v4(),
                "Card",
                csv.as_bytes(),
                &ImportOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing required column"));
    }
}
