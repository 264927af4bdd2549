//! Integration tests for canopy-core services
//!
//! These tests verify the authoring → trigger flow against the real
//! adapters: rule CRUD through the service layer, batch application with
//! first-match-wins and per-item failure isolation, and JSON persistence.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

use canopy_core::adapters::{demo, MemoryStore};
use canopy_core::domain::result::{Error, Result as CoreResult};
use canopy_core::ports::Repository;
use canopy_core::services::{ImportOptions, ImportService, RuleService, TriggerService};
use canopy_core::{
    Account, CanopyContext, DraftConditions, Item, Transaction, TransactionRule, User,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn draft(json: &str) -> DraftConditions {
    serde_json::from_str(json).expect("test conditions parse")
}

/// Build a rule directly (bypassing the service) with a controlled creation
/// time, `minutes_ago` in the past
fn make_rule(
    user_id: Uuid,
    name: &str,
    category: &str,
    conditions_json: &str,
    minutes_ago: i64,
) -> TransactionRule {
    let mut rule = TransactionRule::new(
        Uuid::new_v4(),
        user_id,
        name,
        category,
        draft(conditions_json).normalize(),
    );
    rule.created_at = Utc::now() - Duration::minutes(minutes_ago);
    rule.updated_at = rule.created_at;
    rule
}

fn make_tx(item_id: Uuid, account: &str, name: &str, merchant: Option<&str>, cents: i64) -> Transaction {
    let mut tx = Transaction::new(
        Uuid::new_v4(),
        item_id,
        account,
        name,
        Decimal::new(cents, 2),
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
    );
    tx.merchant_name = merchant.map(str::to_string);
    tx
}

async fn seed_item(store: &dyn Repository, user_id: Uuid, institution: &str) -> Item {
    let item = Item::new(Uuid::new_v4(), user_id, institution);
    store.upsert_item(&item).await.unwrap();
    store
        .upsert_account(&Account::new("acc_main", item.id, "Checking"))
        .await
        .unwrap();
    item
}

// ============================================================================
// First-Match-Wins Tests
// ============================================================================

#[tokio::test]
async fn test_first_created_rule_wins_regardless_of_insertion_order() {
    let store = Arc::new(MemoryStore::new());
    let user_id = Uuid::new_v4();
    let item = seed_item(store.as_ref(), user_id, "Bank").await;

    let coffee = make_tx(item.id, "acc_main", "STARBUCKS", Some("Starbucks"), -475);
    store.bulk_upsert_transactions(&[coffee]).await.unwrap();

    // both rules match the transaction; the older one must win.
    // insert the newer rule first to prove insertion order is irrelevant.
    let older = make_rule(
        user_id,
        "Coffee",
        "FOOD_AND_DRINK",
        r#"{"and":[{"field":"merchant_name","op":"contains","value":"starbucks"}]}"#,
        60,
    );
    let newer = make_rule(
        user_id,
        "All card spend",
        "GENERAL_MERCHANDISE",
        r#"{"and":[{"field":"amount","op":"gt","value":0}]}"#,
        30,
    );
    store.add_rule(&newer).await.unwrap();
    store.add_rule(&older).await.unwrap();

    let trigger = TriggerService::new(store.clone());
    let result = trigger.run(user_id).await.unwrap();
    assert_eq!(result.num_adjusted, 1);

    let txs = store.get_transactions_by_item(item.id).await.unwrap();
    assert_eq!(txs[0].primary_category, "FOOD_AND_DRINK");
}

#[tokio::test]
async fn test_unmatched_transactions_keep_their_category() {
    let store = Arc::new(MemoryStore::new());
    let user_id = Uuid::new_v4();
    let item = seed_item(store.as_ref(), user_id, "Bank").await;

    let mut tx = make_tx(item.id, "acc_main", "MYSTERY CHARGE", None, -999);
    tx.primary_category = "TRAVEL".to_string();
    store.bulk_upsert_transactions(&[tx]).await.unwrap();

    let rule = make_rule(
        user_id,
        "Coffee",
        "FOOD_AND_DRINK",
        r#"{"and":[{"field":"merchant_name","op":"contains","value":"starbucks"}]}"#,
        10,
    );
    store.add_rule(&rule).await.unwrap();

    let trigger = TriggerService::new(store.clone());
    let result = trigger.run(user_id).await.unwrap();
    assert_eq!(result.num_adjusted, 0);

    let txs = store.get_transactions_by_item(item.id).await.unwrap();
    assert_eq!(txs[0].primary_category, "TRAVEL");
}

// ============================================================================
// Idempotency Tests
// ============================================================================

#[tokio::test]
async fn test_trigger_twice_matches_single_run() {
    let store = Arc::new(MemoryStore::new());
    let user_id = Uuid::new_v4();
    let item = seed_item(store.as_ref(), user_id, "Bank").await;

    store
        .bulk_upsert_transactions(&[
            make_tx(item.id, "acc_main", "STARBUCKS", Some("Starbucks"), -475),
            make_tx(item.id, "acc_main", "NETFLIX.COM", Some("Netflix"), -1549),
            make_tx(item.id, "acc_main", "PAYROLL", None, 250_000),
        ])
        .await
        .unwrap();

    store
        .add_rule(&make_rule(
            user_id,
            "Coffee",
            "FOOD_AND_DRINK",
            r#"{"and":[{"field":"merchant_name","op":"contains","value":"starbucks"}]}"#,
            20,
        ))
        .await
        .unwrap();
    store
        .add_rule(&make_rule(
            user_id,
            "Streaming",
            "ENTERTAINMENT",
            r#"{"and":[{"field":"name","op":"contains","value":"netflix"}]}"#,
            10,
        ))
        .await
        .unwrap();

    let trigger = TriggerService::new(store.clone());
    let first = trigger.run(user_id).await.unwrap();
    assert_eq!(first.num_adjusted, 2);

    let after_first: Vec<(String, String)> = store
        .get_transactions_by_item(item.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| (t.name, t.primary_category))
        .collect();

    // matching is by immutable attributes, so the second run changes nothing
    let second = trigger.run(user_id).await.unwrap();
    assert_eq!(second.num_adjusted, 0);

    let after_second: Vec<(String, String)> = store
        .get_transactions_by_item(item.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| (t.name, t.primary_category))
        .collect();
    assert_eq!(after_first, after_second);
}

// ============================================================================
// Per-Item Failure Isolation
// ============================================================================

/// Repository wrapper that fails transaction reads for one item
struct FailingStore {
    inner: MemoryStore,
    failing_item: Uuid,
}

#[async_trait]
impl Repository for FailingStore {
    async fn upsert_user(&self, user: &User) -> CoreResult<()> {
        self.inner.upsert_user(user).await
    }
    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        self.inner.get_user(id).await
    }
    async fn upsert_item(&self, item: &Item) -> CoreResult<()> {
        self.inner.upsert_item(item).await
    }
    async fn get_items(&self, user_id: Uuid) -> CoreResult<Vec<Item>> {
        self.inner.get_items(user_id).await
    }
    async fn get_item_by_institution(
        &self,
        user_id: Uuid,
        institution_name: &str,
    ) -> CoreResult<Option<Item>> {
        self.inner
            .get_item_by_institution(user_id, institution_name)
            .await
    }
    async fn upsert_account(&self, account: &Account) -> CoreResult<()> {
        self.inner.upsert_account(account).await
    }
    async fn get_accounts_by_item(&self, item_id: Uuid) -> CoreResult<Vec<Account>> {
        self.inner.get_accounts_by_item(item_id).await
    }
    async fn bulk_upsert_transactions(&self, txs: &[Transaction]) -> CoreResult<()> {
        self.inner.bulk_upsert_transactions(txs).await
    }
    async fn get_transactions_by_item(&self, item_id: Uuid) -> CoreResult<Vec<Transaction>> {
        if item_id == self.failing_item {
            return Err(Error::storage("connection reset while reading transactions"));
        }
        self.inner.get_transactions_by_item(item_id).await
    }
    async fn transaction_exists_by_external_id(&self, external_id: &str) -> CoreResult<bool> {
        self.inner.transaction_exists_by_external_id(external_id).await
    }
    async fn update_transaction_category(
        &self,
        id: Uuid,
        primary_category: &str,
    ) -> CoreResult<()> {
        self.inner.update_transaction_category(id, primary_category).await
    }
    async fn get_transaction_count(&self, user_id: Uuid) -> CoreResult<i64> {
        self.inner.get_transaction_count(user_id).await
    }
    async fn get_transaction_date_range(
        &self,
        user_id: Uuid,
    ) -> CoreResult<(Option<NaiveDate>, Option<NaiveDate>)> {
        self.inner.get_transaction_date_range(user_id).await
    }
    async fn add_rule(&self, rule: &TransactionRule) -> CoreResult<()> {
        self.inner.add_rule(rule).await
    }
    async fn update_rule(&self, rule: &TransactionRule) -> CoreResult<()> {
        self.inner.update_rule(rule).await
    }
    async fn delete_rule(&self, id: Uuid) -> CoreResult<bool> {
        self.inner.delete_rule(id).await
    }
    async fn get_rule(&self, id: Uuid) -> CoreResult<Option<TransactionRule>> {
        self.inner.get_rule(id).await
    }
    async fn get_rule_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> CoreResult<Option<TransactionRule>> {
        self.inner.get_rule_by_name(user_id, name).await
    }
    async fn list_rules(&self, user_id: Uuid) -> CoreResult<Vec<TransactionRule>> {
        self.inner.list_rules(user_id).await
    }
}

#[tokio::test]
async fn test_resync_isolates_item_failures() {
    let inner = MemoryStore::new();
    let user_id = Uuid::new_v4();

    let item_a = seed_item(&inner, user_id, "Bank A").await;
    let item_b = seed_item(&inner, user_id, "Bank B").await;
    let item_c = seed_item(&inner, user_id, "Bank C").await;
    for item in [&item_a, &item_b, &item_c] {
        inner
            .bulk_upsert_transactions(&[make_tx(
                item.id,
                "acc_main",
                "STARBUCKS",
                Some("Starbucks"),
                -475,
            )])
            .await
            .unwrap();
    }
    inner
        .add_rule(&make_rule(
            user_id,
            "Coffee",
            "FOOD_AND_DRINK",
            r#"{"and":[{"field":"merchant_name","op":"contains","value":"starbucks"}]}"#,
            10,
        ))
        .await
        .unwrap();

    let store = Arc::new(FailingStore {
        inner,
        failing_item: item_b.id,
    });
    let trigger = TriggerService::new(store.clone());

    let resync = trigger.resync(user_id).await.unwrap();
    assert_eq!(resync.results.len(), 3);

    let by_item = |id: Uuid| resync.results.iter().find(|r| r.item_id == id).unwrap();
    assert!(by_item(item_a.id).success);
    assert!(by_item(item_c.id).success);
    let failed = by_item(item_b.id);
    assert!(!failed.success);
    assert!(!failed.error.as_deref().unwrap_or("").is_empty());

    // siblings were still processed
    assert_eq!(by_item(item_a.id).num_adjusted, 1);
    assert_eq!(by_item(item_c.id).num_adjusted, 1);

    // the aggregate-count variant surfaces the same failure as an error
    let err = trigger.run(user_id).await.unwrap_err();
    assert!(err.to_string().contains("1 of 3"));
}

// ============================================================================
// Authoring → Trigger Flow
// ============================================================================

#[tokio::test]
async fn test_spend_rule_authored_in_positive_terms_matches_stored_amounts() {
    let store = Arc::new(MemoryStore::new());
    let user_id = Uuid::new_v4();
    let item = seed_item(store.as_ref(), user_id, "Bank").await;

    store
        .bulk_upsert_transactions(&[
            make_tx(item.id, "acc_main", "BIG TICKET", None, -6_000), // $60 spend
            make_tx(item.id, "acc_main", "SMALL TICKET", None, -4_000), // $40 spend
            make_tx(item.id, "acc_main", "REFUND", None, 6_000),      // $60 in
        ])
        .await
        .unwrap();

    let rules = RuleService::new(store.clone());
    rules
        .create(
            user_id,
            "Over fifty",
            "GENERAL_MERCHANDISE",
            draft(r#"{"and":[{"field":"amount","op":"gt","value":50}]}"#),
        )
        .await
        .unwrap();

    let trigger = TriggerService::new(store.clone());
    let result = trigger.run(user_id).await.unwrap();
    assert_eq!(result.num_adjusted, 1);

    let txs = store.get_transactions_by_item(item.id).await.unwrap();
    let category_of = |name: &str| {
        txs.iter()
            .find(|t| t.name == name)
            .unwrap()
            .primary_category
            .clone()
    };
    assert_eq!(category_of("BIG TICKET"), "GENERAL_MERCHANDISE");
    assert_eq!(category_of("SMALL TICKET"), "OTHER");
    assert_eq!(category_of("REFUND"), "OTHER");
}

#[tokio::test]
async fn test_import_then_trigger_flow() {
    let store = Arc::new(MemoryStore::new());
    let user_id = Uuid::new_v4();

    let csv = "\
date,name,merchant_name,amount,account_id,transaction_id
2025-03-01,STARBUCKS STORE #123,STARBUCKS STORE #123,-4.75,acc_1,tx-001
2025-03-02,UBER TRIP,Uber,-23.40,acc_1,tx-002
";
    let import = ImportService::new(store.clone());
    let imported = import
        .import_reader(user_id, "Test Bank", csv.as_bytes(), &ImportOptions::default())
        .await
        .unwrap();
    assert_eq!(imported.imported, 2);

    let rules = RuleService::new(store.clone());
    rules
        .create(
            user_id,
            "Coffee",
            "FOOD_AND_DRINK",
            draft(r#"{"and":[{"field":"merchant_name","op":"contains","value":"starbucks"},{"field":"amount","op":"lt","value":0}]}"#),
        )
        .await
        .unwrap();

    // importing never applies rules on its own
    let before = store.get_transactions_by_item(imported.item_id).await.unwrap();
    assert!(before.iter().all(|t| t.primary_category == "OTHER"));

    let trigger = TriggerService::new(store.clone());
    let result = trigger.run(user_id).await.unwrap();
    assert_eq!(result.num_adjusted, 1);

    let after = store.get_transactions_by_item(imported.item_id).await.unwrap();
    let starbucks = after.iter().find(|t| t.transaction_id == "tx-001").unwrap();
    assert_eq!(starbucks.primary_category, "FOOD_AND_DRINK");
}

// ============================================================================
// Demo Data Flow
// ============================================================================

#[tokio::test]
async fn test_demo_seed_and_trigger() {
    let store = Arc::new(MemoryStore::new());
    let user_id = Uuid::new_v4();
    demo::seed(store.as_ref(), user_id).await.unwrap();

    let trigger = TriggerService::new(store.clone());
    let result = trigger.run(user_id).await.unwrap();
    assert!(result.num_adjusted > 0);

    let mut all_txs = Vec::new();
    for item in store.get_items(user_id).await.unwrap() {
        all_txs.extend(store.get_transactions_by_item(item.id).await.unwrap());
    }
    let category_of = |name: &str| {
        all_txs
            .iter()
            .find(|t| t.name.contains(name))
            .unwrap()
            .primary_category
            .clone()
    };

    assert_eq!(category_of("STARBUCKS"), "FOOD_AND_DRINK");
    assert_eq!(category_of("NETFLIX"), "ENTERTAINMENT");
    assert_eq!(category_of("SPOTIFY"), "ENTERTAINMENT");
    // rent matches both the rent rule and the large-purchase rule;
    // the rent rule was created first and wins
    assert_eq!(category_of("RENT PAYMENT"), "RENT_AND_UTILITIES");
    assert_eq!(category_of("DELTA"), "GENERAL_MERCHANDISE");
    // income stays untouched
    assert_eq!(category_of("PAYROLL"), "OTHER");
}

// ============================================================================
// Context + JSON Persistence
// ============================================================================

#[tokio::test]
async fn test_context_persists_rules_across_reopen() {
    let dir = TempDir::new().unwrap();

    let rule_id = {
        let ctx = CanopyContext::new(dir.path()).await.unwrap();
        let rule = ctx
            .rule_service
            .create(
                ctx.user_id,
                "Coffee",
                "FOOD_AND_DRINK",
                draft(r#"{"and":[{"field":"merchant_name","op":"contains","value":"starbucks"}]}"#),
            )
            .await
            .unwrap();
        rule.id
    };

    let ctx = CanopyContext::new(dir.path()).await.unwrap();
    let rules = ctx.rule_service.list(ctx.user_id).await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, rule_id);

    // the second open reused the persisted user id from settings.json
    let edit = ctx.rule_service.get_for_edit(rule_id).await.unwrap();
    assert_eq!(edit.name, "Coffee");
}
