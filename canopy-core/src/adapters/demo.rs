//! Demo data seeding
//!
//! Generates a small, deterministic data set (two linked items, a handful
//! of accounts and recognizable transactions, and a few starter rules) so
//! a fresh install can exercise rule authoring and the trigger immediately.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, DraftConditions, Item, Transaction, TransactionRule};
use crate::ports::Repository;

const DEMO_BANK: &str = "First Platypus Bank";
const DEMO_CREDIT_UNION: &str = "Tartan Credit Union";

/// What `seed` inserted
#[derive(Debug, Serialize)]
pub struct DemoSeedResult {
    pub items: i64,
    pub accounts: i64,
    pub transactions: i64,
    pub rules: i64,
}

/// Generate demo items for a user (fixed ids, stable across reseeds)
pub fn generate_demo_items(user_id: Uuid) -> Vec<Item> {
    vec![
        Item::new(
            Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
            user_id,
            DEMO_BANK,
        ),
        Item::new(
            Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap(),
            user_id,
            DEMO_CREDIT_UNION,
        ),
    ]
}

/// Generate demo accounts under the given items
pub fn generate_demo_accounts(items: &[Item]) -> Vec<Account> {
    let mut accounts = vec![
        Account {
            id: "demo-checking-001".to_string(),
            item_id: items[0].id,
            name: "Primary Checking".to_string(),
            account_type: Some("depository".to_string()),
            mask: Some("4821".to_string()),
        },
        Account {
            id: "demo-savings-001".to_string(),
            item_id: items[0].id,
            name: "High-Yield Savings".to_string(),
            account_type: Some("depository".to_string()),
            mask: Some("9130".to_string()),
        },
    ];
    if items.len() > 1 {
        accounts.push(Account {
            id: "demo-credit-001".to_string(),
            item_id: items[1].id,
            name: "Tartan Rewards Card".to_string(),
            account_type: Some("credit".to_string()),
            mask: Some("0057".to_string()),
        });
    }
    accounts
}

/// Generate demo transactions spread over the last two weeks
///
/// Amounts are signed: negative is money out.
pub fn generate_demo_transactions(items: &[Item]) -> Vec<Transaction> {
    let today = Utc::now().date_naive();
    let bank = items[0].id;
    let card = items.get(1).map(|i| i.id).unwrap_or(bank);

    // (item, account, name, merchant, amount cents, days ago)
    let rows: [(Uuid, &str, &str, Option<&str>, i64, i64); 12] = [
        (bank, "demo-checking-001", "PAYROLL ACME CORP", None, 250_000, 14),
        (bank, "demo-checking-001", "RENT PAYMENT", None, -180_000, 13),
        (bank, "demo-checking-001", "TRANSFER TO SAVINGS", None, -50_000, 12),
        (bank, "demo-savings-001", "TRANSFER FROM CHECKING", None, 50_000, 12),
        (card, "demo-credit-001", "STARBUCKS STORE #123", Some("STARBUCKS STORE #123"), -475, 9),
        (card, "demo-credit-001", "WHOLE FOODS MARKET", Some("Whole Foods"), -8_712, 8),
        (card, "demo-credit-001", "NETFLIX.COM", Some("Netflix"), -1_549, 7),
        (card, "demo-credit-001", "UBER TRIP HELP.UBER.COM", Some("Uber"), -2_340, 6),
        (card, "demo-credit-001", "SHELL OIL 57442", Some("Shell"), -5_230, 5),
        (card, "demo-credit-001", "DELTA AIR LINES", Some("Delta Air Lines"), -42_350, 4),
        (card, "demo-credit-001", "SPOTIFY USA", Some("Spotify"), -1_099, 2),
        (card, "demo-credit-001", "CVS/PHARMACY #08291", Some("CVS"), -1_860, 1),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (item_id, account, name, merchant, cents, days_ago))| {
            let mut tx = Transaction::new(
                Uuid::new_v4(),
                *item_id,
                *account,
                *name,
                Decimal::new(*cents, 2),
                today - Duration::days(*days_ago),
            );
            tx.merchant_name = merchant.map(str::to_string);
            tx.transaction_id = format!("demo-tx-{:03}", i);
            tx
        })
        .collect()
}

/// Generate starter rules, authored in spend terms and normalized for
/// storage like any user-created rule
pub fn generate_demo_rules(user_id: Uuid) -> Vec<TransactionRule> {
    let authored: [(&str, &str, &str); 4] = [
        (
            "Coffee shops",
            "FOOD_AND_DRINK",
            r#"{"and":[{"field":"merchant_name","op":"contains","value":"starbucks"}]}"#,
        ),
        (
            "Streaming subscriptions",
            "ENTERTAINMENT",
            r#"{"or":[{"field":"name","op":"contains","value":"netflix"},{"field":"name","op":"contains","value":"spotify"}]}"#,
        ),
        (
            "Rent",
            "RENT_AND_UTILITIES",
            r#"{"and":[{"field":"name","op":"contains","value":"rent payment"}]}"#,
        ),
        (
            "Large purchases",
            "GENERAL_MERCHANDISE",
            r#"{"and":[{"field":"amount","op":"gt","value":400}]}"#,
        ),
    ];

    let base = Utc::now();
    authored
        .iter()
        .enumerate()
        .map(|(i, (name, category, conditions))| {
            let draft: DraftConditions =
                serde_json::from_str(conditions).expect("demo conditions are valid JSON");
            let mut rule = TransactionRule::new(
                Uuid::new_v4(),
                user_id,
                *name,
                *category,
                draft.normalize(),
            );
            // spread creation times so first-match order is unambiguous
            rule.created_at = base + Duration::seconds(i as i64);
            rule.updated_at = rule.created_at;
            rule
        })
        .collect()
}

/// Seed the demo data set for a user
///
/// Refuses to run twice; the demo institutions already existing means the
/// data is in place.
pub async fn seed(store: &dyn Repository, user_id: Uuid) -> Result<DemoSeedResult> {
    if store
        .get_item_by_institution(user_id, DEMO_BANK)
        .await?
        .is_some()
    {
        return Err(Error::Other("demo data already seeded".to_string()));
    }

    let items = generate_demo_items(user_id);
    let accounts = generate_demo_accounts(&items);
    let transactions = generate_demo_transactions(&items);
    let rules = generate_demo_rules(user_id);

    for item in &items {
        store.upsert_item(item).await?;
    }
    for account in &accounts {
        store.upsert_account(account).await?;
    }
    store.bulk_upsert_transactions(&transactions).await?;
    for rule in &rules {
        store.add_rule(rule).await?;
    }

    Ok(DemoSeedResult {
        items: items.len() as i64,
        accounts: accounts.len() as i64,
        transactions: transactions.len() as i64,
        rules: rules.len() as i64,
    })
}
