//! Status command - data set summary

use anyhow::Result;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context().await?;
    let summary = ctx.status_service.get_status(ctx.user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::info("Canopy status");
    println!(
        "{} item(s), {} account(s), {} transaction(s), {} rule(s)",
        summary.total_items, summary.total_accounts, summary.total_transactions, summary.total_rules
    );

    if let (Some(earliest), Some(latest)) = (&summary.date_range.earliest, &summary.date_range.latest)
    {
        println!("Transactions from {} to {}", earliest, latest);
    }

    if !summary.items.is_empty() {
        let mut table = output::create_table();
        table.set_header(vec!["Institution", "Accounts", "Transactions"]);
        for item in &summary.items {
            table.add_row(vec![
                item.institution_name.clone(),
                item.accounts.to_string(),
                item.transactions.to_string(),
            ]);
        }
        println!("{}", table);
    }
    Ok(())
}
