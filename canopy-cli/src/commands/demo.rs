//! Demo command - seed sample data

use anyhow::Result;

use canopy_core::adapters::demo;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context().await?;
    let result = demo::seed(ctx.store.as_ref(), ctx.user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success(&format!(
        "✓ Demo data seeded: {} item(s), {} account(s), {} transaction(s), {} rule(s)",
        result.items, result.accounts, result.transactions, result.rules
    ));
    println!("Try: canopy rules list, then canopy run");
    Ok(())
}
