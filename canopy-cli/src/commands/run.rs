//! Run command - apply rules to transactions

use std::process::exit;

use anyhow::Result;
use colored::Colorize;
use uuid::Uuid;

use super::get_context;
use crate::output;

pub async fn run(user: Option<Uuid>, json: bool) -> Result<()> {
    let ctx = get_context().await?;

    match user {
        None => run_self(&ctx, json).await,
        Some(target) => run_resync(&ctx, target, json).await,
    }
}

/// Self-service run: one aggregate count
async fn run_self(ctx: &canopy_core::CanopyContext, json: bool) -> Result<()> {
    let result = ctx.trigger_service.run(ctx.user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.num_adjusted == 0 {
        println!("Rules ran; no transactions needed recategorizing");
    } else {
        output::success(&format!(
            "✓ Rules applied: {} transaction(s) recategorized",
            result.num_adjusted
        ));
    }
    Ok(())
}

/// Administrative re-sync: per-item results, failures reported not raised
async fn run_resync(ctx: &canopy_core::CanopyContext, target: Uuid, json: bool) -> Result<()> {
    let result = ctx.trigger_service.resync(target).await?;
    let ok_count = result.results.iter().filter(|r| r.success).count();
    let fail_count = result.results.len() - ok_count;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if fail_count > 0 {
            exit(1);
        }
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Item", "Status", "Adjusted", "Error"]);
    for entry in &result.results {
        table.add_row(vec![
            entry.item_id.to_string(),
            if entry.success {
                "✓".to_string()
            } else {
                "✗".to_string()
            },
            entry.num_adjusted.to_string(),
            entry.error.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);

    if fail_count > 0 {
        println!(
            "{} Sync completed: {} succeeded, {} failed",
            "✗".red(),
            ok_count,
            fail_count
        );
        exit(1);
    }
    output::success(&format!("✓ Sync completed: {} succeeded, 0 failed", ok_count));
    Ok(())
}
