//! Import command - load transactions from CSV

use std::path::Path;

use anyhow::Result;

use super::get_context;
use crate::output;

pub async fn run(file: &Path, institution: &str, flip_signs: bool, json: bool) -> Result<()> {
    let ctx = get_context().await?;

    let mut options = ctx.config.import_options();
    if flip_signs {
        options.flip_signs = true;
    }

    let result = ctx
        .import_service
        .import_csv(ctx.user_id, institution, file, &options)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success(&format!(
        "✓ Imported {} transaction(s) into {}",
        result.imported, result.institution_name
    ));
    if result.skipped > 0 {
        println!("{} duplicate(s) skipped", result.skipped);
    }
    Ok(())
}
