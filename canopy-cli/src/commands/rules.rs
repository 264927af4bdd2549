//! Rules commands - manage categorization rules

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use dialoguer::Confirm;
use uuid::Uuid;

use canopy_core::domain::category;
use canopy_core::DraftConditions;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum RuleCommands {
    /// List rules
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a rule in its author-facing form
    Show {
        /// Rule id
        id: Uuid,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a rule
    New {
        /// Unique rule name
        name: String,
        /// Category to assign on match
        #[arg(long)]
        category: String,
        /// Conditions JSON (e.g. '{"and":[{"field":"merchant_name","op":"contains","value":"starbucks"}]}')
        #[arg(long)]
        conditions: Option<String>,
        /// Read conditions JSON from file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a rule; fields not given keep their current value
    Edit {
        /// Rule id
        id: Uuid,
        /// New rule name
        #[arg(long)]
        name: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New conditions JSON
        #[arg(long)]
        conditions: Option<String>,
        /// Read new conditions JSON from file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a rule
    Delete {
        /// Rule id
        id: Uuid,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub async fn run(command: RuleCommands) -> Result<()> {
    match command {
        RuleCommands::List { json } => list(json).await,
        RuleCommands::Show { id, json } => show(id, json).await,
        RuleCommands::New {
            name,
            category,
            conditions,
            file,
            json,
        } => new(&name, &category, conditions, file, json).await,
        RuleCommands::Edit {
            id,
            name,
            category,
            conditions,
            file,
            json,
        } => edit(id, name, category, conditions, file, json).await,
        RuleCommands::Delete { id, force } => delete(id, force).await,
    }
}

async fn list(json: bool) -> Result<()> {
    let ctx = get_context().await?;
    let rules = ctx.rule_service.list(ctx.user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    if rules.is_empty() {
        println!("No rules yet. Create one with: canopy rules new");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Category", "Conditions", "Created"]);
    for rule in &rules {
        table.add_row(vec![
            rule.id.to_string(),
            rule.name.clone(),
            category::category_label(&rule.personal_finance_category).to_string(),
            // author-facing rendering, the way the rule was written
            rule.conditions.to_draft().node().to_string(),
            rule.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

async fn show(id: Uuid, json: bool) -> Result<()> {
    let ctx = get_context().await?;
    let rule = ctx.rule_service.get_for_edit(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rule)?);
        return Ok(());
    }

    println!("Name:       {}", rule.name);
    println!(
        "Category:   {} ({})",
        rule.personal_finance_category,
        category::category_label(&rule.personal_finance_category)
    );
    println!("Conditions: {}", rule.conditions.node());
    Ok(())
}

async fn new(
    name: &str,
    category: &str,
    conditions: Option<String>,
    file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = get_context().await?;
    let conditions = read_conditions(conditions, file, true)?
        .ok_or_else(|| anyhow::anyhow!(
            "No conditions provided. Use --conditions, --file, or pipe JSON from stdin."
        ))?;

    let rule = ctx
        .rule_service
        .create(ctx.user_id, name, category, conditions)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rule)?);
    } else {
        output::success(&format!("✓ Rule '{}' created", rule.name));
    }
    Ok(())
}

async fn edit(
    id: Uuid,
    name: Option<String>,
    category: Option<String>,
    conditions: Option<String>,
    file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let ctx = get_context().await?;
    let current = ctx.rule_service.get_for_edit(id).await?;

    let name = name.unwrap_or(current.name);
    let category = category.unwrap_or(current.personal_finance_category);
    // stdin is not consulted here: an edit with no --conditions/--file
    // keeps the existing tree
    let conditions = read_conditions(conditions, file, false)?.unwrap_or(current.conditions);

    let rule = ctx
        .rule_service
        .update(id, &name, &category, conditions)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rule)?);
    } else {
        output::success(&format!("✓ Rule '{}' updated", rule.name));
    }
    Ok(())
}

async fn delete(id: Uuid, force: bool) -> Result<()> {
    let ctx = get_context().await?;
    let rule = ctx.rule_service.get(id).await?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete rule '{}'?", rule.name))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    ctx.rule_service.delete(id).await?;
    output::success(&format!("✓ Rule '{}' deleted", rule.name));
    Ok(())
}

/// Resolve conditions JSON from a flag, a file, or (optionally) piped stdin
fn read_conditions(
    conditions: Option<String>,
    file: Option<PathBuf>,
    allow_stdin: bool,
) -> Result<Option<DraftConditions>> {
    let text = if let Some(text) = conditions {
        Some(text)
    } else if let Some(path) = file {
        Some(
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read conditions file: {}", path.display()))?,
        )
    } else if allow_stdin && atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        let trimmed = buffer.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    } else {
        None
    };

    match text {
        Some(text) => {
            let draft: DraftConditions = serde_json::from_str(text.trim())
                .context("Conditions are not valid JSON (expected the {\"and\": [...]} shape)")?;
            Ok(Some(draft))
        }
        None => Ok(None),
    }
}
