//! Rule service - transaction rule CRUD
//!
//! The authoring boundary of the engine: drafts come in, get validated and
//! normalized exactly once, and leave storage denormalized exactly once
//! when loaded back for editing.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::category::is_valid_category;
use crate::domain::{validate, DraftConditions, TransactionRule};
use crate::ports::Repository;

/// Rule service for authoring and managing categorization rules
pub struct RuleService {
    store: Arc<dyn Repository>,
}

/// A rule in its author-facing form, as the editor works with it
#[derive(Debug, Clone, Serialize)]
pub struct RuleDraft {
    pub id: Uuid,
    pub name: String,
    pub personal_finance_category: String,
    pub conditions: DraftConditions,
}

impl RuleService {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    /// All rules for a user, oldest first
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<TransactionRule>> {
        Ok(self.store.list_rules(user_id).await?)
    }

    /// Get a rule by id
    pub async fn get(&self, id: Uuid) -> Result<TransactionRule> {
        self.store
            .get_rule(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Rule not found: {}", id))
    }

    /// Get a rule with its conditions converted back to the author-facing
    /// representation, for editing
    pub async fn get_for_edit(&self, id: Uuid) -> Result<RuleDraft> {
        let rule = self.get(id).await?;
        Ok(RuleDraft {
            id: rule.id,
            name: rule.name,
            personal_finance_category: rule.personal_finance_category,
            conditions: rule.conditions.to_draft(),
        })
    }

    /// Create a rule from an authored draft
    pub async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        personal_finance_category: &str,
        conditions: DraftConditions,
    ) -> Result<TransactionRule> {
        let name = name.trim();
        self.check_fields(name, personal_finance_category, &conditions)?;

        if self.store.get_rule_by_name(user_id, name).await?.is_some() {
            anyhow::bail!("A rule named '{}' already exists", name);
        }

        let rule = TransactionRule::new(
            Uuid::new_v4(),
            user_id,
            name,
            personal_finance_category,
            conditions.normalize(),
        );
        self.store.add_rule(&rule).await?;
        debug!(rule = %rule.name, "rule created");
        Ok(rule)
    }

    /// Update an existing rule from an authored draft
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        personal_finance_category: &str,
        conditions: DraftConditions,
    ) -> Result<TransactionRule> {
        let name = name.trim();
        self.check_fields(name, personal_finance_category, &conditions)?;

        let mut rule = self.get(id).await?;
        if let Some(other) = self.store.get_rule_by_name(rule.user_id, name).await? {
            if other.id != id {
                anyhow::bail!("A rule named '{}' already exists", name);
            }
        }

        rule.name = name.to_string();
        rule.personal_finance_category = personal_finance_category.to_string();
        rule.conditions = conditions.normalize();
        rule.updated_at = chrono::Utc::now();
        self.store.update_rule(&rule).await?;
        debug!(rule = %rule.name, "rule updated");
        Ok(rule)
    }

    /// Delete a rule
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_rule(id).await? {
            anyhow::bail!("Rule not found: {}", id);
        }
        Ok(())
    }

    /// Shared create/update checks: name, category, condition tree
    fn check_fields(
        &self,
        name: &str,
        personal_finance_category: &str,
        conditions: &DraftConditions,
    ) -> Result<()> {
        if name.is_empty() {
            anyhow::bail!("Rule name must not be empty");
        }
        if !is_valid_category(personal_finance_category) {
            anyhow::bail!("Unknown category: {}", personal_finance_category);
        }
        let report = validate(conditions);
        if !report.valid {
            anyhow::bail!("Invalid rule conditions: {}", report.errors.join("; "));
        }
        Ok(())
    }
}
