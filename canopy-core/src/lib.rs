//! Canopy Core - Business logic for transaction categorization
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities and the rule engine (condition
//!   trees, validation, normalization, evaluation)
//! - **ports**: Trait definitions for external dependencies (Repository)
//! - **services**: Business logic orchestration (rule CRUD, trigger, import)
//! - **adapters**: Concrete implementations (in-memory store, JSON file store)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use adapters::JsonStore;
use config::Config;
use ports::Repository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    validate, Account, ConditionGroup, ConditionLeaf, ConditionNode, ConditionOp, ConditionValue,
    DraftConditions, GroupOp, Item, RuleField, StoredConditions, Transaction, TransactionRule,
    User, ValidationReport,
};

/// Main context for Canopy operations
///
/// This is the primary entry point for all business logic. It holds the
/// local store, configuration, and all services.
pub struct CanopyContext {
    pub config: Config,
    /// The local user all CLI operations act as
    pub user_id: Uuid,
    pub store: Arc<JsonStore>,
    pub rule_service: RuleService,
    pub trigger_service: TriggerService,
    pub import_service: ImportService,
    pub status_service: StatusService,
}

impl CanopyContext {
    /// Create a new Canopy context rooted at the given directory
    pub async fn new(canopy_dir: &Path) -> Result<Self> {
        let mut config = Config::load(canopy_dir)?;

        // First run: mint the local user id and persist it
        let user_id = match config.user_id {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                config.set_user_id(id);
                config.save(canopy_dir)?;
                id
            }
        };

        let store = Arc::new(JsonStore::open(canopy_dir.join("canopy.json"))?);
        store
            .upsert_user(&User::new(user_id, config.email.as_str()))
            .await?;

        let repository: Arc<dyn Repository> = store.clone();
        let rule_service = RuleService::new(Arc::clone(&repository));
        let trigger_service = TriggerService::new(Arc::clone(&repository));
        let import_service = ImportService::new(Arc::clone(&repository));
        let status_service = StatusService::new(repository);

        Ok(Self {
            config,
            user_id,
            store,
            rule_service,
            trigger_service,
            import_service,
            status_service,
        })
    }
}
