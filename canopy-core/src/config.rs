//! Configuration management
//!
//! `settings.json` in the canopy directory:
//! ```json
//! {
//!   "app": { "userId": "...", "email": "..." },
//!   "import": { "columns": { "date": "date", ... }, "flipSigns": false }
//! }
//! ```
//! Fields the CLI does not manage are preserved across saves.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::{CsvColumns, ImportOptions};

const DEFAULT_EMAIL: &str = "local@canopy";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    import: ImportSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    user_id: Option<Uuid>,
    #[serde(default)]
    email: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportSettings {
    #[serde(default)]
    columns: Option<CsvColumns>,
    #[serde(default)]
    flip_signs: bool,
}

/// Canopy configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub user_id: Option<Uuid>,
    pub email: String,
    pub import_columns: CsvColumns,
    pub import_flip_signs: bool,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: None,
            email: DEFAULT_EMAIL.to_string(),
            import_columns: CsvColumns::default(),
            import_flip_signs: false,
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the canopy directory; a missing or unreadable file
    /// yields defaults
    pub fn load(canopy_dir: &Path) -> Result<Self> {
        let settings_path = canopy_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            user_id: raw.app.user_id,
            email: raw
                .app
                .email
                .clone()
                .unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
            import_columns: raw.import.columns.clone().unwrap_or_default(),
            import_flip_signs: raw.import.flip_signs,
            _raw_settings: raw,
        })
    }

    /// Save config to the canopy directory, preserving settings the CLI
    /// doesn't manage
    pub fn save(&self, canopy_dir: &Path) -> Result<()> {
        let settings_path = canopy_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.app.user_id = self.user_id;
        settings.app.email = Some(self.email.clone());
        settings.import.columns = Some(self.import_columns.clone());
        settings.import.flip_signs = self.import_flip_signs;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Assign the local user id (first run)
    pub fn set_user_id(&mut self, user_id: Uuid) {
        self.user_id = Some(user_id);
    }

    /// Import options built from the configured defaults
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            flip_signs: self.import_flip_signs,
            columns: self.import_columns.clone(),
        }
    }
}
