//! CLI command implementations

pub mod demo;
pub mod import;
pub mod rules;
pub mod run;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use canopy_core::CanopyContext;

/// Get the canopy directory from environment or default
pub fn get_canopy_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CANOPY_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".canopy")
    }
}

/// Get or create the canopy context
pub async fn get_context() -> Result<CanopyContext> {
    let canopy_dir = get_canopy_dir();

    std::fs::create_dir_all(&canopy_dir)
        .with_context(|| format!("Failed to create canopy directory: {:?}", canopy_dir))?;

    CanopyContext::new(&canopy_dir)
        .await
        .context("Failed to initialize canopy context")
}
