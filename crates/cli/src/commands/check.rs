//! The `check-config` command: validate a config document without
//! running anything

use std::path::Path;

use anyhow::{Context, Result};

use gridcheck_core::ValidationConfig;

pub fn check_config(path: &Path) -> Result<ValidationConfig> {
    let doc = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    ValidationConfig::from_json(&doc)
        .with_context(|| format!("invalid config {}", path.display()))
}
