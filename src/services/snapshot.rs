// src/services/snapshot.rs
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

use crate::models::SecurityRecord;

/// Replaces whatever is at `path` with the records as a pretty-printed JSON
/// array, creating parent directories as needed.
pub fn write_snapshot(path: &Path, records: &[SecurityRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;

    info!("Saved {} stocks to {}", records.len(), path.display());
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<Vec<SecurityRecord>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&json)?)
}
