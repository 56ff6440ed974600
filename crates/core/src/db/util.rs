use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::db::{CacheDb, InspectorConfig, WorkspaceLayout};

/// Load the workspace config JSON from disk for a given layout.
pub fn load_config(layout: &WorkspaceLayout) -> Result<InspectorConfig> {
    let config_json = std::fs::read_to_string(&layout.config_path).with_context(|| {
        format!("Failed to read workspace config at {}", layout.config_path.display())
    })?;
    let config: InspectorConfig =
        serde_json::from_str(&config_json).context("Failed to parse workspace config JSON")?;
    Ok(config)
}

/// Resolve the cache path (respecting relative/absolute config) and open a CacheDb.
pub fn open_cache_db(layout: &WorkspaceLayout) -> Result<(InspectorConfig, PathBuf, CacheDb)> {
    let config = load_config(layout)?;
    let config_db_path = std::path::Path::new(&config.cache.path);
    let db_path = if config_db_path.is_absolute() {
        config_db_path.to_path_buf()
    } else {
        layout.root.join(config_db_path)
    };
    let db = CacheDb::open(&db_path)
        .with_context(|| format!("Failed to open cache database at {}", db_path.display()))?;
    Ok((config, db_path, db))
}
