use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::db::{open_cache_db, CacheDb, InspectorConfig, WorkspaceLayout};

/// Layout, config, cache path and an open CacheDb for one workspace.
#[derive(Debug)]
pub struct WorkspaceContext {
    pub layout: WorkspaceLayout,
    pub config: InspectorConfig,
    pub db_path: PathBuf,
    pub db: CacheDb,
}

impl WorkspaceContext {
    /// Load the workspace config and open the cache for a given root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = WorkspaceLayout::new(root);
        let (config, db_path, db) = open_cache_db(&layout)?;
        Ok(Self { layout, config, db_path, db })
    }
}
