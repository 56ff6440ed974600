use std::path::{Path, PathBuf};

/// Logical layout of an inspector workspace on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// The CLI is responsible for actually creating directories and files based
/// on this layout.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    /// Root directory of the workspace.
    pub root: PathBuf,
    /// Directory for internal metadata (.inspector).
    pub meta_dir: PathBuf,
    /// Path to the workspace config file (JSON).
    pub config_path: PathBuf,
    /// Path to the disassembly cache database.
    pub db_path: PathBuf,
    /// Directory for exported graph models (graphs).
    pub graphs_dir: PathBuf,
}

impl WorkspaceLayout {
    /// Compute the default layout for a workspace rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".inspector");
        let config_path = meta_dir.join("config.json");
        let db_path = meta_dir.join("cache.db");
        let graphs_dir = root.join("graphs");

        Self { root, meta_dir, config_path, db_path, graphs_dir }
    }

    /// Database path suitable for storing in `InspectorConfig`, relative to
    /// `root` when possible.
    pub fn db_path_relative_string(&self) -> String {
        match self.db_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.db_path.to_string_lossy().to_string(),
        }
    }

    /// Export path of the graph model for `address`.
    pub fn graph_export_path(&self, address: &str) -> PathBuf {
        self.graphs_dir.join(format!("{address}.json"))
    }

    /// Export metadata path (input digest, timestamp) for `address`.
    pub fn graph_meta_path(&self, address: &str) -> PathBuf {
        self.graphs_dir.join(format!("{address}.meta.json"))
    }
}
