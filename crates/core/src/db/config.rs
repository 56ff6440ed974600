use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::graph::{GraphFilter, NodeType};

/// Location of the disassembly cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Path to the cache database file (typically relative to the workspace root).
    pub path: String,
}

impl CacheConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Serializable workspace settings, stored at `.inspector/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Human-friendly workspace name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Version of the config format itself.
    pub config_version: String,
    pub cache: CacheConfig,
    /// Whether graph views drop non-matching nodes unless told otherwise.
    #[serde(default)]
    pub show_only_filtered: bool,
}

impl InspectorConfig {
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            cache: CacheConfig::new(db_path),
            show_only_filtered: false,
        }
    }
}

/// A saved graph filter.
///
/// ```yaml
/// function: "transfer(address,uint256)"
/// type: calls
/// show_only_filtered: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPreset {
    #[serde(default)]
    pub function: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub show_only_filtered: Option<bool>,
}

impl FilterPreset {
    /// Load a preset from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter preset at {}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)
                .with_context(|| format!("Failed to parse YAML preset {}", path.display())),
            Some("json") => serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse JSON preset {}", path.display())),
            _ => Err(anyhow!(
                "Unsupported preset format for {} (expected .yaml, .yml or .json)",
                path.display()
            )),
        }
    }

    pub fn filter(&self) -> GraphFilter {
        GraphFilter::all()
            .with_function(self.function.clone())
            .with_node_type(self.node_type)
    }
}
