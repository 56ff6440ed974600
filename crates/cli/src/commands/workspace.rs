use std::fs;

use anyhow::{Context, Result};
use inspector_core::db::{CacheDb, InspectorConfig, WorkspaceContext, WorkspaceLayout};
use serde::Serialize;

use crate::commands::print_dir_status;
use crate::{canonicalize_or_current, infer_workspace_name};

#[derive(Serialize)]
pub struct WorkspaceInfo {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub graphs_dir: String,
    pub show_only_filtered: bool,
    pub cached_disassemblies: usize,
}

/// Initialize a new workspace at `root`.
pub fn init_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = WorkspaceLayout::new(&root_path);

    let workspace_name = match name {
        Some(n) => n,
        None => infer_workspace_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.graphs_dir)
        .with_context(|| format!("Failed to create graphs dir: {}", layout.graphs_dir.display()))?;

    let config = InspectorConfig::new(&workspace_name, layout.db_path_relative_string());
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.config_path, json).with_context(|| {
        format!("Failed to write workspace config: {}", layout.config_path.display())
    })?;

    CacheDb::open(&layout.db_path).with_context(|| {
        format!("Failed to create cache database at {}", layout.db_path.display())
    })?;

    println!("Initialized inspector workspace '{}'", workspace_name);
    println!("Root: {}", layout.root.display());
    println!("Config: {}", layout.config_path.display());
    println!("Cache: {}", layout.db_path.display());
    Ok(())
}

/// Show information about an existing workspace.
pub fn info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = WorkspaceContext::from_root(&root_path)?;
    let entries = ctx.db.list_entries().context("Failed to list cached disassemblies")?;

    let info = WorkspaceInfo {
        name: ctx.config.name.clone(),
        root: ctx.layout.root.display().to_string(),
        config_file: ctx.layout.config_path.display().to_string(),
        config_version: ctx.config.config_version.clone(),
        db_path: ctx.db_path.display().to_string(),
        graphs_dir: ctx.layout.graphs_dir.display().to_string(),
        show_only_filtered: ctx.config.show_only_filtered,
        cached_disassemblies: entries.len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Workspace: {}", info.name);
    println!("Root: {}", info.root);
    println!("Config: {} (version {})", info.config_file, info.config_version);
    println!("Cache: {}", info.db_path);
    println!("Show only filtered by default: {}", info.show_only_filtered);
    println!("Cached disassemblies: {}", info.cached_disassemblies);
    println!("Layout:");
    print_dir_status("meta", &ctx.layout.meta_dir);
    print_dir_status("graphs", &ctx.layout.graphs_dir);
    Ok(())
}
