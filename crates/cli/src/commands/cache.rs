use std::path::Path;

use anyhow::{Context, Result};
use inspector_core::db::WorkspaceContext;
use inspector_core::session::DerivedGraph;

use crate::canonicalize_or_current;
use crate::commands::read_disassembly_file;

/// Validate a disassembly file and store it in the workspace cache.
pub fn import_command(root: &str, address: &str, file: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = WorkspaceContext::from_root(&root_path)?;

    let response = read_disassembly_file(Path::new(file))?;
    // Refuse payloads that would not build a graph.
    let derived = DerivedGraph::from_response(response)
        .with_context(|| format!("Disassembly in {file} is inconsistent"))?;

    let entry = ctx
        .db
        .put_disassembly(address, &derived.response, Some(file))
        .with_context(|| format!("Failed to cache disassembly for {address}"))?;

    println!(
        "Imported {}: {} blocks, {} functions (sha256 {})",
        entry.address, entry.block_count, entry.function_count, entry.digest
    );
    Ok(())
}

/// List cached disassemblies.
pub fn list_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = WorkspaceContext::from_root(&root_path)?;
    let entries = ctx.db.list_entries().context("Failed to list cached disassemblies")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No cached disassemblies.");
        return Ok(());
    }

    println!("Cached disassemblies:");
    for entry in entries {
        println!(
            "- {} ({} blocks, {} functions) stored {}{}",
            entry.address,
            entry.block_count,
            entry.function_count,
            entry.stored_at,
            entry.source.map(|s| format!(" from {s}")).unwrap_or_default()
        );
    }
    Ok(())
}

/// Drop a cached disassembly.
pub fn remove_command(root: &str, address: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = WorkspaceContext::from_root(&root_path)?;
    if ctx.db.remove(address)? {
        println!("Removed {address} from cache");
    } else {
        anyhow::bail!("No cached disassembly for {address}");
    }
    Ok(())
}
