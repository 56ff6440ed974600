use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use inspector_core::db::{FilterPreset, InspectorConfig, WorkspaceContext, WorkspaceLayout};
use inspector_core::graph::{GraphFilter, NodeType};
use inspector_core::model::{BackendReply, DisassemblyResponse};
use inspector_core::session::{InspectorSession, LoadOutcome};

use crate::{canonicalize_or_current, sha256_file};

/// Where a command reads its disassembly from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Workspace root directory. Defaults to the current working directory.
    #[arg(long, default_value = ".")]
    pub root: String,

    /// Contract address of a cached disassembly.
    #[arg(long)]
    pub address: Option<String>,

    /// Read the disassembly from a JSON file instead of the cache.
    #[arg(long, conflicts_with = "address")]
    pub file: Option<String>,
}

/// Graph filter flags shared by graph-related commands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep only blocks of this function (exact raw name).
    #[arg(long)]
    pub function: Option<String>,

    /// Keep only blocks carrying this type tag (e.g. calls, storageWrites).
    #[arg(long = "type")]
    pub node_type: Option<String>,

    /// Drop non-matching blocks instead of marking them.
    #[arg(long, default_value_t = false)]
    pub only_filtered: bool,

    /// Load filter defaults from a YAML or JSON preset.
    #[arg(long)]
    pub preset: Option<String>,
}

/// A disassembly ready to be inspected.
#[derive(Debug)]
pub struct LoadedInput {
    /// Address, or the file stem for file input.
    pub label: String,
    /// SHA-256 of the input payload.
    pub digest: String,
    pub response: DisassemblyResponse,
    /// Workspace config, when the input came from a workspace.
    pub config: Option<InspectorConfig>,
}

/// Parse a backend reply and insist that it carries a finished result.
pub fn parse_reply(raw: &str, origin: &str) -> Result<DisassemblyResponse> {
    let reply = BackendReply::from_json(raw)
        .with_context(|| format!("Failed to parse disassembly JSON from {origin}"))?;
    match reply {
        BackendReply::Result(response) => Ok(response),
        BackendReply::Status(status) => {
            bail!("Disassembly in {origin} is still running (state {})", status.state)
        }
        BackendReply::TaskError { task_error } => bail!(
            "Disassembly in {origin} failed with status {}: {}",
            task_error.status,
            task_error.message
        ),
    }
}

/// Read and parse a disassembly file.
pub fn read_disassembly_file(path: &Path) -> Result<DisassemblyResponse> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read disassembly file {}", path.display()))?;
    parse_reply(&raw, &path.display().to_string())
}

/// Resolve `--file` or `--address` into a disassembly.
pub fn load_input(input: &InputArgs) -> Result<LoadedInput> {
    if let Some(file) = &input.file {
        let path = Path::new(file);
        let response = read_disassembly_file(path)?;
        let label = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("disassembly")
            .to_string();
        let root = canonicalize_or_current(&input.root)?;
        let layout = WorkspaceLayout::new(&root);
        let config = if layout.config_path.exists() {
            Some(inspector_core::db::load_config(&layout)?)
        } else {
            None
        };
        return Ok(LoadedInput { label, digest: sha256_file(path)?, response, config });
    }

    let address = input
        .address
        .as_deref()
        .ok_or_else(|| anyhow!("Provide --address (cached) or --file"))?;
    let root = canonicalize_or_current(&input.root)?;
    let ctx = WorkspaceContext::from_root(&root)?;
    let cached = ctx
        .db
        .get_disassembly(address)
        .with_context(|| format!("Failed to read cached disassembly for {address}"))?
        .ok_or_else(|| anyhow!("No cached disassembly for {address}; run `import` first"))?;

    Ok(LoadedInput {
        label: cached.entry.address,
        digest: cached.entry.digest,
        response: cached.response,
        config: Some(ctx.config),
    })
}

/// Build a session for `loaded`, with filter state from flags, preset and config.
///
/// Explicit flags win over the preset, which wins over the workspace config.
pub fn open_session(loaded: LoadedInput, filter: &FilterArgs) -> Result<InspectorSession> {
    let preset = match &filter.preset {
        Some(path) => FilterPreset::load(Path::new(path))?,
        None => FilterPreset::default(),
    };

    let defaults = preset.filter();
    let node_type = match &filter.node_type {
        Some(tag) => Some(tag.parse::<NodeType>()?),
        None => defaults.node_type,
    };
    let function = filter.function.clone().or(defaults.function);
    let config_default = loaded.config.as_ref().is_some_and(|c| c.show_only_filtered);
    let show_only_filtered =
        filter.only_filtered || preset.show_only_filtered.unwrap_or(config_default);

    let mut session = InspectorSession::new();
    let ticket = session.begin_load(loaded.label.clone());
    match session.complete_load(ticket, loaded.response) {
        Ok(LoadOutcome::Applied) => {}
        Ok(LoadOutcome::Stale) => bail!("Load of {} was superseded", loaded.label),
        Err(err) => {
            return Err(err).with_context(|| format!("Invalid disassembly for {}", loaded.label))
        }
    }
    session.set_filter(GraphFilter::all().with_function(function).with_node_type(node_type));
    session.set_show_only_filtered(show_only_filtered);
    Ok(session)
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}
