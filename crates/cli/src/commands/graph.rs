use std::fs;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use inspector_core::db::WorkspaceLayout;
use inspector_core::graph::color::pretty_function_name;
use inspector_core::graph::{EdgeKind, FunctionDict, GraphElement, LegendEntry, TypeCounts};
use inspector_core::session::{DerivedGraph, InspectorSession};
use serde::Serialize;

use crate::canonicalize_or_current;
use crate::commands::{load_input, open_session, FilterArgs, InputArgs};

fn loaded_graph(session: &InspectorSession) -> Result<&DerivedGraph> {
    session.derived().ok_or_else(|| anyhow!("No disassembly loaded"))
}

fn describe_filter(session: &InspectorSession) -> String {
    let filter = session.filter();
    format!(
        "function={}, type={}, only_filtered={}",
        filter.function.as_deref().unwrap_or("*"),
        filter.node_type.map(|t| t.as_str()).unwrap_or("*"),
        session.show_only_filtered()
    )
}

/// Print the (filtered) graph model.
pub fn graph_command(input: &InputArgs, filter: &FilterArgs, json: bool) -> Result<()> {
    let loaded = load_input(input)?;
    let label = loaded.label.clone();
    let session = open_session(loaded, filter)?;
    let view = session.view().ok_or_else(|| anyhow!("No disassembly loaded"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("Graph for {label}: {} nodes, {} edges", view.nodes.len(), view.edges.len());
    println!("Filter: {}", describe_filter(&session));
    println!("Matched: {} (removed {})", view.matched, view.removed);
    for marked in &view.nodes {
        let node = &marked.node;
        let function = node.function.as_deref().map(pretty_function_name).unwrap_or("-");
        let mark = marked.mark.map(|mark| format!(" {}", mark.as_str())).unwrap_or_default();
        println!("- block {} [{}] {} {}{}", node.id, node.node_type, function, node.color, mark);
    }
    for edge in &view.edges {
        println!("- edge {} {} -> {} ({})", edge.id, edge.source, edge.target, edge.kind.name());
    }
    Ok(())
}

/// Print the type histogram for the function filter.
pub fn types_command(input: &InputArgs, filter: &FilterArgs, json: bool) -> Result<()> {
    let session = open_session(load_input(input)?, filter)?;
    let counts = session.type_counts().ok_or_else(|| anyhow!("No disassembly loaded"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    println!("Block types ({}):", describe_filter(&session));
    for (node_type, count) in counts.non_zero() {
        println!("- {node_type}: {count}");
    }
    Ok(())
}

#[derive(Serialize)]
struct EdgeLegend {
    name: &'static str,
    color: &'static str,
}

#[derive(Serialize)]
struct Legend {
    functions: Vec<LegendEntry>,
    edges: Vec<EdgeLegend>,
}

/// Print function colors and edge colors.
pub fn legend_command(input: &InputArgs, json: bool) -> Result<()> {
    let session = open_session(load_input(input)?, &FilterArgs::default())?;
    let legend = Legend {
        functions: loaded_graph(&session)?.functions.legend(),
        edges: [EdgeKind::TrueCondition, EdgeKind::FalseCondition]
            .into_iter()
            .map(|kind| EdgeLegend { name: kind.name(), color: kind.color() })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&legend)?);
        return Ok(());
    }

    println!("Functions:");
    for entry in &legend.functions {
        match &entry.full_name {
            Some(full) => println!("- {} {} ({full})", entry.color, entry.short_name),
            None => println!("- {} {}", entry.color, entry.short_name),
        }
    }
    println!("Edges:");
    for edge in &legend.edges {
        println!("- {} {}", edge.color, edge.name);
    }
    Ok(())
}

#[derive(Serialize)]
struct GraphExport<'a> {
    address: &'a str,
    functions: &'a FunctionDict,
    elements: Vec<GraphElement<'a>>,
    type_counts: TypeCounts,
}

#[derive(Serialize)]
struct ExportMetadata<'a> {
    address: &'a str,
    input_sha256: &'a str,
    exported_at: String,
    node_count: usize,
    edge_count: usize,
    tool_version: &'static str,
}

/// Write the unfiltered graph model and its metadata under `graphs/`.
pub fn export_command(input: &InputArgs) -> Result<()> {
    let loaded = load_input(input)?;
    let (label, digest) = (loaded.label.clone(), loaded.digest.clone());
    let session = open_session(loaded, &FilterArgs::default())?;
    let derived = loaded_graph(&session)?;

    let layout = WorkspaceLayout::new(canonicalize_or_current(&input.root)?);
    fs::create_dir_all(&layout.graphs_dir)
        .with_context(|| format!("Failed to create graphs dir: {}", layout.graphs_dir.display()))?;

    let export = GraphExport {
        address: &label,
        functions: &derived.functions,
        elements: derived.graph.elements(),
        type_counts: derived.graph.type_counts_for(session.filter()),
    };
    let graph_path = layout.graph_export_path(&label);
    fs::write(&graph_path, serde_json::to_string_pretty(&export)?)
        .with_context(|| format!("Failed to write {}", graph_path.display()))?;

    let meta = ExportMetadata {
        address: &label,
        input_sha256: &digest,
        exported_at: Utc::now().to_rfc3339(),
        node_count: derived.graph.nodes.len(),
        edge_count: derived.graph.edges.len(),
        tool_version: inspector_core::version(),
    };
    let meta_path = layout.graph_meta_path(&label);
    fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
        .with_context(|| format!("Failed to write {}", meta_path.display()))?;

    log::info!("exported {} nodes for {label}", meta.node_count);
    println!("Exported graph to {}", graph_path.display());
    println!("Metadata: {}", meta_path.display());
    Ok(())
}
