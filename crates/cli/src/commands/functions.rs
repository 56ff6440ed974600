use anyhow::{anyhow, Result};
use inspector_core::functions::{Capability, FunctionFilter};
use serde::Serialize;

use crate::commands::{load_input, open_session, FilterArgs, InputArgs};

#[derive(Serialize)]
pub struct FunctionRow {
    pub name: String,
    pub short_name: String,
    pub color: String,
    pub entry_block: Option<i64>,
    pub capabilities: Vec<Capability>,
}

/// List recovered functions, optionally filtered by name and capability.
pub fn functions_command(
    input: &InputArgs,
    name: Option<String>,
    capabilities: &[String],
    json: bool,
) -> Result<()> {
    let mut filter = FunctionFilter::new(name.unwrap_or_default());
    for capability in capabilities {
        filter = filter.with_capability(capability.parse::<Capability>()?);
    }

    let session = open_session(load_input(input)?, &FilterArgs::default())?;
    let derived = session.derived().ok_or_else(|| anyhow!("No disassembly loaded"))?;

    let rows: Vec<FunctionRow> = filter
        .apply(&derived.response.functions)
        .into_iter()
        .map(|overview| {
            let label = derived.functions.get(overview.name());
            FunctionRow {
                name: overview.name().to_string(),
                short_name: label.map(|l| l.name.clone()).unwrap_or_default(),
                color: label.map(|l| l.color.clone()).unwrap_or_default(),
                entry_block: overview.entrypoint.as_ref().map(|e| e.block),
                capabilities: overview.function.capabilities(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No matching functions.");
        return Ok(());
    }

    for row in &rows {
        let entry = row.entry_block.map(|b| format!(" entry block {b}")).unwrap_or_default();
        let caps: Vec<&str> = row.capabilities.iter().map(|c| c.as_str()).collect();
        println!("- {} {}{} [{}]", row.color, row.short_name, entry, caps.join(", "));
        if row.short_name != row.name {
            println!("    {}", row.name);
        }
    }
    Ok(())
}
