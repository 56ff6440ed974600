use anyhow::{bail, Result};
use inspector_core::format::{BlockListing, Description, InstructionAnnotations, Lookup};
use serde::Serialize;

use crate::commands::{load_input, open_session, FilterArgs, InputArgs};

#[derive(Serialize)]
struct BlockDetail<'a> {
    index: usize,
    function: Option<&'a str>,
    code: &'a str,
    descriptions: &'a [Description],
    annotations: Vec<&'a InstructionAnnotations>,
}

/// Show the code listing and annotation cards of one block.
pub fn block_command(
    input: &InputArgs,
    index: usize,
    filter: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut session = open_session(load_input(input)?, &FilterArgs::default())?;
    if !session.select_block(index) {
        bail!("Block {index} not found");
    }
    let Some(listing) = session.selected_listing() else {
        bail!("Block {index} not found");
    };
    let function = session.selected_block().and_then(|block| block.function.as_deref());

    let detail = BlockDetail {
        index,
        function,
        code: &listing.code,
        descriptions: &listing.descriptions,
        annotations: listing.filter_annotations(filter.unwrap_or("")),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    print_detail(&detail, &listing);
    Ok(())
}

fn print_detail(detail: &BlockDetail<'_>, listing: &BlockListing) {
    println!("Block {} ({})", detail.index, detail.function.unwrap_or("No Function"));
    println!("Code:");
    for line in detail.code.lines() {
        println!("  {line}");
    }

    println!("Annotations:");
    if detail.annotations.is_empty() {
        println!("  (none)");
    }
    for instruction in &detail.annotations {
        let description = listing
            .description(instruction.pc)
            .map(|d| d.text.as_str())
            .filter(|text| !text.is_empty());
        match description {
            Some(text) => println!("  {} {} - {text}", instruction.pc, instruction.name),
            None => println!("  {} {}", instruction.pc, instruction.name),
        }
        for group in &instruction.annotations {
            println!("    {}", group.title);
            for field in &group.annotations {
                println!("      {}: {}", field.title, field.content);
            }
            match group.lookup() {
                Some(Lookup::Event(topic)) => println!("      (event lookup: {topic})"),
                Some(Lookup::Storage(slot)) => println!("      (storage lookup: {slot})"),
                None => {}
            }
        }
    }
}
