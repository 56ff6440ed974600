use inspector_core::format::{
    format_annotation, stringify_value, BlockListing, FormattedField, Lookup,
};
use inspector_core::model::{AnnotatedInstruction, Annotation, Block, Instruction, Operand};
use serde_json::json;

fn annotation(class: &str, data: serde_json::Value) -> Annotation {
    Annotation::from_parts(class, data).expect("valid annotation")
}

fn titles(fields: &[FormattedField]) -> Vec<&str> {
    fields.iter().map(|field| field.title.as_str()).collect()
}

#[test]
fn storage_load_drops_empty_tags() {
    let group = format_annotation(&annotation(
        "StorageLoad",
        json!({ "tags": {}, "slot": { "var": "x" } }),
    ))
    .expect("group");

    assert_eq!(group.title, "Storage Load");
    assert_eq!(group.annotations.len(), 1);
    assert_eq!(group.annotations[0].title, "Slot");
    assert_eq!(group.annotations[0].content, r#"{"var":"x"}"#);
}

#[test]
fn group_with_only_empty_fields_is_dropped() {
    assert_eq!(format_annotation(&annotation("Push", json!({ "tags": {}, "value": [] }))), None);
    assert_eq!(format_annotation(&annotation("ReachDef", json!({ "reaches": {} }))), None);
}

#[test]
fn absent_fields_render_as_none() {
    let group = format_annotation(&annotation("Calldataload", json!({}))).expect("group");
    assert_eq!(titles(&group.annotations), vec!["Tags", "Offset"]);
    assert!(group.annotations.iter().all(|field| field.content == "None"));
}

#[test]
fn log_skips_missing_topics() {
    let group = format_annotation(&annotation(
        "Log",
        json!({ "topic0": "0xddf2", "topic2": "0xabcd", "tags": ["transfer"], "n": 2, "data": "0x" }),
    ))
    .expect("group");

    assert_eq!(group.title, "Log");
    assert_eq!(titles(&group.annotations), vec!["Topic 0", "Topic 2", "Tags", "Count", "Data"]);
    assert_eq!(group.field("Tags"), Some(r#"["transfer"]"#));
    assert_eq!(group.field("Count"), Some("2"));
    assert_eq!(group.lookup(), Some(Lookup::Event("0xddf2".to_string())));
}

#[test]
fn storage_load_offers_storage_lookup() {
    let group =
        format_annotation(&annotation("StorageLoad", json!({ "slot": "0x01" }))).expect("group");
    assert_eq!(group.lookup(), Some(Lookup::Storage("0x01".to_string())));

    let write = format_annotation(&annotation("StorageWrite", json!({ "slot": "0x01" })))
        .expect("group");
    assert_eq!(write.lookup(), None);
}

#[test]
fn numbers_are_rounded_and_zero_is_none() {
    assert_eq!(stringify_value(&json!(3.14159)), "3.14");
    assert_eq!(stringify_value(&json!(2.5)), "2.5");
    assert_eq!(stringify_value(&json!(42)), "42");
    assert_eq!(stringify_value(&json!(0)), "None");
    assert_eq!(stringify_value(&json!(false)), "None");
    assert_eq!(stringify_value(&json!("")), "None");
    assert_eq!(stringify_value(&json!(null)), "None");
    assert_eq!(stringify_value(&json!(true)), "true");
    assert_eq!(stringify_value(&json!({})), "");
    assert_eq!(stringify_value(&json!([1, 2])), "[1,2]");
}

#[test]
fn every_category_uses_its_title_and_field_order() {
    let cases = [
        ("ReachDef", "Reaches", vec!["pcs"]),
        ("JumpTarget", "Jump Target", vec!["Tags", "Value"]),
        ("ConstantSummary", "Constant Summary", vec!["Tags", "Length", "Value", "Introduced at"]),
        ("FunctionEntrypoint", "Function Entrypoint", vec!["Tags", "Name"]),
        ("MetaDataString", "Meta Data", vec!["Tags", "Raw", "Index", "Data", "url"]),
        ("Call", "Call", vec!["Tags", "To", "Gas", "Type", "Data", "Value"]),
        ("StorageLoad", "Storage Load", vec!["Tags", "Slot"]),
        ("StorageWrite", "Storage Write", vec!["Tags", "Slot", "Value"]),
        ("MemoryLoad", "Memory Load", vec!["Tags", "Slot"]),
        ("MemoryWrite", "Memory Write", vec!["Tags", "Slot", "Value"]),
        ("Return", "Return", vec!["Tags", "Data"]),
        ("Revert", "Revert", vec!["Tags", "Data"]),
        ("Selfdestruct", "Selfdestruct", vec!["Tags", "Address"]),
        ("Calldataload", "Calldataload", vec!["Tags", "Offset"]),
        ("Calldatacopy", "Calldatacopy", vec!["Tags", "Length", "Memory Address", "Offset"]),
        ("UnconditionalJump", "Unconditional Jump", vec!["Tags", "Target"]),
        ("ConditionalJump", "Conditional Jump", vec!["Tags", "Target", "Condition"]),
        ("Push", "Push", vec!["Tags", "Value"]),
        (
            "SenderConstraintFunction",
            "SenderConstraintFunction",
            vec!["Tags", "Address", "Condition", "Model"],
        ),
    ];

    for (class, title, fields) in cases {
        // Empty payload: every selected field renders as "None" and survives.
        let group = format_annotation(&annotation(class, json!({}))).expect(class);
        assert_eq!(group.title, title, "title of {class}");
        assert_eq!(titles(&group.annotations), fields, "fields of {class}");
    }
}

#[test]
fn call_type_field_reads_type_key() {
    let group = format_annotation(&annotation(
        "Call",
        json!({ "to": "0xbeef", "gas": 2300, "type": "DELEGATECALL", "value": 0.125 }),
    ))
    .expect("group");

    assert_eq!(group.field("To"), Some("0xbeef"));
    assert_eq!(group.field("Gas"), Some("2300"));
    assert_eq!(group.field("Type"), Some("DELEGATECALL"));
    assert_eq!(group.field("Value"), Some("0.13"));
}

#[test]
fn unrecognized_category_dumps_payload_in_order() {
    let group = format_annotation(&annotation(
        "Sha3",
        json!({ "zeta": "z", "alpha": 1, "empty": {} }),
    ))
    .expect("group");

    assert_eq!(group.title, "Sha3");
    assert_eq!(titles(&group.annotations), vec!["zeta", "alpha"]);
}

fn sample_block() -> Block {
    Block::new(4).with_instructions(vec![
        AnnotatedInstruction::new(
            Instruction::new(10, "PUSH1").with_operand(Operand::Int(96)).with_description("push"),
        )
        .with_annotations(vec![annotation("Push", json!({ "value": 96 }))]),
        AnnotatedInstruction::new(Instruction::new(12, "SLOAD").with_description("load slot"))
            .with_annotations(vec![annotation("StorageLoad", json!({ "tags": {}, "slot": {} }))]),
        AnnotatedInstruction::new(Instruction::new(13, "LOG1"))
            .with_annotations(vec![annotation("Log", json!({ "topic0": "0xaa" }))]),
    ])
}

#[test]
fn block_listing_keeps_pc_alignment() {
    let listing = BlockListing::from_block(&sample_block());

    assert_eq!(listing.code, "10 PUSH1 96\n12 SLOAD\n13 LOG1\n");
    let pcs: Vec<u64> = listing.descriptions.iter().map(|d| d.pc).collect();
    assert_eq!(pcs, vec![10, 12, 13]);
    assert_eq!(listing.description(12).map(|d| d.text.as_str()), Some("load slot"));

    // The SLOAD annotation has nothing to show, so its instruction is skipped.
    let annotated: Vec<u64> = listing.annotations.iter().map(|a| a.pc).collect();
    assert_eq!(annotated, vec![10, 13]);
    assert!(listing.annotations_at(12).is_none());
    assert_eq!(listing.annotations_at(10).map(|a| a.name.as_str()), Some("PUSH1"));
}

#[test]
fn annotation_filter_matches_pc_and_name_case_insensitively() {
    let listing = BlockListing::from_block(&sample_block());

    let by_name: Vec<u64> = listing.filter_annotations("log").iter().map(|a| a.pc).collect();
    assert_eq!(by_name, vec![13]);

    let by_pc: Vec<u64> = listing.filter_annotations("10 pu").iter().map(|a| a.pc).collect();
    assert_eq!(by_pc, vec![10]);

    assert_eq!(listing.filter_annotations("").len(), 2);
    assert!(listing.filter_annotations("sstore").is_empty());
}
