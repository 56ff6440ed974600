//! Display formatting of symbolic-execution annotations.
//!
//! Each annotation becomes a titled group of `(label, text)` fields, chosen
//! and ordered per category. Fields whose text is empty are dropped, and a
//! group left without fields is dropped as well.
//!
//! Falsy values (`null`, `false`, `0`, `""`) all render as `"None"`, so a
//! genuine zero is indistinguishable from an absent value. Existing output
//! depends on this, so it is kept as is.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::annotation::{
    Annotation, Call, Calldatacopy, Calldataload, ConditionalJump, ConstantSummary,
    FunctionEntrypoint, JumpTarget, Log, MetaDataString, Push, ReachDef, ReturnData,
    Selfdestruct, SenderConstraintFunction, SlotRead, SlotWrite, UnconditionalJump,
};
use crate::model::{AnnotatedInstruction, Block};

/// Text shown for absent or falsy values.
pub const NONE_TEXT: &str = "None";

/// One displayed field of an annotation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedField {
    pub title: String,
    pub content: String,
}

/// What a detail panel can look up from a formatted group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "lowercase")]
pub enum Lookup {
    /// Event signature lookup keyed by a log's first topic.
    Event(String),
    /// Storage value lookup keyed by a loaded slot.
    Storage(String),
}

/// A titled group of fields, one per annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedAnnotation {
    pub title: String,
    pub annotations: Vec<FormattedField>,
}

impl FormattedAnnotation {
    pub fn field(&self, title: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|field| field.title == title)
            .map(|field| field.content.as_str())
    }

    /// Lookup offered for this group, if any.
    pub fn lookup(&self) -> Option<Lookup> {
        match self.title.as_str() {
            "Log" => self.field("Topic 0").map(|topic| Lookup::Event(topic.to_string())),
            "Storage Load" => self.field("Slot").map(|slot| Lookup::Storage(slot.to_string())),
            _ => None,
        }
    }
}

/// JavaScript-style truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Above 2^53 every `f64` is integral.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Magnitude from which numbers print in exponent form (`1e+21`).
const POSITIONAL_LIMIT: f64 = 1e21;

/// Round half up to two decimals and print without trailing zeros.
fn format_number(n: f64) -> String {
    let rounded =
        if n.abs() >= EXACT_INTEGER_LIMIT { n } else { (n * 100.0 + 0.5).floor() / 100.0 };
    if rounded.abs() >= POSITIONAL_LIMIT {
        return format!("{rounded:e}").replacen('e', "e+", 1);
    }
    format!("{rounded}")
}

/// Stringify one field value for display.
///
/// - falsy values become `"None"`;
/// - objects and arrays are JSON-encoded, empty ones become `""`;
/// - numbers are rounded to two decimals;
/// - anything else uses its plain text form.
pub fn stringify_value(value: &Value) -> String {
    if !is_truthy(value) {
        return NONE_TEXT.to_string();
    }
    match value {
        Value::Object(map) if map.is_empty() => String::new(),
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Object(_) | Value::Array(_) => value.to_string(),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                int.to_string()
            } else if let Some(int) = number.as_u64() {
                int.to_string()
            } else {
                format_number(number.as_f64().unwrap_or_default())
            }
        }
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => NONE_TEXT.to_string(),
    }
}

/// Build a group from `(label, value)` pairs, dropping empty fields.
fn group(title: &str, fields: Vec<(&str, &Value)>) -> Option<FormattedAnnotation> {
    let annotations: Vec<FormattedField> = fields
        .into_iter()
        .filter_map(|(label, value)| {
            let content = stringify_value(value);
            (!content.is_empty())
                .then(|| FormattedField { title: label.to_string(), content })
        })
        .collect();

    if annotations.is_empty() {
        None
    } else {
        Some(FormattedAnnotation { title: title.to_string(), annotations })
    }
}

fn reach_def(data: &ReachDef) -> Option<FormattedAnnotation> {
    group("Reaches", vec![("pcs", &data.reaches)])
}

fn jump_target(data: &JumpTarget) -> Option<FormattedAnnotation> {
    group("Jump Target", vec![("Tags", &data.tags), ("Value", &data.target)])
}

fn constant_summary(data: &ConstantSummary) -> Option<FormattedAnnotation> {
    group(
        "Constant Summary",
        vec![
            ("Tags", &data.tags),
            ("Length", &data.length),
            ("Value", &data.value),
            ("Introduced at", &data.introduced_at),
        ],
    )
}

fn function_entrypoint(data: &FunctionEntrypoint) -> Option<FormattedAnnotation> {
    group("Function Entrypoint", vec![("Tags", &data.tags), ("Name", &data.function_name)])
}

fn meta_data(data: &MetaDataString) -> Option<FormattedAnnotation> {
    group(
        "Meta Data",
        vec![
            ("Tags", &data.tags),
            ("Raw", &data.raw),
            ("Index", &data.index),
            ("Data", &data.data),
            ("url", &data.url),
        ],
    )
}

fn call(data: &Call) -> Option<FormattedAnnotation> {
    group(
        "Call",
        vec![
            ("Tags", &data.tags),
            ("To", &data.to),
            ("Gas", &data.gas),
            ("Type", &data.call_type),
            ("Data", &data.data),
            ("Value", &data.value),
        ],
    )
}

fn slot_read(title: &str, data: &SlotRead) -> Option<FormattedAnnotation> {
    group(title, vec![("Tags", &data.tags), ("Slot", &data.slot)])
}

fn slot_write(title: &str, data: &SlotWrite) -> Option<FormattedAnnotation> {
    group(title, vec![("Tags", &data.tags), ("Slot", &data.slot), ("Value", &data.value)])
}

const TOPIC_TITLES: [&str; 4] = ["Topic 0", "Topic 1", "Topic 2", "Topic 3"];

fn log(data: &Log) -> Option<FormattedAnnotation> {
    // Absent topics are skipped entirely rather than shown as "None".
    let mut fields: Vec<(&str, &Value)> = TOPIC_TITLES
        .into_iter()
        .zip(data.topics())
        .filter(|(_, topic)| is_truthy(topic))
        .collect();
    fields.extend([("Tags", &data.tags), ("Count", &data.n), ("Data", &data.data)]);
    group("Log", fields)
}

fn return_data(title: &str, data: &ReturnData) -> Option<FormattedAnnotation> {
    group(title, vec![("Tags", &data.tags), ("Data", &data.data)])
}

fn selfdestruct(data: &Selfdestruct) -> Option<FormattedAnnotation> {
    group("Selfdestruct", vec![("Tags", &data.tags), ("Address", &data.address)])
}

fn calldataload(data: &Calldataload) -> Option<FormattedAnnotation> {
    group("Calldataload", vec![("Tags", &data.tags), ("Offset", &data.offset)])
}

fn calldatacopy(data: &Calldatacopy) -> Option<FormattedAnnotation> {
    group(
        "Calldatacopy",
        vec![
            ("Tags", &data.tags),
            ("Length", &data.length),
            ("Memory Address", &data.mem_addr),
            ("Offset", &data.offset),
        ],
    )
}

fn unconditional_jump(data: &UnconditionalJump) -> Option<FormattedAnnotation> {
    group("Unconditional Jump", vec![("Tags", &data.tags), ("Target", &data.to)])
}

fn conditional_jump(data: &ConditionalJump) -> Option<FormattedAnnotation> {
    group(
        "Conditional Jump",
        vec![("Tags", &data.tags), ("Target", &data.to), ("Condition", &data.condition)],
    )
}

fn push(data: &Push) -> Option<FormattedAnnotation> {
    group("Push", vec![("Tags", &data.tags), ("Value", &data.value)])
}

fn sender_constraint(data: &SenderConstraintFunction) -> Option<FormattedAnnotation> {
    group(
        "SenderConstraintFunction",
        vec![
            ("Tags", &data.tags),
            ("Address", &data.address),
            ("Condition", &data.condition),
            ("Model", &data.model),
        ],
    )
}

/// Format one annotation, or `None` when nothing in it is worth showing.
pub fn format_annotation(annotation: &Annotation) -> Option<FormattedAnnotation> {
    match annotation {
        Annotation::ReachDef(data) => reach_def(data),
        Annotation::JumpTarget(data) => jump_target(data),
        Annotation::ConstantSummary(data) => constant_summary(data),
        Annotation::FunctionEntrypoint(data) => function_entrypoint(data),
        Annotation::MetaDataString(data) => meta_data(data),
        Annotation::Call(data) => call(data),
        Annotation::StorageLoad(data) => slot_read("Storage Load", data),
        Annotation::StorageWrite(data) => slot_write("Storage Write", data),
        Annotation::MemoryLoad(data) => slot_read("Memory Load", data),
        Annotation::MemoryWrite(data) => slot_write("Memory Write", data),
        Annotation::Log(data) => log(data),
        Annotation::Return(data) => return_data("Return", data),
        Annotation::Revert(data) => return_data("Revert", data),
        Annotation::Selfdestruct(data) => selfdestruct(data),
        Annotation::Calldataload(data) => calldataload(data),
        Annotation::Calldatacopy(data) => calldatacopy(data),
        Annotation::UnconditionalJump(data) => unconditional_jump(data),
        Annotation::ConditionalJump(data) => conditional_jump(data),
        Annotation::Push(data) => push(data),
        Annotation::SenderConstraintFunction(data) => sender_constraint(data),
        Annotation::Unrecognized { class, data } => {
            group(class, data.iter().map(|(key, value)| (key.as_str(), value)).collect())
        }
    }
}

/// Formatted annotation groups of one instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionAnnotations {
    pub pc: u64,
    pub name: String,
    pub annotations: Vec<FormattedAnnotation>,
}

impl InstructionAnnotations {
    /// Format every annotation of `instruction`; `None` if no group survives.
    pub fn from_instruction(instruction: &AnnotatedInstruction) -> Option<Self> {
        let annotations: Vec<FormattedAnnotation> =
            instruction.annotations.iter().filter_map(format_annotation).collect();
        if annotations.is_empty() {
            return None;
        }
        Some(Self {
            pc: instruction.instruction.pc,
            name: instruction.instruction.name.clone(),
            annotations,
        })
    }

    /// Case-insensitive match of `text` against `"{pc} {name}"`.
    pub fn matches_text(&self, text: &str) -> bool {
        format!("{} {}", self.pc, self.name).to_lowercase().contains(&text.to_lowercase())
    }
}

/// Description of the instruction at `pc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub pc: u64,
    pub text: String,
}

/// Everything the block detail panel shows, keyed by pc throughout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockListing {
    /// Plain-text disassembly, one instruction per line.
    pub code: String,
    pub descriptions: Vec<Description>,
    /// Only instructions with at least one displayable group.
    pub annotations: Vec<InstructionAnnotations>,
}

impl BlockListing {
    pub fn from_instructions(instructions: &[AnnotatedInstruction]) -> Self {
        let mut listing = Self::default();
        for annotated in instructions {
            let instruction = &annotated.instruction;
            listing.code.push_str(&format!("{} {}", instruction.pc, instruction.name));
            if let Some(operand) = &instruction.operand {
                listing.code.push_str(&format!(" {operand}"));
            }
            listing.code.push('\n');

            listing
                .descriptions
                .push(Description { pc: instruction.pc, text: instruction.description.clone() });

            if let Some(formatted) = InstructionAnnotations::from_instruction(annotated) {
                listing.annotations.push(formatted);
            }
        }
        listing
    }

    pub fn from_block(block: &Block) -> Self {
        Self::from_instructions(&block.instructions)
    }

    /// Annotation cards whose `"{pc} {name}"` contains `text`, ignoring case.
    pub fn filter_annotations(&self, text: &str) -> Vec<&InstructionAnnotations> {
        self.annotations.iter().filter(|entry| entry.matches_text(text)).collect()
    }

    pub fn description(&self, pc: u64) -> Option<&Description> {
        self.descriptions.iter().find(|description| description.pc == pc)
    }

    pub fn annotations_at(&self, pc: u64) -> Option<&InstructionAnnotations> {
        self.annotations.iter().find(|entry| entry.pc == pc)
    }
}
