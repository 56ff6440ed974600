//! Core data model for disassembly results received from the backend.
//!
//! These types mirror the JSON the backend emits for a single disassembly
//! request: basic blocks with their annotated instructions, control-flow
//! links between blocks, and per-function summaries. They are immutable
//! snapshots; everything the UI renders is derived from them.

pub mod annotation;

use std::fmt;

use serde::de::{Error as _, IgnoredAny};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

pub use annotation::{Annotation, AnnotationError};

/// Operand of a single instruction.
///
/// Push operands arrive as JSON integers of any width (PUSH32 values exceed
/// `u64`) or as hex-encoded strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Int(u64),
    /// Integer literal too wide for `u64`, kept verbatim.
    Wide(String),
    Text(String),
}

impl Operand {
    /// Decode one JSON literal.
    fn from_literal(literal: &str) -> Result<Self, String> {
        let literal = literal.trim();
        if literal.starts_with('"') {
            return serde_json::from_str(literal).map(Operand::Text).map_err(|e| e.to_string());
        }
        if let Ok(value) = literal.parse::<u64>() {
            return Ok(Operand::Int(value));
        }
        match literal.chars().next() {
            Some(first) if first == '-' || first.is_ascii_digit() => {
                Ok(Operand::Wide(literal.to_string()))
            }
            _ => Err(format!("invalid operand {literal}, expected a number or a string")),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(value) => write!(f, "{value}"),
            Operand::Wide(digits) => f.write_str(digits),
            Operand::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for Operand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Operand::Int(value) => serializer.serialize_u64(*value),
            Operand::Wide(digits) => RawValue::from_string(digits.clone())
                .map_err(S::Error::custom)?
                .serialize(serializer),
            Operand::Text(text) => serializer.serialize_str(text),
        }
    }
}

// Read through `RawValue`: a plain number visitor would only see an f64.
impl<'de> Deserialize<'de> for Operand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Operand::from_literal(raw.get()).map_err(D::Error::custom)
    }
}

/// One bytecode instruction. Fee and stack-effect metadata are display-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(rename = "_pc")]
    pub pc: u64,
    #[serde(rename = "_name")]
    pub name: String,
    #[serde(rename = "_opcode", default)]
    pub opcode: Option<u8>,
    #[serde(rename = "_operand", default)]
    pub operand: Option<Operand>,
    #[serde(rename = "_operand_size", default)]
    pub operand_size: Option<u32>,
    #[serde(rename = "_description", default)]
    pub description: String,
    #[serde(rename = "_fee", default)]
    pub fee: Option<u64>,
    #[serde(rename = "_pops", default)]
    pub pops: Option<u32>,
    #[serde(rename = "_pushes", default)]
    pub pushes: Option<u32>,
}

impl Instruction {
    pub fn new(pc: u64, name: impl Into<String>) -> Self {
        Self {
            pc,
            name: name.into(),
            opcode: None,
            operand: None,
            operand_size: None,
            description: String::new(),
            fee: None,
            pops: None,
            pushes: None,
        }
    }

    pub fn with_operand(mut self, operand: Operand) -> Self {
        self.operand = Some(operand);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An instruction paired with the symbolic-execution facts valid at its pc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedInstruction {
    pub instruction: Instruction,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl AnnotatedInstruction {
    pub fn new(instruction: Instruction) -> Self {
        Self { instruction, annotations: Vec::new() }
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }
}

/// One basic block of disassembled code.
///
/// `function` is `None` when the block does not belong to any recovered
/// function. The `'0'` key used by the legend only exists in
/// [`crate::graph::color::FunctionDict`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub i: usize,
    #[serde(default)]
    pub instructions: Vec<AnnotatedInstruction>,
    #[serde(default)]
    pub next: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Block {
    pub fn new(i: usize) -> Self {
        Self {
            i,
            instructions: Vec::new(),
            next: None,
            block_type: None,
            types: Vec::new(),
            function: None,
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_instructions(mut self, instructions: Vec<AnnotatedInstruction>) -> Self {
        self.instructions = instructions;
        self
    }
}

/// Directed control-flow edge between two block indices.
///
/// `condition` is only present on the not-taken branch of a conditional jump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: usize,
    pub target: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<bool>,
}

impl Link {
    pub fn new(source: usize, target: usize) -> Self {
        Self { id: None, source, target, condition: None }
    }

    pub fn not_taken(source: usize, target: usize) -> Self {
        Self { id: None, source, target, condition: Some(false) }
    }
}

/// Static summary of a recovered function.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionSummary {
    pub name: String,
    #[serde(default)]
    pub pcs: Vec<u64>,
    #[serde(default)]
    pub has_writes: bool,
    #[serde(default)]
    pub has_reads: bool,
    #[serde(default)]
    pub has_logs: bool,
    #[serde(default)]
    pub has_calls: bool,
    #[serde(default)]
    pub has_delegate: bool,
    #[serde(default)]
    pub has_creates: bool,
    #[serde(default)]
    pub has_create2s: bool,
    #[serde(default)]
    pub has_selfdestructs: bool,
}

impl FunctionSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

/// Where a function starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub function_name: String,
    pub block: i64,
}

/// Function summary paired with its entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionOverview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<EntryPoint>,
    pub function: FunctionSummary,
}

impl FunctionOverview {
    pub fn new(function: FunctionSummary) -> Self {
        Self { entrypoint: None, function }
    }

    pub fn with_entrypoint(mut self, block: i64) -> Self {
        self.entrypoint =
            Some(EntryPoint { function_name: self.function.name.clone(), block });
        self
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Complete result of one disassembly request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisassemblyResponse {
    pub blocks: Vec<Block>,
    pub links: Vec<Link>,
    #[serde(default)]
    pub functions: Vec<FunctionOverview>,
    #[serde(default)]
    pub coverage: serde_json::Value,
}

impl DisassemblyResponse {
    /// Look up a block by its index `i` (not by position in `blocks`).
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.iter().find(|block| block.i == index)
    }
}

/// Reply sent while a disassembly task is still queued or running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisassemblyStatus {
    pub state: i64,
}

/// Failure reported by the backend task runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    pub message: String,
    pub status: i64,
}

/// Any of the shapes the disassembly endpoint can answer with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BackendReply {
    TaskError { task_error: TaskError },
    Status(DisassemblyStatus),
    Result(DisassemblyResponse),
}

/// Top-level keys that tell the reply shapes apart.
#[derive(Deserialize)]
struct ReplyShape {
    #[serde(default)]
    task_error: Option<IgnoredAny>,
    #[serde(default)]
    state: Option<IgnoredAny>,
}

#[derive(Deserialize)]
struct FailedReply {
    task_error: TaskError,
}

impl BackendReply {
    /// Parse a raw reply body.
    ///
    /// The shape is picked by key first and the body is then decoded
    /// straight from `raw`; wide operands do not survive a buffered pass.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let shape: ReplyShape = serde_json::from_str(raw)?;
        if shape.task_error.is_some() {
            let failed: FailedReply = serde_json::from_str(raw)?;
            return Ok(BackendReply::TaskError { task_error: failed.task_error });
        }
        if shape.state.is_some() {
            return serde_json::from_str(raw).map(BackendReply::Status);
        }
        serde_json::from_str(raw).map(BackendReply::Result)
    }

    pub fn into_result(self) -> Option<DisassemblyResponse> {
        match self {
            BackendReply::Result(response) => Some(response),
            _ => None,
        }
    }
}
