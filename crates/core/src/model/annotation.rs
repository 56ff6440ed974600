//! Symbolic-execution annotations attached to instructions.
//!
//! The backend sends each annotation as an envelope
//! `{ "_class": "<Category>", "data": { ... } }`. Known categories decode into
//! their own payload struct; anything else lands in [`Annotation::Unrecognized`]
//! with its payload kept verbatim, so new backend categories still display.
//!
//! Payload fields stay raw JSON values: they may be scalars, symbolic-variable
//! wrappers (`{ "var": ..., "symbolic": ... }`) or nested objects, and are only
//! interpreted when formatted for display.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error raised when a known category carries a payload of the wrong shape.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Malformed {class} annotation payload: {source}")]
    Payload {
        class: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Wire envelope shared by every annotation.
#[derive(Debug, Clone, Deserialize)]
struct RawAnnotation {
    #[serde(rename = "_class")]
    class: String,
    #[serde(default)]
    data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachDef {
    pub reaches: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpTarget {
    pub tags: Value,
    pub target: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantSummary {
    pub tags: Value,
    pub length: Value,
    pub value: Value,
    pub introduced_at: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionEntrypoint {
    pub tags: Value,
    pub function_name: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaDataString {
    pub tags: Value,
    pub raw: Value,
    pub index: Value,
    pub data: Value,
    pub url: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Call {
    pub tags: Value,
    pub to: Value,
    pub gas: Value,
    #[serde(rename = "type")]
    pub call_type: Value,
    pub data: Value,
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `StorageLoad` and `MemoryLoad`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotRead {
    pub tags: Value,
    pub slot: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `StorageWrite` and `MemoryWrite`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotWrite {
    pub tags: Value,
    pub slot: Value,
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    pub tags: Value,
    pub n: Value,
    pub topic0: Value,
    pub topic1: Value,
    pub topic2: Value,
    pub topic3: Value,
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Log {
    pub fn topics(&self) -> [&Value; 4] {
        [&self.topic0, &self.topic1, &self.topic2, &self.topic3]
    }
}

/// Payload of `Return` and `Revert`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnData {
    pub tags: Value,
    pub data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Selfdestruct {
    pub tags: Value,
    pub address: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Calldataload {
    pub tags: Value,
    pub offset: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Calldatacopy {
    pub tags: Value,
    pub length: Value,
    pub mem_addr: Value,
    pub offset: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnconditionalJump {
    pub tags: Value,
    pub to: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionalJump {
    pub tags: Value,
    pub to: Value,
    pub condition: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Push {
    pub tags: Value,
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConstraintFunction {
    pub tags: Value,
    pub address: Value,
    pub condition: Value,
    pub model: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One symbolic-execution fact, keyed by its category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawAnnotation")]
pub enum Annotation {
    ReachDef(ReachDef),
    JumpTarget(JumpTarget),
    ConstantSummary(ConstantSummary),
    FunctionEntrypoint(FunctionEntrypoint),
    MetaDataString(MetaDataString),
    Call(Call),
    StorageLoad(SlotRead),
    StorageWrite(SlotWrite),
    MemoryLoad(SlotRead),
    MemoryWrite(SlotWrite),
    Log(Log),
    Return(ReturnData),
    Revert(ReturnData),
    Selfdestruct(Selfdestruct),
    Calldataload(Calldataload),
    Calldatacopy(Calldatacopy),
    UnconditionalJump(UnconditionalJump),
    ConditionalJump(ConditionalJump),
    Push(Push),
    SenderConstraintFunction(SenderConstraintFunction),
    /// A category this crate does not know; every payload field is kept.
    Unrecognized { class: String, data: Map<String, Value> },
}

fn decode<T: serde::de::DeserializeOwned>(
    class: &str,
    data: Map<String, Value>,
) -> Result<T, AnnotationError> {
    serde_json::from_value(Value::Object(data))
        .map_err(|source| AnnotationError::Payload { class: class.to_string(), source })
}

impl TryFrom<RawAnnotation> for Annotation {
    type Error = AnnotationError;

    fn try_from(raw: RawAnnotation) -> Result<Self, Self::Error> {
        let RawAnnotation { class, data } = raw;
        let annotation = match class.as_str() {
            "ReachDef" => Annotation::ReachDef(decode(&class, data)?),
            "JumpTarget" => Annotation::JumpTarget(decode(&class, data)?),
            "ConstantSummary" => Annotation::ConstantSummary(decode(&class, data)?),
            "FunctionEntrypoint" => Annotation::FunctionEntrypoint(decode(&class, data)?),
            "MetaDataString" => Annotation::MetaDataString(decode(&class, data)?),
            "Call" => Annotation::Call(decode(&class, data)?),
            "StorageLoad" => Annotation::StorageLoad(decode(&class, data)?),
            "StorageWrite" => Annotation::StorageWrite(decode(&class, data)?),
            "MemoryLoad" => Annotation::MemoryLoad(decode(&class, data)?),
            "MemoryWrite" => Annotation::MemoryWrite(decode(&class, data)?),
            "Log" => Annotation::Log(decode(&class, data)?),
            "Return" => Annotation::Return(decode(&class, data)?),
            "Revert" => Annotation::Revert(decode(&class, data)?),
            "Selfdestruct" => Annotation::Selfdestruct(decode(&class, data)?),
            "Calldataload" => Annotation::Calldataload(decode(&class, data)?),
            "Calldatacopy" => Annotation::Calldatacopy(decode(&class, data)?),
            "UnconditionalJump" => Annotation::UnconditionalJump(decode(&class, data)?),
            "ConditionalJump" => Annotation::ConditionalJump(decode(&class, data)?),
            "Push" => Annotation::Push(decode(&class, data)?),
            "SenderConstraintFunction" => {
                Annotation::SenderConstraintFunction(decode(&class, data)?)
            }
            _ => Annotation::Unrecognized { class, data },
        };
        Ok(annotation)
    }
}

impl Annotation {
    /// Build an annotation from its category name and a JSON payload.
    pub fn from_parts(class: impl Into<String>, data: Value) -> Result<Self, AnnotationError> {
        let class = class.into();
        let data = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(AnnotationError::Payload {
                    source: <serde_json::Error as serde::de::Error>::custom(format!(
                        "expected an object, found {other}"
                    )),
                    class,
                })
            }
        };
        Self::try_from(RawAnnotation { class, data })
    }

    /// Category name as sent by the backend.
    pub fn class(&self) -> &str {
        match self {
            Annotation::ReachDef(_) => "ReachDef",
            Annotation::JumpTarget(_) => "JumpTarget",
            Annotation::ConstantSummary(_) => "ConstantSummary",
            Annotation::FunctionEntrypoint(_) => "FunctionEntrypoint",
            Annotation::MetaDataString(_) => "MetaDataString",
            Annotation::Call(_) => "Call",
            Annotation::StorageLoad(_) => "StorageLoad",
            Annotation::StorageWrite(_) => "StorageWrite",
            Annotation::MemoryLoad(_) => "MemoryLoad",
            Annotation::MemoryWrite(_) => "MemoryWrite",
            Annotation::Log(_) => "Log",
            Annotation::Return(_) => "Return",
            Annotation::Revert(_) => "Revert",
            Annotation::Selfdestruct(_) => "Selfdestruct",
            Annotation::Calldataload(_) => "Calldataload",
            Annotation::Calldatacopy(_) => "Calldatacopy",
            Annotation::UnconditionalJump(_) => "UnconditionalJump",
            Annotation::ConditionalJump(_) => "ConditionalJump",
            Annotation::Push(_) => "Push",
            Annotation::SenderConstraintFunction(_) => "SenderConstraintFunction",
            Annotation::Unrecognized { class, .. } => class,
        }
    }
}

impl Serialize for Annotation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("_class", self.class())?;
        match self {
            Annotation::ReachDef(data) => map.serialize_entry("data", data)?,
            Annotation::JumpTarget(data) => map.serialize_entry("data", data)?,
            Annotation::ConstantSummary(data) => map.serialize_entry("data", data)?,
            Annotation::FunctionEntrypoint(data) => map.serialize_entry("data", data)?,
            Annotation::MetaDataString(data) => map.serialize_entry("data", data)?,
            Annotation::Call(data) => map.serialize_entry("data", data)?,
            Annotation::StorageLoad(data) | Annotation::MemoryLoad(data) => {
                map.serialize_entry("data", data)?
            }
            Annotation::StorageWrite(data) | Annotation::MemoryWrite(data) => {
                map.serialize_entry("data", data)?
            }
            Annotation::Log(data) => map.serialize_entry("data", data)?,
            Annotation::Return(data) | Annotation::Revert(data) => {
                map.serialize_entry("data", data)?
            }
            Annotation::Selfdestruct(data) => map.serialize_entry("data", data)?,
            Annotation::Calldataload(data) => map.serialize_entry("data", data)?,
            Annotation::Calldatacopy(data) => map.serialize_entry("data", data)?,
            Annotation::UnconditionalJump(data) => map.serialize_entry("data", data)?,
            Annotation::ConditionalJump(data) => map.serialize_entry("data", data)?,
            Annotation::Push(data) => map.serialize_entry("data", data)?,
            Annotation::SenderConstraintFunction(data) => map.serialize_entry("data", data)?,
            Annotation::Unrecognized { data, .. } => map.serialize_entry("data", data)?,
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_class_decodes_into_its_variant() {
        let annotation: Annotation = serde_json::from_value(json!({
            "_class": "StorageLoad",
            "data": { "tags": {}, "slot": { "var": "x" }, "pc": 12 }
        }))
        .unwrap();

        match annotation {
            Annotation::StorageLoad(load) => {
                assert_eq!(load.slot, json!({ "var": "x" }));
                assert_eq!(load.extra.get("pc"), Some(&json!(12)));
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn unknown_class_keeps_payload_in_order() {
        let annotation: Annotation = serde_json::from_value(json!({
            "_class": "Sha3",
            "data": { "zeta": 1, "alpha": 2 }
        }))
        .unwrap();

        match &annotation {
            Annotation::Unrecognized { class, data } => {
                assert_eq!(class, "Sha3");
                let keys: Vec<&String> = data.keys().collect();
                assert_eq!(keys, ["zeta", "alpha"]);
            }
            other => panic!("unexpected variant {other:?}"),
        }
        assert_eq!(annotation.class(), "Sha3");
    }

    #[test]
    fn missing_data_decodes_to_empty_payload() {
        let annotation: Annotation =
            serde_json::from_value(json!({ "_class": "Return" })).unwrap();
        assert_eq!(annotation, Annotation::Return(ReturnData::default()));
    }

    #[test]
    fn serializes_back_to_envelope() {
        let annotation = Annotation::from_parts("Push", json!({ "value": 96 })).unwrap();
        let value = serde_json::to_value(&annotation).unwrap();
        assert_eq!(value["_class"], "Push");
        assert_eq!(value["data"]["value"], 96);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = Annotation::from_parts("Call", json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("Malformed Call annotation payload"));
    }
}
