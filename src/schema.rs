use std::collections::BTreeMap;
use std::fmt;

use jsonschema::validator_for;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
}

/// Primitive kinds the validator checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
}

impl FieldKind {
    /// Map a JSON Schema `type` keyword to a checked kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(Self::Text),
            "number" => Some(Self::Number),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Array-of-records schema, parsed leniently from a JSON Schema-like value.
///
/// Missing `items`, `properties` or `required` are treated as empty.
/// Properties declared with a kind other than `string`/`number` map to
/// `None` and are never checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub root_kind: Option<String>,
    pub properties: BTreeMap<String, Option<FieldKind>>,
    pub required: Vec<String>,
}

impl Schema {
    pub fn from_value(value: &Value) -> Self {
        let root_kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let items = value.get("items");

        let properties = items
            .and_then(|items| items.get("properties"))
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, decl)| {
                        let kind = decl
                            .get("type")
                            .and_then(Value::as_str)
                            .and_then(FieldKind::from_keyword);
                        (name.clone(), kind)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let required = items
            .and_then(|items| items.get("required"))
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            root_kind,
            properties,
            required,
        }
    }

    /// Whether `name` is declared under `items.properties`.
    pub fn declares(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// The checked kind for `name`, if declared with one.
    pub fn expected_kind(&self, name: &str) -> Option<FieldKind> {
        self.properties.get(name).copied().flatten()
    }
}

/// The schema describing `fileinfo_data.json`.
///
/// `created` is declared but not required.
pub fn fileinfo_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "file_name": {"type": "string"},
                "full_path": {"type": "string"},
                "size": {"type": "number"},
                "created": {"type": "string"},
                "modified": {"type": "string"}
            },
            "required": ["file_name", "full_path", "size", "modified"]
        }
    })
}

/// Compile `schema` with a standard JSON Schema (draft 2020-12) engine.
///
/// Used as a sanity check on schema files; the hand-written validator does
/// not depend on it succeeding.
pub fn compile_check(schema: &Value) -> Result<(), SchemaError> {
    validator_for(schema)
        .map(|_| ())
        .map_err(|e| SchemaError::SchemaCompile(e.to_string()))
}
