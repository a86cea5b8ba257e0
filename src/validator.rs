//! Hand-written validation of a record list against a [`Schema`].
//!
//! The check is exhaustive: every problem found becomes a [`Violation`] and
//! validation always runs to completion. An empty result means the document
//! conforms.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::schema::{FieldKind, Schema};

/// Runtime kind of a JSON value, as reported in type mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Whether a value of this kind satisfies `expected`.
    ///
    /// Booleans count as numbers: `true` and `false` are treated as 1 and 0.
    pub fn satisfies(&self, expected: FieldKind) -> bool {
        match expected {
            FieldKind::Text => *self == Self::String,
            FieldKind::Number => matches!(self, Self::Integer | Self::Float | Self::Boolean),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structural problems that are not about a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// The schema's root `type` is not `"array"`.
    SchemaRootNotArray,
    /// The document is not a JSON array.
    DocumentNotArray,
    /// An array element is not a JSON object.
    RecordNotObject,
}

/// One discrepancy between a document and its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    ShapeError {
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        shape: Shape,
    },
    MissingField {
        index: usize,
        field: String,
    },
    TypeMismatch {
        index: usize,
        field: String,
        expected: FieldKind,
        actual: ValueKind,
    },
}

impl Violation {
    /// Position of the offending record, if the violation concerns one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::ShapeError { index, .. } => *index,
            Self::MissingField { index, .. } | Self::TypeMismatch { index, .. } => Some(*index),
        }
    }

    /// Field name, for field-level violations.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ShapeError { .. } => None,
            Self::MissingField { field, .. } | Self::TypeMismatch { field, .. } => Some(field),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeError { shape, .. } => match shape {
                Shape::SchemaRootNotArray => f.write_str("root must be array per schema"),
                Shape::DocumentNotArray => f.write_str("document must be a list of objects"),
                Shape::RecordNotObject => f.write_str("array element must be an object"),
            },
            Self::MissingField { field, .. } => {
                write!(f, "missing required field '{field}'")
            }
            Self::TypeMismatch {
                field,
                expected,
                actual,
                ..
            } => write!(f, "field '{field}' must be {expected}, got {actual}"),
        }
    }
}

/// Validate `document` against `schema`, collecting every violation.
///
/// Order: schema-root and document-root problems first, then records in
/// ascending index. Within a record, missing required fields (in `required`
/// order) precede type mismatches (in the record's field order).
pub fn validate(document: &Value, schema: &Schema) -> Vec<Violation> {
    let mut violations = Vec::new();

    if schema.root_kind.as_deref() != Some("array") {
        violations.push(Violation::ShapeError {
            index: None,
            shape: Shape::SchemaRootNotArray,
        });
    }

    let records = match document.as_array() {
        Some(records) => records,
        None => {
            violations.push(Violation::ShapeError {
                index: None,
                shape: Shape::DocumentNotArray,
            });
            return violations;
        }
    };

    for (index, record) in records.iter().enumerate() {
        let fields = match record.as_object() {
            Some(fields) => fields,
            None => {
                violations.push(Violation::ShapeError {
                    index: Some(index),
                    shape: Shape::RecordNotObject,
                });
                continue;
            }
        };

        for field in &schema.required {
            if !fields.contains_key(field) {
                violations.push(Violation::MissingField {
                    index,
                    field: field.clone(),
                });
            }
        }

        for (name, value) in fields {
            // Undeclared fields and declared-but-unchecked kinds pass.
            let Some(expected) = schema.expected_kind(name) else {
                continue;
            };
            let actual = ValueKind::of(value);
            if !actual.satisfies(expected) {
                violations.push(Violation::TypeMismatch {
                    index,
                    field: name.clone(),
                    expected,
                    actual,
                });
            }
        }
    }

    violations
}

/// Parse `schema` leniently and validate `document` against it.
pub fn validate_value(document: &Value, schema: &Value) -> Vec<Violation> {
    validate(document, &Schema::from_value(schema))
}
