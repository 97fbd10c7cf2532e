//! Declarative record shapes.
//!
//! A [`Shape`] lists the fields of a record with their kind and whether they
//! are required. The same value validates incoming JSON and renders the JSON
//! Schema published in the OpenAPI document.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};
use voyage_db::Document;

/// Kind of value a field accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    /// JSON number without a fractional part that fits in an `i64`.
    Integer,
    Number,
    Boolean,
    Object(Shape),
    Array(Box<FieldKind>),
}

impl FieldKind {
    pub fn array(item: FieldKind) -> Self {
        FieldKind::Array(Box::new(item))
    }

    /// JSON Schema `type` name.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object(_) => "object",
            FieldKind::Array(_) => "array",
        }
    }

    pub fn json_schema(&self) -> Value {
        match self {
            FieldKind::Object(shape) => shape.json_schema(),
            FieldKind::Array(item) => json!({ "type": "array", "items": item.json_schema() }),
            scalar => json!({ "type": scalar.type_name() }),
        }
    }

    fn check(&self, value: &Value, path: &str, violations: &mut Vec<Violation>) {
        let accepted = match (self, value) {
            (FieldKind::String, Value::String(_)) => true,
            (FieldKind::Integer, Value::Number(n)) => n.is_i64(),
            (FieldKind::Number, Value::Number(_)) => true,
            (FieldKind::Boolean, Value::Bool(_)) => true,
            (FieldKind::Object(shape), Value::Object(map)) => {
                shape.check_object(map, path, violations);
                true
            }
            (FieldKind::Array(item), Value::Array(items)) => {
                for (pos, element) in items.iter().enumerate() {
                    item.check(element, &format!("{path}[{pos}]"), violations);
                }
                true
            }
            _ => false,
        };

        if !accepted {
            violations.push(Violation {
                field: path.to_string(),
                kind: ViolationKind::WrongType {
                    expected: self.type_name(),
                    found: json_type(value),
                },
            });
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn not_an_object(value: &Value) -> Violation {
    Violation {
        field: "$".to_string(),
        kind: ViolationKind::WrongType {
            expected: "object",
            found: json_type(value),
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: Option<&'static str>,
}

/// Ordered, closed set of fields. Undeclared fields are violations.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    name: String,
    fields: Vec<Field>,
}

impl Shape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn required(self, name: &'static str, kind: FieldKind) -> Self {
        self.with_field(name, kind, true)
    }

    pub fn optional(self, name: &'static str, kind: FieldKind) -> Self {
        self.with_field(name, kind, false)
    }

    /// Attach a description to the most recently added field.
    pub fn describe(mut self, description: &'static str) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.description = Some(description);
        }
        self
    }

    fn with_field(mut self, name: &'static str, kind: FieldKind, required: bool) -> Self {
        self.fields.retain(|field| field.name != name);
        self.fields.push(Field {
            name,
            kind,
            required,
            description: None,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn renamed(&self, name: impl Into<String>) -> Shape {
        Shape {
            name: name.into(),
            fields: self.fields.clone(),
        }
    }

    /// Same fields with `field` placed first, under a new name.
    pub fn prepend(&self, name: impl Into<String>, field: Field) -> Shape {
        let mut fields = vec![field.clone()];
        fields.extend(self.fields.iter().filter(|f| f.name != field.name).cloned());
        Shape {
            name: name.into(),
            fields,
        }
    }

    /// Same fields, every one optional. Nested shapes keep their own markers.
    pub fn partial(&self, name: impl Into<String>) -> Shape {
        Shape {
            name: name.into(),
            fields: self
                .fields
                .iter()
                .cloned()
                .map(|field| Field {
                    required: false,
                    ..field
                })
                .collect(),
        }
    }

    /// Check `value` and report every violation found, not just the first.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        match value {
            Value::Object(map) => self.check_object(map, "", &mut violations),
            other => violations.push(not_an_object(other)),
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    pub fn validate_document(&self, document: &Document) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        self.check_object(document, "", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Validate a request body and hand it back as a document.
    pub fn accept(&self, value: Value) -> Result<Document, Vec<Violation>> {
        self.validate(&value)?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(vec![not_an_object(&other)]),
        }
    }

    fn check_object(
        &self,
        map: &Map<String, Value>,
        prefix: &str,
        violations: &mut Vec<Violation>,
    ) {
        let path = |name: &str| {
            if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            }
        };

        for field in &self.fields {
            match map.get(field.name) {
                Some(value) => field.kind.check(value, &path(field.name), violations),
                None if field.required => violations.push(Violation {
                    field: path(field.name),
                    kind: ViolationKind::Missing,
                }),
                None => {}
            }
        }

        for key in map.keys() {
            if self.field(key).is_none() {
                violations.push(Violation {
                    field: path(key),
                    kind: ViolationKind::Unknown,
                });
            }
        }
    }

    /// Inline JSON Schema for this shape.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut schema = field.kind.json_schema();
            if let (Some(description), Some(object)) = (field.description, schema.as_object_mut()) {
                object.insert("description".to_string(), json!(description));
            }
            properties.insert(field.name.to_string(), schema);
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name)
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }
}

/// One failed constraint, addressed by a dotted path (`price.eur`, `tags[1]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    Unknown,
    /// Well-typed but not representable by the record type.
    Rejected(String),
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Missing => write!(f, "is required"),
            ViolationKind::WrongType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ViolationKind::Unknown => write!(f, "is not a declared field"),
            ViolationKind::Rejected(reason) => write!(f, "cannot be stored: {reason}"),
        }
    }
}

#[derive(Serialize)]
struct ViolationDetail<'a> {
    field: &'a str,
    error: String,
}

impl Violation {
    /// `{"field": ..., "error": ...}` entry for error responses.
    pub fn detail(&self) -> Value {
        serde_json::to_value(ViolationDetail {
            field: &self.field,
            error: self.kind.to_string(),
        })
        .unwrap_or(Value::Null)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.kind)
    }
}
