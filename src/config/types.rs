//! Raw resource definition types matching the resource JSON document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column type of a resource field. Decides the SQL cast and the accepted JSON shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Boolean,
    Timestamp,
}

impl FieldType {
    /// PostgreSQL type used for DDL and placeholder casts.
    pub fn pg_type(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "bigint",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "timestamptz",
        }
    }

    /// Whether a non-null JSON value is acceptable for this type.
    pub fn accepts(self, v: &Value) -> bool {
        match self {
            FieldType::Text => v.is_string(),
            FieldType::Integer => v.is_i64(),
            FieldType::Boolean => v.is_boolean(),
            FieldType::Timestamp => v
                .as_str()
                .map(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
                .unwrap_or(false),
        }
    }

    /// Parse a query-string value into this type. `None` when the text is not a value of the type.
    pub fn parse_query(self, s: &str) -> Option<Value> {
        match self {
            FieldType::Text => Some(Value::String(s.to_string())),
            FieldType::Integer => s.parse::<i64>().ok().map(|n| Value::Number(n.into())),
            FieldType::Boolean if s.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
            FieldType::Boolean if s.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
            FieldType::Boolean => None,
            FieldType::Timestamp => {
                let v = Value::String(s.to_string());
                self.accepts(&v).then_some(v)
            }
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            FieldType::Text => "a string",
            FieldType::Integer => "an integer",
            FieldType::Boolean => "a boolean",
            FieldType::Timestamp => "an RFC 3339 timestamp",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    /// API (camelCase) name.
    pub name: String,
    /// Column name; snake_case of `name` when omitted.
    #[serde(default)]
    pub column: Option<String>,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub updatable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub unique: bool,
    /// Value substituted on create when the caller omits the field.
    #[serde(default)]
    pub default: Option<Value>,
    /// Plural of another resource whose id this field holds.
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub validation: ValidationRule,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Singular name, used as the JSON key for one record (e.g. "project").
    pub name: String,
    /// Plural name, used as path segment and list key (e.g. "projects").
    pub plural: String,
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub fields: Vec<FieldConfig>,
}
