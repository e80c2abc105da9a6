//! Resolved resource model: definitions validated and flattened for runtime use.

use crate::case::to_camel_case;
use crate::config::{FieldType, ValidationRule};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const ID_COLUMN: &str = "id";
pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// API names the caller may never write.
pub const READ_ONLY_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// One record as returned to clients, keyed by API field name.
pub type Record = Map<String, Value>;

/// The five operations a resource exposes. Used for failure messages and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedField {
    pub name: String,
    pub column: String,
    pub field_type: FieldType,
    pub required: bool,
    pub nullable: bool,
    pub updatable: bool,
    pub filterable: bool,
    pub searchable: bool,
    pub unique: bool,
    pub default: Option<Value>,
    /// Qualified table of the referenced resource, for the foreign key.
    pub references: Option<String>,
    pub validation: ValidationRule,
}

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub name: String,
    pub plural: String,
    /// Capitalised singular used in messages ("Project").
    pub label: String,
    pub schema_name: String,
    pub table_name: String,
    /// Declared field order; drives INSERT and SET ordering.
    pub fields: Vec<ResolvedField>,
}

impl ResolvedResource {
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.column == column)
    }

    /// Client-facing message for a store fault during `op`.
    pub fn failure_message(&self, op: Operation) -> String {
        match op {
            Operation::List => format!("Failed to fetch {}", self.plural),
            Operation::Get => format!("Failed to fetch {}", self.name),
            Operation::Create => format!("Failed to create {}", self.name),
            Operation::Update => format!("Failed to update {}", self.name),
            Operation::Delete => format!("Failed to delete {}", self.name),
        }
    }

    pub fn not_found_message(&self) -> String {
        format!("{} not found", self.label)
    }

    pub fn deleted_message(&self) -> String {
        format!("{} deleted successfully", self.label)
    }

    /// Re-key a raw row (column names) to API names. Unknown columns are camelCased.
    pub fn record_from_row(&self, row: Map<String, Value>) -> Record {
        row.into_iter()
            .map(|(column, value)| {
                let key = self
                    .field_by_column(&column)
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| to_camel_case(&column));
                (key, value)
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub resources: Vec<ResolvedResource>,
    pub resource_by_path: HashMap<String, usize>,
}

impl ResolvedModel {
    pub fn resource_by_path(&self, path: &str) -> Option<&ResolvedResource> {
        self.resource_by_path.get(path).map(|&i| &self.resources[i])
    }
}
