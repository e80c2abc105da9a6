//! Load resource definitions from the built-in document or a JSON file, and resolve them.

use crate::case::to_snake_case;
use crate::config::resolved::{ResolvedField, ResolvedModel, ResolvedResource};
use crate::config::{validate, ResourceConfig};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_RESOURCES: &str = include_str!("resources.json");

const DEFAULT_SCHEMA: &str = "public";

/// Parse a resource definition document.
pub fn parse_resources(json: &str) -> Result<Vec<ResourceConfig>, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

/// The users, projects and items definitions shipped with the crate.
pub fn builtin_resources() -> Result<Vec<ResourceConfig>, ConfigError> {
    parse_resources(BUILTIN_RESOURCES)
}

pub fn builtin_model() -> Result<ResolvedModel, ConfigError> {
    resolve(&builtin_resources()?)
}

/// Read a resource definition document from disk.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<ResourceConfig>, ConfigError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse_resources(&text)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the resolved model from definitions (validates first).
pub fn resolve(resources: &[ResourceConfig]) -> Result<ResolvedModel, ConfigError> {
    validate(resources)?;

    let qualified_by_plural: HashMap<&str, String> = resources
        .iter()
        .map(|r| {
            let schema = r.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
            (r.plural.as_str(), format!("{}.{}", schema, r.table))
        })
        .collect();

    let mut out = Vec::with_capacity(resources.len());
    let mut resource_by_path = HashMap::new();
    for r in resources {
        let fields = r
            .fields
            .iter()
            .map(|f| -> Result<ResolvedField, ConfigError> {
                let references = match &f.references {
                    Some(target) => Some(
                        qualified_by_plural
                            .get(target.as_str())
                            .cloned()
                            .ok_or_else(|| ConfigError::MissingReference {
                                kind: "resource",
                                id: target.clone(),
                            })?,
                    ),
                    None => None,
                };
                Ok(ResolvedField {
                    name: f.name.clone(),
                    column: f.column.clone().unwrap_or_else(|| to_snake_case(&f.name)),
                    field_type: f.type_,
                    required: f.required,
                    nullable: !f.required && f.default.is_none(),
                    updatable: f.updatable,
                    filterable: f.filterable,
                    searchable: f.searchable,
                    unique: f.unique,
                    default: f.default.clone(),
                    references,
                    validation: f.validation.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        resource_by_path.insert(r.plural.clone(), out.len());
        out.push(ResolvedResource {
            name: r.name.clone(),
            plural: r.plural.clone(),
            label: capitalize(&r.name),
            schema_name: r.schema.clone().unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
            table_name: r.table.clone(),
            fields,
        });
    }

    tracing::debug!(resources = out.len(), "resolved resource model");
    Ok(ResolvedModel {
        resources: out,
        resource_by_path,
    })
}
