//! Resource definition validation: identifiers, uniqueness, references, defaults.

use crate::case::to_snake_case;
use crate::config::resolved::READ_ONLY_FIELDS;
use crate::config::{FieldType, ResourceConfig};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

fn identifier_re() -> Regex {
    Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("static regex")
}

fn field_name_re() -> Regex {
    Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("static regex")
}

fn check_identifier(re: &Regex, kind: &str, s: &str) -> Result<(), ConfigError> {
    if re.is_match(s) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("invalid {} identifier: '{}'", kind, s)))
    }
}

pub fn validate(resources: &[ResourceConfig]) -> Result<(), ConfigError> {
    if resources.is_empty() {
        return Err(ConfigError::Validation("at least one resource required".into()));
    }
    let ident = identifier_re();
    let field_re = field_name_re();
    let mut names = HashSet::new();
    let mut plurals = HashSet::new();
    let mut tables = HashSet::new();
    // Resources declared so far; references may only point backwards so tables are created in order.
    let mut declared: HashSet<&str> = HashSet::new();

    for r in resources {
        check_identifier(&ident, "resource", &r.name)?;
        check_identifier(&ident, "resource plural", &r.plural)?;
        check_identifier(&ident, "table", &r.table)?;
        if let Some(schema) = &r.schema {
            check_identifier(&ident, "schema", schema)?;
        }
        if !names.insert(r.name.as_str()) {
            return Err(ConfigError::Duplicate { kind: "resource name", name: r.name.clone() });
        }
        if !plurals.insert(r.plural.as_str()) {
            return Err(ConfigError::Duplicate { kind: "resource plural", name: r.plural.clone() });
        }
        let qualified = format!("{}.{}", r.schema.as_deref().unwrap_or("public"), r.table);
        if !tables.insert(qualified.clone()) {
            return Err(ConfigError::Duplicate { kind: "table", name: qualified });
        }

        let mut field_names = HashSet::new();
        let mut columns = HashSet::new();
        for f in &r.fields {
            if READ_ONLY_FIELDS.contains(&f.name.as_str()) {
                return Err(ConfigError::ReservedField { resource: r.name.clone(), field: f.name.clone() });
            }
            check_identifier(&field_re, "field", &f.name)?;
            let column = f.column.clone().unwrap_or_else(|| to_snake_case(&f.name));
            check_identifier(&ident, "column", &column)?;
            if ["id", "created_at", "updated_at"].contains(&column.as_str()) {
                return Err(ConfigError::ReservedField { resource: r.name.clone(), field: column });
            }
            if !field_names.insert(f.name.as_str()) {
                return Err(ConfigError::Duplicate {
                    kind: "field",
                    name: format!("{}.{}", r.name, f.name),
                });
            }
            if !columns.insert(column.clone()) {
                return Err(ConfigError::Duplicate {
                    kind: "column",
                    name: format!("{}.{}", r.table, column),
                });
            }
            if f.searchable && f.type_ != FieldType::Text {
                return Err(ConfigError::Validation(format!(
                    "{}.{} is searchable but not text",
                    r.name, f.name
                )));
            }
            if let Some(default) = &f.default {
                if default.is_null() || !f.type_.accepts(default) {
                    return Err(ConfigError::Validation(format!(
                        "default for {}.{} must be {}",
                        r.name,
                        f.name,
                        f.type_.describe()
                    )));
                }
            }
            if let Some(target) = &f.references {
                if !declared.contains(target.as_str()) {
                    return Err(ConfigError::MissingReference {
                        kind: "resource",
                        id: target.clone(),
                    });
                }
            }
            if let Some(pattern) = &f.validation.pattern {
                Regex::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!("invalid pattern for {}.{}: {}", r.name, f.name, e))
                })?;
            }
        }
        declared.insert(r.plural.as_str());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: serde_json::Value) -> Vec<ResourceConfig> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn rejects_duplicate_plural() {
        let resources = parse(json!([
            { "name": "a", "plural": "things", "table": "a", "fields": [] },
            { "name": "b", "plural": "things", "table": "b", "fields": [] }
        ]));
        assert!(matches!(validate(&resources), Err(ConfigError::Duplicate { kind: "resource plural", .. })));
    }

    #[test]
    fn rejects_reserved_field() {
        let resources = parse(json!([
            { "name": "a", "plural": "as", "table": "a",
              "fields": [{ "name": "createdAt", "type": "timestamp" }] }
        ]));
        assert!(matches!(validate(&resources), Err(ConfigError::ReservedField { .. })));
    }

    #[test]
    fn references_must_point_to_earlier_resource() {
        let resources = parse(json!([
            { "name": "item", "plural": "items", "table": "items",
              "fields": [{ "name": "userId", "type": "text", "references": "users" }] },
            { "name": "user", "plural": "users", "table": "users", "fields": [] }
        ]));
        assert!(matches!(validate(&resources), Err(ConfigError::MissingReference { .. })));
    }

    #[test]
    fn default_must_match_type() {
        let resources = parse(json!([
            { "name": "a", "plural": "as", "table": "a",
              "fields": [{ "name": "count", "type": "integer", "default": "zero" }] }
        ]));
        assert!(matches!(validate(&resources), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn searchable_fields_must_be_text() {
        let resources = parse(json!([
            { "name": "thing", "plural": "things", "table": "things",
              "fields": [{ "name": "count", "type": "integer", "searchable": true }] }
        ]));
        let err = validate(&resources).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m == "thing.count is searchable but not text"));

        let resources = parse(json!([
            { "name": "thing", "plural": "things", "table": "things",
              "fields": [{ "name": "label", "type": "text", "searchable": true }] }
        ]));
        assert!(validate(&resources).is_ok());
    }

    #[test]
    fn rejects_unsafe_table_name() {
        let resources = parse(json!([
            { "name": "a", "plural": "as", "table": "a; DROP TABLE x", "fields": [] }
        ]));
        assert!(validate(&resources).is_err());
    }
}
