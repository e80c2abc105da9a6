//! Request validation: JSON body to typed create/update input over the resource's closed field set.

use crate::config::{ResolvedField, ResolvedResource, ValidationRule, READ_ONLY_FIELDS};
use crate::error::AppError;
use crate::service::{CreateInput, UpdateInput};
use regex::Regex;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Every field in declared order; omitted optional fields take their default or null.
    pub fn create_input(resource: &ResolvedResource, body: &Map<String, Value>) -> Result<CreateInput, AppError> {
        reject_unknown_keys(resource, body)?;
        let mut values = Vec::with_capacity(resource.fields.len());
        for field in &resource.fields {
            let val = match body.get(&field.name) {
                Some(Value::Null) | None if field.required => {
                    return Err(AppError::Validation(format!("{} is required", field.name)));
                }
                Some(Value::Null) | None => field.default.clone().unwrap_or(Value::Null),
                Some(v) => v.clone(),
            };
            validate_field(field, &val)?;
            values.push((field.name.clone(), val));
        }
        Ok(CreateInput::new(values))
    }

    /// Only the fields present in body, which must be non-empty and updatable.
    pub fn update_input(resource: &ResolvedResource, body: &Map<String, Value>) -> Result<UpdateInput, AppError> {
        if body.is_empty() {
            return Err(AppError::Validation("update requires at least one field".into()));
        }
        reject_unknown_keys(resource, body)?;
        let mut values = Vec::with_capacity(body.len());
        for field in &resource.fields {
            let Some(val) = body.get(&field.name) else { continue };
            if !field.updatable {
                return Err(AppError::Validation(format!("{} cannot be updated", field.name)));
            }
            validate_field(field, val)?;
            values.push((field.name.clone(), val.clone()));
        }
        Ok(UpdateInput::new(values))
    }
}

fn reject_unknown_keys(resource: &ResolvedResource, body: &Map<String, Value>) -> Result<(), AppError> {
    for key in body.keys() {
        if READ_ONLY_FIELDS.contains(&key.as_str()) {
            return Err(AppError::Validation(format!("{} is read-only", key)));
        }
        if resource.field(key).is_none() {
            return Err(AppError::Validation(format!("unknown field '{}'", key)));
        }
    }
    Ok(())
}

fn validate_field(field: &ResolvedField, v: &Value) -> Result<(), AppError> {
    let col = field.name.as_str();
    if v.is_null() {
        if field.nullable {
            return Ok(());
        }
        return Err(AppError::Validation(format!("{} cannot be null", col)));
    }
    if !field.field_type.accepts(v) {
        return Err(AppError::Validation(format!(
            "{} must be {}",
            col,
            field.field_type.describe()
        )));
    }
    validate_rule(col, v, &field.validation)
}

fn validate_rule(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if let Some(format) = &rule.format {
        validate_format(col, v, format)?;
    }
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    col, min
                )));
            }
        }
    }
    if let Some(ref pattern) = rule.pattern {
        let re = Regex::new(pattern).map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!("{} does not match required pattern", col)));
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            let names: Vec<String> = allowed
                .iter()
                .map(|a| a.as_str().map(str::to_string).unwrap_or_else(|| a.to_string()))
                .collect();
            return Err(AppError::Validation(format!(
                "{} must be one of: {}",
                col,
                names.join(", ")
            )));
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_f64() {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = v.as_f64() {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(col: &str, v: &Value, format: &str) -> Result<(), AppError> {
    let Some(s) = v.as_str() else { return Ok(()) };
    match format.to_lowercase().as_str() {
        "email" => {
            let valid = s
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'))
                .unwrap_or(false);
            if !valid {
                return Err(AppError::Validation(format!("{} must be a valid email", col)));
            }
        }
        "uuid" => {
            if uuid::Uuid::parse_str(s).is_err() {
                return Err(AppError::Validation(format!("{} must be a valid UUID", col)));
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin_model, ResolvedModel};
    use serde_json::json;

    fn model() -> ResolvedModel {
        builtin_model().unwrap()
    }

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn create_defaults_status_to_draft() {
        let model = model();
        let projects = model.resource_by_path("projects").unwrap();
        let input = RequestValidator::create_input(
            projects,
            &obj(json!({ "title": "A", "description": "d", "studentId": "s1" })),
        )
        .unwrap();
        assert_eq!(input.get("status"), Some(&json!("draft")));
    }

    #[test]
    fn create_requires_required_fields() {
        let model = model();
        let projects = model.resource_by_path("projects").unwrap();
        let err = RequestValidator::create_input(projects, &obj(json!({ "title": "A", "studentId": "s1" }))).unwrap_err();
        assert_eq!(validation_message(err), "description is required");
    }

    #[test]
    fn create_leaves_optional_without_default_null() {
        let model = model();
        let items = model.resource_by_path("items").unwrap();
        let input = RequestValidator::create_input(items, &obj(json!({ "title": "t", "userId": "u1" }))).unwrap();
        assert_eq!(input.get("content"), Some(&Value::Null));
    }

    #[test]
    fn create_rejects_read_only_and_unknown_keys() {
        let model = model();
        let users = model.resource_by_path("users").unwrap();
        let err = RequestValidator::create_input(users, &obj(json!({ "id": "x", "name": "n", "email": "a@b.co" })))
            .unwrap_err();
        assert_eq!(validation_message(err), "id is read-only");
        let err = RequestValidator::create_input(users, &obj(json!({ "nick": "x", "name": "n", "email": "a@b.co" })))
            .unwrap_err();
        assert_eq!(validation_message(err), "unknown field 'nick'");
    }

    #[test]
    fn status_must_be_allowed_value() {
        let model = model();
        let projects = model.resource_by_path("projects").unwrap();
        let err = RequestValidator::update_input(projects, &obj(json!({ "status": "archived" }))).unwrap_err();
        assert_eq!(
            validation_message(err),
            "status must be one of: draft, in_progress, completed"
        );
    }

    #[test]
    fn email_format_is_checked() {
        let model = model();
        let users = model.resource_by_path("users").unwrap();
        let err = RequestValidator::update_input(users, &obj(json!({ "email": "nope" }))).unwrap_err();
        assert_eq!(validation_message(err), "email must be a valid email");
        assert!(RequestValidator::update_input(users, &obj(json!({ "email": "john@example.com" }))).is_ok());
    }

    #[test]
    fn update_rejects_empty_body() {
        let model = model();
        let projects = model.resource_by_path("projects").unwrap();
        let err = RequestValidator::update_input(projects, &Map::new()).unwrap_err();
        assert_eq!(validation_message(err), "update requires at least one field");
    }

    #[test]
    fn update_rejects_non_updatable_and_timestamps() {
        let model = model();
        let projects = model.resource_by_path("projects").unwrap();
        let err = RequestValidator::update_input(projects, &obj(json!({ "studentId": "s2" }))).unwrap_err();
        assert_eq!(validation_message(err), "studentId cannot be updated");
        let err = RequestValidator::update_input(projects, &obj(json!({ "updatedAt": "2024-01-01T00:00:00Z" })))
            .unwrap_err();
        assert_eq!(validation_message(err), "updatedAt is read-only");
    }

    #[test]
    fn update_keeps_declared_order() {
        let model = model();
        let projects = model.resource_by_path("projects").unwrap();
        let input = RequestValidator::update_input(projects, &obj(json!({ "status": "completed", "title": "T" }))).unwrap();
        let names: Vec<&str> = input.values().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["title", "status"]);
    }

    #[test]
    fn type_mismatch_and_null_on_required() {
        let model = model();
        let projects = model.resource_by_path("projects").unwrap();
        let err = RequestValidator::update_input(projects, &obj(json!({ "title": 5 }))).unwrap_err();
        assert_eq!(validation_message(err), "title must be a string");
        let err = RequestValidator::update_input(projects, &obj(json!({ "title": null }))).unwrap_err();
        assert_eq!(validation_message(err), "title cannot be null");
    }

    #[test]
    fn max_length_counts_characters() {
        let model = model();
        let projects = model.resource_by_path("projects").unwrap();
        let long = "é".repeat(256);
        let err = RequestValidator::update_input(projects, &obj(json!({ "title": long }))).unwrap_err();
        assert_eq!(validation_message(err), "title must be at most 255 characters");
    }
}
