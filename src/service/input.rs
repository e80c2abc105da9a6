//! Typed inputs for the query builder. Create and update inputs are only built by `RequestValidator`.

use crate::config::ResolvedResource;
use crate::error::AppError;
use serde_json::Value;
use std::collections::HashMap;

pub const MAX_LIST_LIMIT: u32 = 1000;

/// Values for every creatable field, in declared order, defaults already substituted.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateInput {
    values: Vec<(String, Value)>,
}

impl CreateInput {
    pub(crate) fn new(values: Vec<(String, Value)>) -> Self {
        CreateInput { values }
    }

    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }
}

/// Non-empty set of updatable fields, in declared order.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateInput {
    values: Vec<(String, Value)>,
}

impl UpdateInput {
    pub(crate) fn new(values: Vec<(String, Value)>) -> Self {
        UpdateInput { values }
    }

    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }
}

/// Optional narrowing of a list: exact-match filters, text search, pagination.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<(String, Value)>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListQuery {
    /// Build from query-string parameters. Unknown keys, non-filterable fields and
    /// unparseable paging values are ignored; a filter value of the wrong type is a bad request.
    pub fn from_params(resource: &ResolvedResource, params: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut q = ListQuery::default();
        // Declared field order keeps the generated SQL stable regardless of map order.
        for field in resource.fields.iter().filter(|f| f.filterable) {
            if let Some(raw) = params.get(&field.name) {
                let value = field.field_type.parse_query(raw).ok_or_else(|| {
                    AppError::BadRequest(format!("{} must be {}", field.name, field.field_type.describe()))
                })?;
                q.filters.push((field.name.clone(), value));
            }
        }
        q.search = params
            .get("search")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        q.limit = params
            .get("limit")
            .and_then(|v| v.parse::<u32>().ok())
            .map(|n| n.min(MAX_LIST_LIMIT));
        q.offset = params.get("offset").and_then(|v| v.parse().ok());
        Ok(q)
    }
}
