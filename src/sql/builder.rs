//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a resolved resource.

use crate::config::{ResolvedField, ResolvedResource, CREATED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN};
use crate::service::{CreateInput, ListQuery, UpdateInput, MAX_LIST_LIMIT};
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(resource: &ResolvedResource) -> String {
    format!("{}.{}", quoted(&resource.schema_name), quoted(&resource.table_name))
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Push a value and return its placeholder with the column cast, e.g. `$2::text`.
    fn push_cast(&mut self, field: &ResolvedField, v: Value) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, field.field_type.pg_type())
    }
}

/// id, declared fields, then both timestamps.
fn select_column_list(resource: &ResolvedResource) -> String {
    std::iter::once(ID_COLUMN)
        .chain(resource.fields.iter().map(|f| f.column.as_str()))
        .chain([CREATED_AT_COLUMN, UPDATED_AT_COLUMN])
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape LIKE wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// SELECT all records, newest first. With a default `ListQuery` there are no parameters.
pub fn build_list(resource: &ResolvedResource, query: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();

    for (name, val) in &query.filters {
        let Some(field) = resource.field(name).filter(|f| f.filterable) else { continue };
        let ph = q.push_cast(field, val.clone());
        where_parts.push(format!("{} = {}", quoted(&field.column), ph));
    }

    if let Some(term) = &query.search {
        let searchable: Vec<&ResolvedField> = resource.fields.iter().filter(|f| f.searchable).collect();
        if !searchable.is_empty() {
            let n = q.push_param(Value::String(like_pattern(term)));
            let ors: Vec<String> = searchable
                .iter()
                .map(|f| format!("{} ILIKE ${}", quoted(&f.column), n))
                .collect();
            where_parts.push(format!("({})", ors.join(" OR ")));
        }
    }

    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let limit_clause = query
        .limit
        .map(|n| format!(" LIMIT {}", n.min(MAX_LIST_LIMIT)))
        .unwrap_or_default();
    let offset_clause = query.offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();

    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} DESC{}{}",
        select_column_list(resource),
        qualified_table(resource),
        where_clause,
        quoted(CREATED_AT_COLUMN),
        limit_clause,
        offset_clause
    );
    q
}

/// SELECT one record by identifier.
pub fn build_get_by_id(resource: &ResolvedResource, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(resource),
        qualified_table(resource),
        quoted(ID_COLUMN)
    );
    q
}

/// INSERT every create field in declared order; the store assigns id and both timestamps.
pub fn build_create(resource: &ResolvedResource, input: &CreateInput) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (name, val) in input.values() {
        let Some(field) = resource.field(name) else { continue };
        placeholders.push(q.push_cast(field, val.clone()));
        cols.push(quoted(&field.column));
    }
    for ts in [CREATED_AT_COLUMN, UPDATED_AT_COLUMN] {
        cols.push(quoted(ts));
        placeholders.push("NOW()".to_string());
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(resource),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(resource)
    );
    q
}

/// UPDATE by id: id is `$1`, SET placeholders follow contiguously in the order they appear.
pub fn build_update(resource: &ResolvedResource, id: &str, input: &UpdateInput) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(Value::String(id.to_string()));
    let mut sets = Vec::new();
    for (name, val) in input.values() {
        let Some(field) = resource.field(name).filter(|f| f.updatable) else { continue };
        let ph = q.push_cast(field, val.clone());
        sets.push(format!("{} = {}", quoted(&field.column), ph));
    }
    let updated_at = quoted(UPDATED_AT_COLUMN);
    // Strictly increasing even if the database clock steps back.
    sets.push(format!(
        "{} = GREATEST(NOW(), {} + INTERVAL '1 microsecond')",
        updated_at, updated_at
    ));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = $1 RETURNING {}",
        qualified_table(resource),
        sets.join(", "),
        quoted(ID_COLUMN),
        select_column_list(resource)
    );
    q
}

/// DELETE by id, returning only the identifier so "deleted" and "absent" differ.
pub fn build_delete(resource: &ResolvedResource, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1 RETURNING {}",
        qualified_table(resource),
        quoted(ID_COLUMN),
        quoted(ID_COLUMN)
    );
    q
}
