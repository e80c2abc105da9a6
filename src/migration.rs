//! Apply the resource model to the database: one table per resource, created if missing.
//! Resources are created in declared order, so referenced tables already exist.

use crate::config::{FieldType, ResolvedModel, ResolvedResource, CREATED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN};
use crate::error::AppError;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::BTreeSet;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn quote_qualified(qualified: &str) -> String {
    qualified.split('.').map(quote).collect::<Vec<_>>().join(".")
}

fn literal(v: &Value) -> String {
    match v {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Bool(b) => b.to_string().to_uppercase(),
        other => other.to_string(),
    }
}

fn table_ddl(resource: &ResolvedResource) -> String {
    let table = format!("{}.{}", quote(&resource.schema_name), quote(&resource.table_name));
    let mut col_defs = vec![format!(
        "{} TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text",
        quote(ID_COLUMN)
    )];
    for f in &resource.fields {
        let mut def = format!("{} {}", quote(&f.column), f.field_type.pg_type().to_uppercase());
        if !f.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(d) = &f.default {
            def.push_str(" DEFAULT ");
            def.push_str(&literal(d));
        }
        if f.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(target) = &f.references {
            def.push_str(&format!(
                " REFERENCES {} ({}) ON DELETE CASCADE",
                quote_qualified(target),
                quote(ID_COLUMN)
            ));
        }
        if let (Some(allowed), FieldType::Text) = (&f.validation.allowed, f.field_type) {
            let values: Vec<String> = allowed.iter().map(literal).collect();
            def.push_str(&format!(" CHECK ({} IN ({}))", quote(&f.column), values.join(", ")));
        }
        col_defs.push(def);
    }
    col_defs.push(format!("{} TIMESTAMPTZ NOT NULL DEFAULT NOW()", quote(CREATED_AT_COLUMN)));
    col_defs.push(format!("{} TIMESTAMPTZ NOT NULL DEFAULT NOW()", quote(UPDATED_AT_COLUMN)));
    col_defs.push(format!(
        "CHECK ({} >= {})",
        quote(UPDATED_AT_COLUMN),
        quote(CREATED_AT_COLUMN)
    ));
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        table,
        col_defs.join(",\n    ")
    )
}

/// DDL for the model: schemas, then tables in declared order, then the list-order index per table.
pub fn migration_statements(model: &ResolvedModel) -> Vec<String> {
    let schemas: BTreeSet<&str> = model.resources.iter().map(|r| r.schema_name.as_str()).collect();
    let mut out: Vec<String> = schemas
        .into_iter()
        .map(|s| format!("CREATE SCHEMA IF NOT EXISTS {}", quote(s)))
        .collect();
    for r in &model.resources {
        out.push(table_ddl(r));
        out.push(format!(
            "CREATE INDEX IF NOT EXISTS {} ON {}.{} ({} DESC)",
            quote(&format!("{}_{}_idx", r.table_name, CREATED_AT_COLUMN)),
            quote(&r.schema_name),
            quote(&r.table_name),
            quote(CREATED_AT_COLUMN)
        ));
    }
    out
}

/// Create missing schemas, tables and indexes. Existing tables are left untouched.
pub async fn apply_migrations(pool: &PgPool, model: &ResolvedModel) -> Result<(), AppError> {
    for sql in migration_statements(model) {
        tracing::debug!(sql = %sql, "migration");
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::info!(tables = model.resources.len(), "migrations applied");
    Ok(())
}
