//! Generic CRUD execution through an injected `Store`.

use crate::config::{Record, ResolvedResource};
use crate::error::AppError;
use crate::service::{CreateInput, ListQuery, UpdateInput};
use crate::sql::{build_create, build_delete, build_get_by_id, build_list, build_update};
use crate::store::Store;
use std::sync::Arc;

/// Executes one statement per operation and adapts rows to records.
/// Holds no state beyond the store handle; nothing is cached between calls.
#[derive(Clone)]
pub struct CrudService {
    store: Arc<dyn Store>,
}

fn require_id(id: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::Validation("id must not be empty".into()));
    }
    Ok(())
}

impl CrudService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        CrudService { store }
    }

    /// All records, newest first, narrowed by `query`.
    pub async fn list(&self, resource: &ResolvedResource, query: &ListQuery) -> Result<Vec<Record>, AppError> {
        let q = build_list(resource, query);
        let rows = self.store.fetch_all(&q).await?;
        Ok(rows.into_iter().map(|r| resource.record_from_row(r)).collect())
    }

    /// One record by id, or `None` when no row matches.
    pub async fn get_by_id(&self, resource: &ResolvedResource, id: &str) -> Result<Option<Record>, AppError> {
        require_id(id)?;
        let q = build_get_by_id(resource, id);
        let row = self.store.fetch_optional(&q).await?;
        Ok(row.map(|r| resource.record_from_row(r)))
    }

    /// Insert one record. Returns it with the store-assigned id and timestamps.
    pub async fn create(&self, resource: &ResolvedResource, input: &CreateInput) -> Result<Record, AppError> {
        let q = build_create(resource, input);
        let row = self
            .store
            .fetch_optional(&q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        let record = resource.record_from_row(row);
        tracing::info!(
            resource = %resource.name,
            id = record.get("id").and_then(|v| v.as_str()).unwrap_or_default(),
            "created"
        );
        Ok(record)
    }

    /// Partial update by id. `None` when no row matches.
    pub async fn update(
        &self,
        resource: &ResolvedResource,
        id: &str,
        input: &UpdateInput,
    ) -> Result<Option<Record>, AppError> {
        require_id(id)?;
        let q = build_update(resource, id, input);
        let row = self.store.fetch_optional(&q).await?;
        Ok(row.map(|r| resource.record_from_row(r)))
    }

    /// Hard delete by id. True iff a row was removed.
    pub async fn delete(&self, resource: &ResolvedResource, id: &str) -> Result<bool, AppError> {
        require_id(id)?;
        let q = build_delete(resource, id);
        let deleted = self.store.fetch_optional(&q).await?.is_some();
        if deleted {
            tracing::info!(resource = %resource.name, id = %id, "deleted");
        }
        Ok(deleted)
    }
}
