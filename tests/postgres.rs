//! Record lifecycle properties against a live PostgreSQL.
//! Runs only when TEST_DATABASE_URL is set; each run uses a throwaway schema.

use project_hub::config::{builtin_resources, resolve, ResolvedModel};
use project_hub::service::{ListQuery, RequestValidator};
use project_hub::{apply_migrations, CrudService, PgStore};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;

struct Harness {
    pool: PgPool,
    schema: String,
    model: ResolvedModel,
    service: CrudService,
}

impl Harness {
    async fn start() -> Option<Harness> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect TEST_DATABASE_URL");
        let schema = format!("hub_test_{}", uuid::Uuid::new_v4().simple());
        let mut resources = builtin_resources().unwrap();
        for r in &mut resources {
            r.schema = Some(schema.clone());
        }
        let model = resolve(&resources).unwrap();
        apply_migrations(&pool, &model).await.unwrap();
        let service = CrudService::new(Arc::new(PgStore::new(pool.clone())));
        Some(Harness { pool, schema, model, service })
    }

    async fn finish(self) {
        sqlx::query(&format!("DROP SCHEMA \"{}\" CASCADE", self.schema))
            .execute(&self.pool)
            .await
            .unwrap();
    }

    async fn create(&self, plural: &str, body: Value) -> serde_json::Map<String, Value> {
        let resource = self.model.resource_by_path(plural).unwrap();
        let input = RequestValidator::create_input(resource, body.as_object().unwrap()).unwrap();
        self.service.create(resource, &input).await.unwrap()
    }
}

#[tokio::test]
async fn project_lifecycle() {
    let Some(h) = Harness::start().await else { return };
    let projects = h.model.resource_by_path("projects").unwrap();

    let created = h
        .create("projects", json!({ "title": "A", "description": "d", "studentId": "s1" }))
        .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(created["status"], "draft");
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let other = h
        .create("projects", json!({ "title": "B", "description": "d", "studentId": "s1" }))
        .await;
    assert_ne!(other["id"], created["id"]);

    let listed = h.service.list(projects, &ListQuery::default()).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0]["createdAt"].as_str() >= listed[1]["createdAt"].as_str());

    let change = RequestValidator::update_input(projects, json!({ "status": "in_progress" }).as_object().unwrap())
        .unwrap();
    let first = h.service.update(projects, &id, &change).await.unwrap().unwrap();
    let second = h.service.update(projects, &id, &change).await.unwrap().unwrap();
    assert_eq!(first["status"], "in_progress");
    assert_eq!(second["status"], "in_progress");
    assert_eq!(second["id"], created["id"]);
    assert_eq!(second["createdAt"], created["createdAt"]);
    assert!(first["updatedAt"].as_str().unwrap() > created["updatedAt"].as_str().unwrap());
    assert!(second["updatedAt"].as_str().unwrap() > first["updatedAt"].as_str().unwrap());

    assert!(h.service.delete(projects, &id).await.unwrap());
    assert!(h.service.get_by_id(projects, &id).await.unwrap().is_none());
    assert!(!h.service.delete(projects, &id).await.unwrap());

    h.finish().await;
}

#[tokio::test]
async fn absent_records_are_sentinels_not_faults() {
    let Some(h) = Harness::start().await else { return };
    let projects = h.model.resource_by_path("projects").unwrap();

    assert!(h.service.get_by_id(projects, "missing-id").await.unwrap().is_none());
    let change =
        RequestValidator::update_input(projects, json!({ "title": "T", "status": "in_progress" }).as_object().unwrap())
            .unwrap();
    assert!(h.service.update(projects, "missing-id", &change).await.unwrap().is_none());
    assert!(!h.service.delete(projects, "missing-id").await.unwrap());

    h.finish().await;
}

#[tokio::test]
async fn items_search_and_reference_users() {
    let Some(h) = Harness::start().await else { return };
    let items = h.model.resource_by_path("items").unwrap();

    let user = h.create("users", json!({ "name": "John Doe", "email": "john@example.com" })).await;
    let user_id = user["id"].as_str().unwrap();
    h.create("items", json!({ "title": "Buy milk", "userId": user_id })).await;
    h.create("items", json!({ "title": "Walk", "content": "100% done", "userId": user_id })).await;

    let query = ListQuery {
        search: Some("100%".into()),
        ..ListQuery::default()
    };
    let found = h.service.list(items, &query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["title"], "Walk");

    let orphan = RequestValidator::create_input(items, json!({ "title": "x", "userId": "nobody" }).as_object().unwrap())
        .unwrap();
    assert!(h.service.create(items, &orphan).await.is_err());

    h.finish().await;
}
