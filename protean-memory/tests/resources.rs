//! End-to-end resource operations against the in-memory backend: the
//! create/list/get/delete flow a tenant's declared resource supports.

use serde_json::{Map, Value, json};

use protean_core::{
    error::ApiError,
    filter::FilterOp,
    page::PaginationParams,
    resources::Resources,
    schema::{PropertyDefinition, PropertyType, ResourceDefinition},
};
use protean_memory::{InMemoryDefinitions, InMemoryStore};

fn books() -> ResourceDefinition {
    ResourceDefinition::new(
        "books",
        vec![
            PropertyDefinition::required("title", PropertyType::String),
            PropertyDefinition::optional("pages", PropertyType::Number),
            PropertyDefinition::optional("tags", PropertyType::Array),
        ],
    )
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

async fn service() -> Resources<InMemoryStore, InMemoryDefinitions> {
    let definitions = InMemoryDefinitions::new();
    definitions.register("acme", books()).await.unwrap();

    Resources::new(InMemoryStore::new(), definitions)
}

#[tokio::test]
async fn created_objects_round_trip_through_get() {
    let resources = service().await;
    let payload = object(json!({
        "title": "Dune",
        "pages": 412,
        "tags": ["scifi", "classic"],
    }));

    let created = resources
        .create_object("acme", "books", &payload)
        .await
        .unwrap();

    let id = created["id"].as_str().unwrap();
    assert!(!id.is_empty());

    let fetched = resources.get_object("acme", "books", id).await.unwrap();
    for (key, value) in &payload {
        assert_eq!(fetched.get(key), Some(value), "field '{key}' changed");
    }
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_rejects_payloads_the_schema_does_not_declare() {
    let resources = service().await;

    let unknown = resources
        .create_object("acme", "books", &object(json!({"title": "Dune", "publisher": "Ace"})))
        .await;
    assert!(matches!(unknown, Err(ApiError::UnknownField(field)) if field == "publisher"));

    let missing = resources
        .create_object("acme", "books", &object(json!({"pages": 412})))
        .await;
    assert!(matches!(missing, Err(ApiError::MissingField(field)) if field == "title"));

    let mismatched = resources
        .create_object("acme", "books", &object(json!({"title": "Dune", "pages": "twelve"})))
        .await;
    assert!(matches!(mismatched, Err(ApiError::TypeMismatch { .. })));

    // Nothing was written along the way.
    let listed = resources
        .list_objects("acme", "books", vec![], &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(listed.count, 0);
}

#[tokio::test]
async fn a_client_supplied_id_is_never_the_stored_identity() {
    let resources = service().await;

    let created = resources
        .create_object(
            "acme",
            "books",
            &object(json!({"id": "11111111-1111-1111-1111-111111111111", "title": "Dune"})),
        )
        .await
        .unwrap();

    assert_ne!(created["id"], json!("11111111-1111-1111-1111-111111111111"));
}

#[tokio::test]
async fn list_filters_select_the_matching_subset() {
    let resources = service().await;
    for (title, pages) in [("A", 5), ("B", 10), ("C", 15)] {
        resources
            .create_object("acme", "books", &object(json!({"title": title, "pages": pages})))
            .await
            .unwrap();
    }

    let listed = resources
        .list_objects(
            "acme",
            "books",
            vec![("pages".to_string(), FilterOp::Gte, json!(10))],
            &PaginationParams::default(),
        )
        .await
        .unwrap();

    assert_eq!(listed.count, 2);
    let mut pages: Vec<i64> = listed
        .items
        .iter()
        .map(|item| item["pages"].as_i64().unwrap())
        .collect();
    pages.sort_unstable();
    assert_eq!(pages, vec![10, 15]);
    assert_eq!(listed.definition, books());
}

#[tokio::test]
async fn list_filters_are_type_checked_before_storage() {
    let resources = service().await;

    let result = resources
        .list_objects(
            "acme",
            "books",
            vec![("pages".to_string(), FilterOp::Gte, json!("ten"))],
            &PaginationParams::default(),
        )
        .await;

    assert!(matches!(result, Err(ApiError::FilterTypeMismatch { .. })));
}

#[tokio::test]
async fn pagination_bounds_the_page() {
    let resources = service().await;
    for i in 0..5 {
        resources
            .create_object("acme", "books", &object(json!({"title": format!("book-{i}")})))
            .await
            .unwrap();
    }

    let page = resources
        .list_objects("acme", "books", vec![], &PaginationParams::new(2, 2))
        .await
        .unwrap();

    assert_eq!(page.count, 2);
}

#[tokio::test]
async fn tenants_never_see_each_other_objects() {
    let resources = service().await;
    // Same resource name declared by a second tenant.
    resources
        .create_object("acme", "books", &object(json!({"title": "Dune"})))
        .await
        .unwrap();

    let definitions = InMemoryDefinitions::new();
    definitions.register("globex", books()).await.unwrap();
    let other = Resources::new(resources.backend().clone(), definitions);

    let listed = other
        .list_objects("globex", "books", vec![], &PaginationParams::default())
        .await
        .unwrap();

    assert_eq!(listed.count, 0);
}

#[tokio::test]
async fn delete_on_a_missing_id_reports_not_found() {
    let resources = service().await;

    let result = resources
        .delete_object("acme", "books", "11111111-1111-1111-1111-111111111111")
        .await;

    assert!(matches!(result, Err(ApiError::ObjectNotFound(_))));
}

#[tokio::test]
async fn deleted_objects_are_gone() {
    let resources = service().await;
    let created = resources
        .create_object("acme", "books", &object(json!({"title": "Dune"})))
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    resources.delete_object("acme", "books", id).await.unwrap();

    let fetched = resources.get_object("acme", "books", id).await;
    assert!(matches!(fetched, Err(ApiError::ObjectNotFound(_))));

    let again = resources.delete_object("acme", "books", id).await;
    assert!(matches!(again, Err(ApiError::ObjectNotFound(_))));
}

#[tokio::test]
async fn malformed_identifiers_are_rejected_before_storage() {
    let resources = service().await;

    let result = resources.get_object("acme", "books", "not-a-uuid").await;

    assert!(matches!(result, Err(ApiError::InvalidIdentifier(value)) if value == "not-a-uuid"));
}

#[tokio::test]
async fn undeclared_resources_report_not_found() {
    let resources = service().await;

    let result = resources
        .create_object("acme", "authors", &object(json!({"title": "x"})))
        .await;

    match result {
        Err(err @ ApiError::ResourceNotFound(_)) => assert_eq!(err.status_code(), 404),
        other => panic!("expected ResourceNotFound, got {other:?}"),
    }
}
