mod common;

use common::{init_tracing, product_entity as product, setup_catalog_db, setup_numbered_db};
use querycrate::{
    Applied, FilterOperator, QueryHelper, QueryRequest, QuerySettings, Rejection, SelectQuery,
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde_json::json;

fn catalog_settings() -> QuerySettings {
    QuerySettings::new()
        .allow_search(["name", "description"])
        .allow_order_by(["created_at", "price"])
        .allow_filter(
            "price",
            [
                FilterOperator::Ge,
                FilterOperator::Le,
                FilterOperator::Between,
            ],
        )
        .allow_filter("category", [FilterOperator::Eq, FilterOperator::In])
        .allow_filter("name", [FilterOperator::Like])
        .alias("category", "category_id")
}

/// Apply `helper` to a fresh `products` query and fetch the page.
async fn fetch(
    helper: &mut QueryHelper,
    settings: &QuerySettings,
    db: &DatabaseConnection,
) -> Vec<product::Model> {
    let target = SelectQuery::new(product::Entity::find(), db);
    let query = helper
        .apply(settings, Some(target))
        .await
        .expect("apply should succeed")
        .into_query()
        .expect("a target was given");
    query.into_inner().all(db).await.expect("query should run")
}

fn names(rows: &[product::Model]) -> Vec<&str> {
    rows.iter().map(|row| row.name.as_str()).collect()
}

#[tokio::test]
async fn test_end_to_end_phone_search() {
    init_tracing();
    let db = setup_catalog_db().await.expect("Failed to setup test database");

    let settings = QuerySettings::from_json(
        r#"{
            "allowed_search": ["name"],
            "allowed_order_by": ["created_at"],
            "allowed_filters": {"price": [">=", "<="]},
            "default_sort_factor": 1
        }"#,
    )
    .expect("valid settings");

    let request: QueryRequest = serde_json::from_value(json!({
        "page": 0,
        "page_size": 0,
        "search_text": " phone ",
        "search_fields": [],
        "order_by": [],
        "sort_factor": 0,
        "filters": [
            {"field": "price", "operator": ">=", "value": 100},
            {"field": "price", "operator": ">", "value": 50}
        ]
    }))
    .expect("valid request");

    let mut helper = QueryHelper::from_request(request);
    let rows = fetch(&mut helper, &settings, &db).await;

    // "phone" in the name, price >= 100, oldest first
    assert_eq!(names(&rows), vec!["iPhone 15", "Headphones"]);

    let info = helper.info().expect("info after apply");
    let pagination = info.pagination.expect("pagination after a counted apply");
    assert_eq!(pagination.page, 1);
    assert_eq!(pagination.page_size, 10);
    assert_eq!(pagination.total, 2);
    assert_eq!(pagination.total_pages, 1);

    assert_eq!(info.conditions.search_text, "phone");
    assert_eq!(info.conditions.search_fields, vec!["name"]);
    assert_eq!(info.conditions.order_by, vec!["created_at"]);
    assert_eq!(info.conditions.sort_factor, 1);
    assert_eq!(info.conditions.filters.len(), 1);
    assert_eq!(info.conditions.filters[0].operator, FilterOperator::Ge);

    assert_eq!(
        helper.rejected(),
        [Rejection::FilterOperator {
            field: "price".to_string(),
            operator: ">".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_totals_describe_the_filtered_set() {
    let db = setup_numbered_db(25).await.expect("Failed to setup test database");
    let settings = catalog_settings();

    let mut helper = QueryHelper::builder().page(3).page_size(10).build();
    let rows = fetch(&mut helper, &settings, &db).await;
    assert_eq!(names(&rows), vec!["Item 21", "Item 22", "Item 23", "Item 24", "Item 25"]);
    let pagination = helper.info().unwrap().pagination.unwrap();
    assert_eq!(pagination.total, 25);
    assert_eq!(pagination.total_pages, 3);
    assert!(!pagination.has_next_page());

    // Prices are 10, 20, .. so this keeps the first ten rows
    let mut helper = QueryHelper::builder()
        .page_size(4)
        .filter("price", "<=", 100)
        .build();
    let rows = fetch(&mut helper, &settings, &db).await;
    assert_eq!(rows.len(), 4);
    let pagination = helper.info().unwrap().pagination.unwrap();
    assert_eq!(pagination.total, 10);
    assert_eq!(pagination.total_pages, 3);
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let db = setup_numbered_db(5).await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder().page(9).page_size(10).build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert!(rows.is_empty());
    let pagination = helper.info().unwrap().pagination.unwrap();
    assert_eq!(pagination.total, 5);
    assert_eq!(pagination.total_pages, 1);
}

#[tokio::test]
async fn test_largest_page_is_empty_not_an_error() {
    let db = setup_numbered_db(5).await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder().page(i64::MAX).page_size(100).build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert!(rows.is_empty());
    let pagination = helper.info().unwrap().pagination.unwrap();
    assert_eq!(pagination.page, i64::MAX.unsigned_abs());
    assert_eq!(pagination.total, 5);
}

#[tokio::test]
async fn test_page_size_is_capped() {
    let db = setup_numbered_db(25).await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder().page_size(500).build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert_eq!(rows.len(), 25);
    assert_eq!(helper.info().unwrap().pagination.unwrap().page_size, 100);
}

#[tokio::test]
async fn test_alias_maps_public_name_to_column() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder()
        .filter("category", "IN", json!([1, 2]))
        .build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert_eq!(names(&rows), vec!["iPhone 15", "Pixel 8", "Galaxy Tab", "Laptop"]);
    assert_eq!(helper.info().unwrap().conditions.filters[0].field, "category_id");
}

#[tokio::test]
async fn test_storage_column_name_is_not_filterable() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder().filter("category_id", "=", 1).build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert_eq!(rows.len(), 8);
    assert_eq!(
        helper.rejected(),
        [Rejection::FilterField {
            field: "category_id".to_string()
        }]
    );
}

#[tokio::test]
async fn test_search_ors_across_fields() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder().search_text("phone").build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert_eq!(
        names(&rows),
        vec![
            "iPhone 15",
            "Pixel 8",
            "Phone Case",
            "Headphones",
            "Smartphone Stand"
        ]
    );
}

#[tokio::test]
async fn test_descending_sort_on_requested_column() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder()
        .order_by(["price"])
        .sort_factor(-7)
        .page_size(3)
        .build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert_eq!(names(&rows), vec!["Laptop", "iPhone 15", "Pixel 8"]);
    assert_eq!(helper.info().unwrap().conditions.sort_factor, -1);
}

#[tokio::test]
async fn test_between_and_like_filters() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");
    let settings = catalog_settings();

    let mut helper = QueryHelper::builder()
        .filter("price", "BETWEEN", json!([100, 600]))
        .build();
    let rows = fetch(&mut helper, &settings, &db).await;
    assert_eq!(names(&rows), vec!["Pixel 8", "Galaxy Tab", "Headphones"]);

    let mut helper = QueryHelper::builder()
        .filter("name", "LIKE", "%Case%")
        .build();
    let rows = fetch(&mut helper, &settings, &db).await;
    assert_eq!(names(&rows), vec!["Phone Case"]);
}

#[tokio::test]
async fn test_numbers_beyond_i64_still_filter() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");
    let settings = catalog_settings();

    let mut helper = QueryHelper::builder()
        .filter("price", "<=", json!(u64::MAX))
        .build();
    let rows = fetch(&mut helper, &settings, &db).await;
    assert_eq!(rows.len(), 8);
    assert_eq!(helper.info().unwrap().pagination.unwrap().total, 8);

    let mut helper = QueryHelper::builder()
        .filter("price", ">=", json!(u64::MAX))
        .filter("category", "IN", json!([1, u64::MAX]))
        .build();
    let rows = fetch(&mut helper, &settings, &db).await;
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_operator_tokens_are_matched_exactly() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder()
        .filter("price", "between", json!([100, 600]))
        .build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert_eq!(rows.len(), 8);
    assert_eq!(
        helper.rejected(),
        [Rejection::FilterOperator {
            field: "price".to_string(),
            operator: "between".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_malformed_between_is_skipped() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder()
        .filter("price", "BETWEEN", json!([100]))
        .filter("price", ">=", 1000)
        .build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert_eq!(names(&rows), vec!["Laptop"]);
    // Shape problems are not policy rejections
    assert!(helper.rejected().is_empty());
}

#[tokio::test]
async fn test_search_text_is_bound_not_interpolated() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder()
        .search_text("phone' OR '1'='1")
        .filter("name", "LIKE", "x'; DROP TABLE products; --")
        .build();
    let rows = fetch(&mut helper, &catalog_settings(), &db).await;

    assert!(rows.is_empty());
    assert_eq!(helper.info().unwrap().pagination.unwrap().total, 0);

    let remaining = product::Entity::find().count(&db).await.expect("table still exists");
    assert_eq!(remaining, 8);
}

#[tokio::test]
async fn test_default_settings_order_by_created_at() {
    let db = setup_catalog_db().await.expect("Failed to setup test database");

    let mut helper = QueryHelper::builder()
        .search_text("phone")
        .filter("price", ">=", 0)
        .page_size(2)
        .build();
    let rows = fetch(&mut helper, &QuerySettings::default(), &db).await;

    // Nothing is searchable or filterable, so only ordering and paging apply
    assert_eq!(names(&rows), vec!["iPhone 15", "Pixel 8"]);
    assert_eq!(helper.info().unwrap().pagination.unwrap().total, 8);
    assert_eq!(helper.rejected().len(), 1);
}

#[tokio::test]
async fn test_dry_run_returns_no_target() {
    let mut helper = QueryHelper::builder()
        .search_fields(["name", "password"])
        .build();

    let applied = helper
        .apply::<SelectQuery<'_, product::Entity, DatabaseConnection>>(&catalog_settings(), None)
        .await
        .expect("dry run should succeed");

    assert!(matches!(applied, Applied::NoTarget));
    let info = helper.info().expect("conditions recorded");
    assert!(info.pagination.is_none());
    assert_eq!(info.conditions.search_fields, vec!["name"]);
    assert_eq!(
        helper.rejected(),
        [Rejection::SearchField {
            field: "password".to_string()
        }]
    );
}
