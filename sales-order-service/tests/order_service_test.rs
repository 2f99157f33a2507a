//! Service-level tests against the in-memory repository.

mod common;

use chrono::Local;
use common::memory::InMemoryRepository;
use common::{line, order_body};
use order_engine::{format_order_number, ListParams, PageLimits};
use sales_order_service::dtos::{PreviewRequest, SalesOrderRequest};
use sales_order_service::services::SalesOrderService;
use serde_json::{json, Value};
use service_core::error::AppError;
use std::sync::Arc;

fn service() -> (SalesOrderService, Arc<InMemoryRepository>) {
    common::init_tracing();
    let repo = Arc::new(InMemoryRepository::new());
    (
        SalesOrderService::new(repo.clone(), PageLimits::default()),
        repo,
    )
}

fn request(body: Value) -> SalesOrderRequest {
    serde_json::from_value(body).unwrap()
}

fn params(query: &str) -> ListParams {
    serde_urlencoded::from_str(query).unwrap()
}

#[tokio::test]
async fn test_create_then_get_round_trips() {
    let (service, _) = service();

    let created = service
        .create(request(order_body(json!([
            { "product_id": 1, "product_name": "PC Server", "qty": 3, "unit_price": "100", "discount_type": "percentage", "discount_value": "10" },
            { "product_id": 2, "product_name": "Laptop", "qty": 1, "unit_price": "250.50" }
        ]))))
        .await
        .unwrap();

    let fetched = service.get(created.order.id).await.unwrap();
    assert_eq!(fetched, created);

    assert_eq!(fetched.lines.len(), 2);
    assert_eq!(fetched.lines[0].total_price.to_string(), "270.00");
    assert_eq!(fetched.lines[0].discount_type.as_deref(), Some("percentage"));
    assert_eq!(fetched.lines[1].discount_type, None);
    assert_eq!(fetched.order.subtotal.to_string(), "550.50");
    assert_eq!(fetched.order.discount_amount.to_string(), "30.00");
    assert_eq!(fetched.order.total_amount.to_string(), "520.50");
}

#[tokio::test]
async fn test_amount_discount_can_push_total_negative() {
    let (service, _) = service();

    let created = service
        .create(request(order_body(json!([
            { "product_id": 2, "product_name": "Laptop", "qty": 2, "unit_price": 10, "discount_type": "amount", "discount_value": 50 }
        ]))))
        .await
        .unwrap();

    assert_eq!(created.lines[0].total_price.to_string(), "0.00");
    assert_eq!(created.order.subtotal.to_string(), "20.00");
    assert_eq!(created.order.discount_amount.to_string(), "100.00");
    assert_eq!(created.order.total_amount.to_string(), "-80.00");
}

#[tokio::test]
async fn test_order_numbers_follow_latest_id() {
    let (service, _) = service();
    let today = Local::now().date_naive();

    assert_eq!(
        service.generate_order_number().await.unwrap(),
        format_order_number(today, 1)
    );

    let first = service
        .create(request(order_body(json!([line(1, 1, "10")]))))
        .await
        .unwrap();
    assert_eq!(first.order.order_number, format_order_number(today, 1));

    assert_eq!(
        service.generate_order_number().await.unwrap(),
        format_order_number(today, 2)
    );
}

#[tokio::test]
async fn test_supplied_order_number_is_kept_and_duplicates_conflict() {
    let (service, _) = service();

    let mut body = order_body(json!([line(1, 1, "10")]));
    body["so_number"] = json!("SO202509200099");

    let created = service.create(request(body.clone())).await.unwrap();
    assert_eq!(created.order.order_number, "SO202509200099");

    let err = service.create(request(body)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_update_replaces_lines_and_keeps_number() {
    let (service, repo) = service();

    let created = service
        .create(request(order_body(json!([
            line(1, 1, "10"),
            line(2, 2, "20"),
            line(3, 3, "30")
        ]))))
        .await
        .unwrap();
    assert_eq!(repo.line_count(), 3);

    let mut body = order_body(json!([
        { "product_id": 5, "product_name": "Keyboard", "qty": 4, "unit_price": "25", "discount_type": "amount", "discount_value": "5" }
    ]));
    body["order_number"] = json!("SO209901010001");
    body["status_type_id"] = json!(2);

    let updated = service.update(created.order.id, request(body)).await.unwrap();

    assert_eq!(updated.order.order_number, created.order.order_number);
    assert_eq!(updated.order.status_id, 2);
    assert_eq!(updated.lines.len(), 1);
    assert_eq!(updated.lines[0].product_name, "Keyboard");
    assert_eq!(updated.order.subtotal.to_string(), "100.00");
    assert_eq!(updated.order.discount_amount.to_string(), "20.00");
    assert_eq!(updated.order.total_amount.to_string(), "80.00");
    assert_eq!(repo.line_count(), 1);
}

#[tokio::test]
async fn test_delete_cascades_and_reports_missing() {
    let (service, repo) = service();

    let created = service
        .create(request(order_body(json!([line(1, 1, "10"), line(2, 1, "10")]))))
        .await
        .unwrap();

    service.delete(created.order.id).await.unwrap();
    assert_eq!(repo.line_count(), 0);

    assert!(matches!(
        service.get(created.order.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.delete(created.order.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_validation_and_not_found_are_distinct() {
    let (service, repo) = service();

    let invalid = json!({ "customer_id": 1, "details": [] });
    assert!(matches!(
        service.create(request(invalid.clone())).await,
        Err(AppError::ValidationError(_))
    ));
    assert_eq!(repo.line_count(), 0);

    // Missing order wins over an invalid body.
    assert!(matches!(
        service.update(42, request(invalid.clone())).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.update(42, request(order_body(json!([line(1, 1, "1")])))).await,
        Err(AppError::NotFound(_))
    ));

    let created = service
        .create(request(order_body(json!([line(1, 1, "10")]))))
        .await
        .unwrap();
    assert!(matches!(
        service.update(created.order.id, request(invalid)).await,
        Err(AppError::ValidationError(_))
    ));
}

#[tokio::test]
async fn test_list_filters_sorts_and_paginates() {
    let (service, _) = service();

    for (customer, price, remarks) in [
        (1, "300", "rush order"),
        (2, "100", "regular"),
        (1, "200", "Rush delivery"),
    ] {
        let mut body = order_body(json!([line(1, 1, price)]));
        body["customer_id"] = json!(customer);
        body["remarks"] = json!(remarks);
        service.create(request(body)).await.unwrap();
    }

    let page = service
        .list(params("search=RUSH&customer_id=1&sort_by=total_amount&sort_direction=asc"))
        .await
        .unwrap();
    let totals: Vec<String> = page
        .data
        .iter()
        .map(|s| s.order.total_amount.to_string())
        .collect();
    assert_eq!(totals, vec!["200.00", "300.00"]);
    assert_eq!(page.meta.total, 2);
    assert_eq!(page.data[0].line_count, 1);

    let page = service.list(params("per_page=2&page=2")).await.unwrap();
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.last_page, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.meta.from, Some(3));
    assert!(page.links.prev.is_some());
    assert!(page.links.next.is_none());

    let empty = service.list(params("customer_id=3")).await.unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.meta.total, 0);
}

#[tokio::test]
async fn test_unknown_sort_matches_date_desc() {
    let (service, _) = service();

    for date in ["2025-09-01", "2025-09-15", "2025-09-10"] {
        let mut body = order_body(json!([line(1, 1, "10")]));
        body["order_date"] = json!(date);
        service.create(request(body)).await.unwrap();
    }

    let ids = |page: order_engine::Paginated<sales_order_service::models::SalesOrderSummary>| {
        page.data.iter().map(|s| s.order.id).collect::<Vec<_>>()
    };

    let fallback = ids(service
        .list(params("sort_by=bogus&sort_direction=asc"))
        .await
        .unwrap());
    let explicit = ids(service
        .list(params("sort_by=so_date&sort_direction=desc"))
        .await
        .unwrap());

    assert_eq!(fallback, explicit);
    assert_eq!(fallback, vec![2, 3, 1]);
}

#[tokio::test]
async fn test_preview_matches_persisted_totals() {
    let (service, _) = service();
    let lines = json!([
        { "product_id": 1, "product_name": "PC Server", "qty": 3, "unit_price": "100", "discount_type": "percentage", "discount_value": 10 },
        { "product_id": 2, "product_name": "Laptop", "qty": 2, "unit_price": "10", "discount_type": "amount", "discount_value": 50 }
    ]);

    let preview: PreviewRequest = serde_json::from_value(json!({ "details": lines.clone() })).unwrap();
    let preview = service.preview(&preview).unwrap();
    let created = service.create(request(order_body(lines))).await.unwrap();

    assert_eq!(preview.subtotal, created.order.subtotal);
    assert_eq!(preview.discount_amount, created.order.discount_amount);
    assert_eq!(preview.total_amount, created.order.total_amount);
    assert_eq!(preview.details[0].total_price, created.lines[0].total_price);
    assert_eq!(preview.details[1].total_price, created.lines[1].total_price);
}

#[tokio::test]
async fn test_blank_order_number_is_generated() {
    let (service, _) = service();

    let mut body = order_body(json!([line(1, 1, "10")]));
    body["so_number"] = json!("");
    let created = service.create(request(body)).await.unwrap();

    assert_eq!(
        created.order.order_number,
        format_order_number(Local::now().date_naive(), 1)
    );
}

#[tokio::test]
async fn test_update_accepts_legacy_order_number() {
    let (service, _) = service();

    let created = service
        .create(request(order_body(json!([line(1, 1, "10")]))))
        .await
        .unwrap();

    let mut body = order_body(json!([line(2, 2, "15")]));
    body["so_number"] = json!("LEGACY-7");
    let updated = service.update(created.order.id, request(body)).await.unwrap();

    assert_eq!(updated.order.order_number, created.order.order_number);
    assert_eq!(updated.order.total_amount.to_string(), "30.00");
}

#[tokio::test]
async fn test_sub_cent_unit_price_is_priced_unrounded() {
    let (service, _) = service();

    let created = service
        .create(request(order_body(json!([
            { "product_id": 3, "product_name": "Printer", "qty": 3, "unit_price": "0.005" }
        ]))))
        .await
        .unwrap();

    assert_eq!(created.lines[0].total_price.to_string(), "0.02");
    assert_eq!(created.order.subtotal.to_string(), "0.02");
    assert_eq!(created.order.total_amount.to_string(), "0.02");
}
