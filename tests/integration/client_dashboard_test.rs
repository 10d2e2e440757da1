//! Typed client against a mocked API: dashboard row actions and the quote form.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trademart_api::client::{
    ClientError, Dashboard, QuoteForm, QuoteFormState, QuoteSubmission, QuoteSubmitter,
    TradeMartClient,
};
use trademart_api::database::schema::types::{QuoteStatus, RfqStatus, UserRole};
use trademart_api::error::ErrorCode;
use trademart_api::handlers::ApiResponse;
use trademart_api::models::{
    DashboardData, DashboardItem, DashboardStats, DashboardView, ItemKind, Product, Quote, Rfq,
    RfqStats,
};
use trademart_api::services::RfqDetail;

const TOKEN: &str = "test-token";

fn ok<T: Serialize>(data: T) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(ApiResponse::success(data))
}

fn failure(status: u16, code: &str, error: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "success": false,
        "error": error,
        "code": code,
        "requestId": Uuid::new_v4().to_string(),
    }))
}

fn rfq(title: &str, status: RfqStatus, budget: i64) -> Rfq {
    let now = Utc::now();
    Rfq {
        id: Uuid::new_v4(),
        buyer_id: Uuid::new_v4(),
        title: title.to_string(),
        description: "Bulk order for a site in Pune".to_string(),
        category: "Electrical".to_string(),
        quantity: 100,
        unit: "kg".to_string(),
        budget: Some(Decimal::from(budget)),
        currency: "INR".to_string(),
        deadline: None,
        delivery_location: None,
        status,
        quote_count: 0,
        created_at: now,
        updated_at: now,
    }
}

fn product(id: Uuid, name: &str, stock: i32) -> Product {
    let now = Utc::now();
    Product {
        id,
        supplier_id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        category: "Electrical".to_string(),
        price: Decimal::from(10),
        currency: "INR".to_string(),
        unit: "piece".to_string(),
        min_order_quantity: 1,
        stock,
        in_stock: stock > 0,
        features: Vec::new(),
        tags: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn quote(rfq_id: Uuid) -> Quote {
    let now = Utc::now();
    Quote {
        id: Uuid::new_v4(),
        rfq_id,
        supplier_id: Uuid::new_v4(),
        supplier_name: "Volt Traders".to_string(),
        price: Decimal::new(42050, 2),
        currency: "INR".to_string(),
        lead_time: "2 weeks".to_string(),
        notes: None,
        status: QuoteStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

async fn mount_dashboard(server: &MockServer, items: Vec<DashboardItem>) {
    let rfqs: Vec<Rfq> = items
        .iter()
        .filter_map(|item| match item {
            DashboardItem::Rfq(r) => Some(r.clone()),
            DashboardItem::Product(_) => None,
        })
        .collect();
    let data = DashboardData {
        role: UserRole::Buyer,
        view: DashboardView::Rfqs,
        items,
        stats: DashboardStats::Rfqs(RfqStats::from_rfqs(&rfqs)),
    };
    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ok(data))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> TradeMartClient {
    TradeMartClient::new(format!("{}/", server.uri()))
        .unwrap()
        .with_token(TOKEN)
}

fn rfq_stats(dashboard: &Dashboard) -> RfqStats {
    match dashboard.stats() {
        DashboardStats::Rfqs(stats) => stats,
        other => panic!("expected RFQ stats, got {:?}", other),
    }
}

#[tokio::test]
async fn test_toggle_replaces_row_and_recomputes_stats() {
    let server = MockServer::start().await;
    let open = rfq("Copper wire", RfqStatus::Open, 500);
    let closed = rfq("Steel rods", RfqStatus::Closed, 300);
    mount_dashboard(
        &server,
        vec![DashboardItem::Rfq(open.clone()), DashboardItem::Rfq(closed.clone())],
    )
    .await;

    let mut updated = open.clone();
    updated.status = RfqStatus::Closed;
    Mock::given(method("PUT"))
        .and(path(format!("/api/rfqs/{}", open.id)))
        .and(header_exists("idempotency-key"))
        .and(body_json(json!({ "status": "closed" })))
        .respond_with(ok(json!({ "rfq": updated })))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = Dashboard::load(client(&server), None).await.unwrap();
    assert_eq!(dashboard.view(), DashboardView::Rfqs);
    assert_eq!(rfq_stats(&dashboard).open, 1);

    let result = dashboard.toggle_rfq_status(open.id).await.unwrap();
    assert_eq!(result.status, RfqStatus::Closed);

    let stats = rfq_stats(&dashboard);
    assert_eq!(stats.open, 0);
    assert_eq!(stats.closed, 2);
    assert_eq!(stats.total_budget, Decimal::from(800));
    assert!(!dashboard.is_in_flight(ItemKind::Rfq, open.id));
}

#[tokio::test]
async fn test_second_toggle_while_pending_sends_nothing() {
    let server = MockServer::start().await;
    let open = rfq("Copper wire", RfqStatus::Open, 500);
    mount_dashboard(&server, vec![DashboardItem::Rfq(open.clone())]).await;

    let mut updated = open.clone();
    updated.status = RfqStatus::Closed;
    Mock::given(method("PUT"))
        .and(path(format!("/api/rfqs/{}", open.id)))
        .respond_with(ok(json!({ "rfq": updated })).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = Dashboard::load(client(&server), None).await.unwrap();
    let (first, second) = tokio::join!(
        dashboard.toggle_rfq_status(open.id),
        dashboard.toggle_rfq_status(open.id)
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(ClientError::ActionInFlight(id)) if id == open.id));
}

#[tokio::test]
async fn test_rejected_toggle_keeps_row() {
    let server = MockServer::start().await;
    let quoted = rfq("Cable trays", RfqStatus::Quoted, 900);
    mount_dashboard(&server, vec![DashboardItem::Rfq(quoted.clone())]).await;

    Mock::given(method("PUT"))
        .and(path(format!("/api/rfqs/{}", quoted.id)))
        .respond_with(failure(
            409,
            "INVALID_STATUS_TRANSITION",
            "This status change is not allowed",
        ))
        .mount(&server)
        .await;

    let dashboard = Dashboard::load(client(&server), None).await.unwrap();
    let err = dashboard.toggle_rfq_status(quoted.id).await.unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::InvalidStatusTransition));
    assert_eq!(err.user_message(), "This status change is not allowed");
    assert_eq!(dashboard.items(), vec![DashboardItem::Rfq(quoted.clone())]);
    assert!(!dashboard.is_in_flight(ItemKind::Rfq, quoted.id));
}

#[tokio::test]
async fn test_delete_uses_the_row_kind() {
    let server = MockServer::start().await;
    let shared_id = Uuid::new_v4();
    let mut request = rfq("Copper wire", RfqStatus::Open, 500);
    request.id = shared_id;
    let listing = product(shared_id, "Copper wire spool", 4);
    mount_dashboard(
        &server,
        vec![DashboardItem::Rfq(request.clone()), DashboardItem::Product(listing)],
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/products/{}", shared_id)))
        .and(header_exists("idempotency-key"))
        .respond_with(ok(json!({ "id": shared_id })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/rfqs/{}", shared_id)))
        .respond_with(ok(json!({ "id": shared_id })))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = Dashboard::load(client(&server), None).await.unwrap();
    dashboard
        .delete_item(ItemKind::Product, shared_id)
        .await
        .unwrap();

    assert_eq!(dashboard.items(), vec![DashboardItem::Rfq(request)]);
    assert_eq!(dashboard.filter("copper").len(), 1);
    assert!(dashboard.filter("spool").is_empty());
}

#[tokio::test]
async fn test_quote_submit_refetches_rfq() {
    let server = MockServer::start().await;
    let mut target = rfq("Copper wire", RfqStatus::Open, 500);
    let submitted = quote(target.id);

    Mock::given(method("POST"))
        .and(path("/api/quotes/create"))
        .and(header_exists("idempotency-key"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(ApiResponse::success(json!({ "quote": submitted }))),
        )
        .expect(1)
        .mount(&server)
        .await;

    target.status = RfqStatus::Quoted;
    target.quote_count = 1;
    let detail = RfqDetail {
        rfq: target.clone(),
        quotes: vec![submitted],
    };
    Mock::given(method("GET"))
        .and(path(format!("/api/rfqs/{}", target.id)))
        .respond_with(ok(detail.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = QuoteSubmitter::new(client(&server), target.id);
    let form = QuoteForm {
        price: "420.50".to_string(),
        lead_time: "2 weeks".to_string(),
        ..Default::default()
    };

    let submission = submitter.submit(&form).await.unwrap();
    let refreshed = submission.detail.clone().unwrap();
    assert_eq!(refreshed.rfq.status, RfqStatus::Quoted);
    assert_eq!(refreshed.rfq.quote_count, 1);
    assert_eq!(refreshed, detail);
    assert_eq!(submitter.state(), QuoteFormState::Success(Box::new(submission)));
    assert_eq!(submitter.last_error(), None);
}

#[tokio::test]
async fn test_quote_accepted_even_when_refresh_fails() {
    let server = MockServer::start().await;
    let rfq_id = Uuid::new_v4();
    let submitted = quote(rfq_id);

    Mock::given(method("POST"))
        .and(path("/api/quotes/create"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(ApiResponse::success(json!({ "quote": submitted.clone() }))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/rfqs/{}", rfq_id)))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = QuoteSubmitter::new(client(&server), rfq_id);
    let form = QuoteForm {
        price: "420.50".to_string(),
        lead_time: "2 weeks".to_string(),
        ..Default::default()
    };

    let submission = submitter.submit(&form).await.unwrap();
    assert_eq!(submission.quote, submitted);
    assert_eq!(submission.detail, None);
    assert_eq!(
        submitter.state(),
        QuoteFormState::Success(Box::new(QuoteSubmission {
            quote: submitted,
            detail: None,
        }))
    );
    assert_eq!(submitter.last_error(), None);
}

#[tokio::test]
async fn test_duplicate_quote_shows_mapped_message() {
    let server = MockServer::start().await;
    let rfq_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/api/quotes/create"))
        .respond_with(failure(409, "QUOTE_ALREADY_SUBMITTED", "duplicate key"))
        .mount(&server)
        .await;

    let submitter = QuoteSubmitter::new(client(&server), rfq_id);
    let form = QuoteForm {
        price: "100".to_string(),
        lead_time: "10 days".to_string(),
        ..Default::default()
    };

    let err = submitter.submit(&form).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::QuoteAlreadySubmitted));
    assert_eq!(submitter.state(), QuoteFormState::Idle);
    assert_eq!(
        submitter.last_error().as_deref(),
        Some("You have already submitted a quote for this RFQ")
    );
}

#[tokio::test]
async fn test_invalid_quote_form_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/quotes/create"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let submitter = QuoteSubmitter::new(client(&server), Uuid::new_v4());
    let err = submitter
        .submit(&QuoteForm {
            price: "0".to_string(),
            lead_time: "2 weeks".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation { ref field, .. } if field == "price"));
    assert_eq!(
        submitter.last_error().as_deref(),
        Some("Price must be greater than zero")
    );
}

#[tokio::test]
async fn test_missing_rfq_maps_to_not_found() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/api/rfqs/{}", id)))
        .respond_with(failure(404, "NOT_FOUND", "RFQ not found"))
        .mount(&server)
        .await;

    let err = client(&server).get_rfq(id).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref msg) if msg == "RFQ not found"));
}
