//! End-to-end marketplace flows against the in-memory store, driven through
//! the full router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

use trademart_api::database::MemoryStore;
use trademart_api::middleware::idempotency::{IDEMPOTENCY_KEY_HEADER, IDEMPOTENT_REPLAYED_HEADER};
use trademart_api::{build_router, AppState, Config};

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

fn test_app() -> Router {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState::new(Config::for_tests(), Arc::new(MemoryStore::new()), handle);
    build_router(state)
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
    idempotency_key: Option<&str>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(key) = idempotency_key {
        builder = builder.header(IDEMPOTENCY_KEY_HEADER, key);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply {
        status,
        headers,
        body,
    }
}

async fn signup(app: &Router, email: &str, role: &str) -> String {
    let reply = call(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "email": email,
            "password": "correct-horse-battery",
            "name": "Test Account",
            "role": role,
        })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["data"]["token"].as_str().unwrap().to_string()
}

async fn supplier_with_profile(app: &Router, email: &str, company: &str) -> String {
    let token = signup(app, email, "supplier").await;
    let reply = call(
        app,
        Method::POST,
        "/api/suppliers/upsert",
        Some(&token),
        Some(json!({ "companyName": company, "industry": "Electrical" })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    token
}

async fn post_rfq(app: &Router, token: &str, title: &str, budget: f64) -> String {
    let reply = call(
        app,
        Method::POST,
        "/api/rfqs",
        Some(token),
        Some(json!({
            "title": title,
            "description": "Looking for a reliable supplier with ISI marking",
            "category": "Electrical",
            "quantity": 500,
            "unit": "kg",
            "budget": budget,
        })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["data"]["rfq"]["id"].as_str().unwrap().to_string()
}

fn quote_body(rfq_id: &str) -> Value {
    json!({ "rfqId": rfq_id, "price": 420.0, "leadTime": "2 weeks" })
}

#[tokio::test]
async fn test_signup_and_signin() {
    let app = test_app();
    signup(&app, "buyer@example.com", "buyer").await;

    let ok = call(
        &app,
        Method::POST,
        "/api/auth/signin",
        None,
        Some(json!({ "email": "buyer@example.com", "password": "correct-horse-battery" })),
        None,
    )
    .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["success"], true);
    assert_eq!(ok.body["data"]["user"]["role"], "buyer");

    let bad = call(
        &app,
        Method::POST,
        "/api/auth/signin",
        None,
        Some(json!({ "email": "buyer@example.com", "password": "wrong-password" })),
        None,
    )
    .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bad.body["success"], false);
    assert_eq!(bad.body["code"], "INVALID_CREDENTIALS");

    let duplicate = call(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "email": "buyer@example.com",
            "password": "correct-horse-battery",
            "name": "Someone Else",
            "role": "buyer",
        })),
        None,
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_error_envelope_carries_request_id() {
    let app = test_app();
    let reply = call(&app, Method::GET, "/api/rfqs/my-rfqs", None, None, None).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["code"], "TOKEN_MISSING");
    assert_eq!(reply.body["error"], "Please sign in to continue");
    let header_id = reply.headers["x-request-id"].to_str().unwrap();
    assert_eq!(reply.body["requestId"], header_id);
}

#[tokio::test]
async fn test_only_buyers_post_rfqs() {
    let app = test_app();
    let supplier = supplier_with_profile(&app, "s@example.com", "Volt Traders").await;

    let reply = call(
        &app,
        Method::POST,
        "/api/rfqs",
        Some(&supplier),
        Some(json!({
            "title": "Copper wire",
            "description": "Looking for a reliable supplier",
            "category": "Electrical",
            "quantity": 5,
            "unit": "kg",
        })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.body["code"], "ROLE_NOT_AUTHORIZED");
}

#[tokio::test]
async fn test_rfq_ownership_and_transitions() {
    let app = test_app();
    let owner = signup(&app, "owner@example.com", "buyer").await;
    let other = signup(&app, "other@example.com", "buyer").await;
    let rfq_id = post_rfq(&app, &owner, "500 kg copper wire", 500.0).await;
    let path = format!("/api/rfqs/{}", rfq_id);

    let denied = call(
        &app,
        Method::PUT,
        &path,
        Some(&other),
        Some(json!({ "status": "closed" })),
        None,
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["code"], "RESOURCE_ACCESS_DENIED");

    let quoted = call(
        &app,
        Method::PUT,
        &path,
        Some(&owner),
        Some(json!({ "status": "quoted" })),
        None,
    )
    .await;
    assert_eq!(quoted.status, StatusCode::CONFLICT);
    assert_eq!(quoted.body["code"], "INVALID_STATUS_TRANSITION");

    let closed = call(
        &app,
        Method::PUT,
        &path,
        Some(&owner),
        Some(json!({ "status": "closed" })),
        None,
    )
    .await;
    assert_eq!(closed.status, StatusCode::OK);
    assert_eq!(closed.body["data"]["rfq"]["status"], "closed");

    let reopened = call(
        &app,
        Method::PUT,
        &path,
        Some(&owner),
        Some(json!({ "status": "open" })),
        None,
    )
    .await;
    assert_eq!(reopened.body["data"]["rfq"]["status"], "open");

    let delete_other = call(&app, Method::DELETE, &path, Some(&other), None, None).await;
    assert_eq!(delete_other.status, StatusCode::FORBIDDEN);

    let deleted = call(&app, Method::DELETE, &path, Some(&owner), None, None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["data"]["id"], rfq_id.as_str());

    let gone = call(&app, Method::GET, &path, None, None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quote_flow() {
    let app = test_app();
    let buyer = signup(&app, "buyer@example.com", "buyer").await;
    let supplier = supplier_with_profile(&app, "s1@example.com", "Volt Traders").await;
    let rival = supplier_with_profile(&app, "s2@example.com", "Amp House").await;
    let rfq_id = post_rfq(&app, &buyer, "500 kg copper wire", 500.0).await;

    // Supplier without a profile cannot quote
    let bare = signup(&app, "bare@example.com", "supplier").await;
    let no_profile = call(
        &app,
        Method::POST,
        "/api/quotes/create",
        Some(&bare),
        Some(quote_body(&rfq_id)),
        None,
    )
    .await;
    assert_eq!(no_profile.status, StatusCode::NOT_FOUND);
    assert_eq!(no_profile.body["code"], "SUPPLIER_PROFILE_NOT_FOUND");

    let first = call(
        &app,
        Method::POST,
        "/api/quotes/create",
        Some(&supplier),
        Some(quote_body(&rfq_id)),
        None,
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    assert_eq!(first.body["data"]["quote"]["status"], "pending");
    let quote_id = first.body["data"]["quote"]["id"].as_str().unwrap().to_string();

    let duplicate = call(
        &app,
        Method::POST,
        "/api/quotes/create",
        Some(&supplier),
        Some(quote_body(&rfq_id)),
        None,
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["code"], "QUOTE_ALREADY_SUBMITTED");
    assert_eq!(
        duplicate.body["error"],
        "You have already submitted a quote for this RFQ"
    );

    let second = call(
        &app,
        Method::POST,
        "/api/quotes/create",
        Some(&rival),
        Some(quote_body(&rfq_id)),
        None,
    )
    .await;
    assert_eq!(second.status, StatusCode::CREATED);

    // First quote moved the RFQ to quoted
    let path = format!("/api/rfqs/{}", rfq_id);
    let detail = call(&app, Method::GET, &path, Some(&buyer), None, None).await;
    assert_eq!(detail.body["data"]["rfq"]["status"], "quoted");
    assert_eq!(detail.body["data"]["rfq"]["quoteCount"], 2);
    assert_eq!(detail.body["data"]["quotes"].as_array().unwrap().len(), 2);

    // Suppliers only see their own quote
    let as_rival = call(&app, Method::GET, &path, Some(&rival), None, None).await;
    assert_eq!(as_rival.body["data"]["quotes"].as_array().unwrap().len(), 1);

    let anonymous = call(&app, Method::GET, &path, None, None, None).await;
    assert!(anonymous.body["data"]["quotes"].as_array().unwrap().is_empty());

    let mine = call(&app, Method::GET, "/api/suppliers/quotes", Some(&supplier), None, None).await;
    assert_eq!(mine.body["data"]["quotes"].as_array().unwrap().len(), 1);

    // Accepting closes the RFQ and rejects the rest
    let accept = call(
        &app,
        Method::PUT,
        &format!("/api/quotes/{}/status", quote_id),
        Some(&buyer),
        Some(json!({ "status": "accepted" })),
        None,
    )
    .await;
    assert_eq!(accept.status, StatusCode::OK, "{}", accept.body);
    assert_eq!(accept.body["data"]["quote"]["status"], "accepted");

    let after = call(&app, Method::GET, &path, Some(&buyer), None, None).await;
    assert_eq!(after.body["data"]["rfq"]["status"], "closed");
    let statuses: Vec<&str> = after.body["data"]["quotes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"accepted"));
    assert!(statuses.contains(&"rejected"));

    let latecomer = supplier_with_profile(&app, "s3@example.com", "Late Supplies").await;
    let late = call(
        &app,
        Method::POST,
        "/api/quotes/create",
        Some(&latecomer),
        Some(quote_body(&rfq_id)),
        None,
    )
    .await;
    assert_eq!(late.status, StatusCode::CONFLICT);
    assert_eq!(late.body["code"], "RFQ_NOT_OPEN");
}

#[tokio::test]
async fn test_idempotent_replay() {
    let app = test_app();
    let buyer = signup(&app, "buyer@example.com", "buyer").await;
    let supplier = supplier_with_profile(&app, "s1@example.com", "Volt Traders").await;
    let rfq_id = post_rfq(&app, &buyer, "Cable trays", 900.0).await;

    let key = "2b1f7c44-quote-attempt";
    let first = call(
        &app,
        Method::POST,
        "/api/quotes/create",
        Some(&supplier),
        Some(quote_body(&rfq_id)),
        Some(key),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert!(first.headers.get(IDEMPOTENT_REPLAYED_HEADER).is_none());

    let replay = call(
        &app,
        Method::POST,
        "/api/quotes/create",
        Some(&supplier),
        Some(quote_body(&rfq_id)),
        Some(key),
    )
    .await;
    assert_eq!(replay.status, StatusCode::CREATED);
    assert_eq!(replay.body, first.body);
    assert_eq!(replay.headers[IDEMPOTENT_REPLAYED_HEADER], "true");

    let mut changed = quote_body(&rfq_id);
    changed["price"] = json!(999.0);
    let reused = call(
        &app,
        Method::POST,
        "/api/quotes/create",
        Some(&supplier),
        Some(changed),
        Some(key),
    )
    .await;
    assert_eq!(reused.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reused.body["code"], "IDEMPOTENCY_KEY_REUSED");

    let detail = call(&app, Method::GET, &format!("/api/rfqs/{}", rfq_id), Some(&buyer), None, None).await;
    assert_eq!(detail.body["data"]["rfq"]["quoteCount"], 1);
}

#[tokio::test]
async fn test_my_rfqs_stats_and_dashboard() {
    let app = test_app();
    let buyer = signup(&app, "buyer@example.com", "buyer").await;
    post_rfq(&app, &buyer, "Copper wire", 500.0).await;
    let second = post_rfq(&app, &buyer, "Aluminium sheets", 200.0).await;
    let third = post_rfq(&app, &buyer, "Steel rods", 300.0).await;
    for id in [&second, &third] {
        let reply = call(
            &app,
            Method::PUT,
            &format!("/api/rfqs/{}", id),
            Some(&buyer),
            Some(json!({ "status": "closed" })),
            None,
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
    }

    let mine = call(&app, Method::GET, "/api/rfqs/my-rfqs", Some(&buyer), None, None).await;
    let stats = &mine.body["data"]["stats"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["open"], 1);
    assert_eq!(stats["closed"], 2);
    assert_eq!(stats["totalBudget"], 1000.0);

    let dashboard = call(&app, Method::GET, "/api/dashboard", Some(&buyer), None, None).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(dashboard.body["data"]["view"], "rfqs");
    let items = dashboard.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item["kind"] == "rfq"));
}

#[tokio::test]
async fn test_products_are_owned_by_their_supplier() {
    let app = test_app();
    let supplier = supplier_with_profile(&app, "s1@example.com", "Volt Traders").await;
    let rival = supplier_with_profile(&app, "s2@example.com", "Amp House").await;

    let created = call(
        &app,
        Method::POST,
        "/api/products/create",
        Some(&supplier),
        Some(json!({
            "name": "  PVC conduit  ",
            "category": "Electrical",
            "price": 35.5,
            "unit": "meter",
            "stock": 0,
        })),
        None,
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let product = &created.body["data"]["product"];
    assert_eq!(product["name"], "PVC conduit");
    assert_eq!(product["inStock"], false);
    let path = format!("/api/products/{}", product["id"].as_str().unwrap());

    let denied = call(
        &app,
        Method::PUT,
        &path,
        Some(&rival),
        Some(json!({ "stock": 10 })),
        None,
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let restocked = call(
        &app,
        Method::PUT,
        &path,
        Some(&supplier),
        Some(json!({ "stock": 10 })),
        None,
    )
    .await;
    assert_eq!(restocked.status, StatusCode::OK);
    assert_eq!(restocked.body["data"]["product"]["inStock"], true);

    let listed = call(&app, Method::GET, "/api/products?search=conduit", None, None, None).await;
    assert_eq!(listed.body["data"]["products"].as_array().unwrap().len(), 1);
    assert_eq!(listed.body["data"]["pagination"]["total"], 1);

    let deleted = call(&app, Method::DELETE, &path, Some(&supplier), None, None).await;
    assert_eq!(deleted.status, StatusCode::OK);
}

#[tokio::test]
async fn test_validation_and_unknown_routes() {
    let app = test_app();
    let buyer = signup(&app, "buyer@example.com", "buyer").await;

    let invalid = call(
        &app,
        Method::POST,
        "/api/rfqs",
        Some(&buyer),
        Some(json!({
            "title": "Copper wire",
            "description": "Looking for a reliable supplier",
            "category": "Electrical",
            "quantity": 0,
            "unit": "kg",
        })),
        None,
    )
    .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["field"], "quantity");

    let missing = call(&app, Method::GET, "/api/nowhere", None, None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], "NOT_FOUND");

    let bad_id = call(&app, Method::GET, "/api/rfqs/not-a-uuid", None, None, None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_out_of_range_input_is_a_client_error() {
    let app = test_app();
    let buyer = signup(&app, "buyer@example.com", "buyer").await;

    let rfq = |title: &str, budget: f64| {
        json!({
            "title": title,
            "description": "Looking for a reliable supplier",
            "category": "Electrical",
            "quantity": 10,
            "unit": "kg",
            "budget": budget,
        })
    };

    let huge = call(&app, Method::POST, "/api/rfqs", Some(&buyer), Some(rfq("Copper wire", 1e20)), None).await;
    assert_eq!(huge.status, StatusCode::BAD_REQUEST);
    assert_eq!(huge.body["code"], "INVALID_INPUT");
    assert_eq!(huge.body["field"], "budget");

    let blank = call(&app, Method::POST, "/api/rfqs", Some(&buyer), Some(rfq("     ", 100.0)), None).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["field"], "title");

    post_rfq(&app, &buyer, "Copper wire", 500.0).await;
    let far_page = call(&app, Method::GET, "/api/rfqs?page=4294967295", None, None, None).await;
    assert_eq!(far_page.status, StatusCode::OK);
    assert_eq!(far_page.body["data"]["rfqs"], json!([]));
    assert_eq!(far_page.body["data"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_store_counts_and_health() {
    let app = test_app();
    signup(&app, "buyer@example.com", "buyer").await;
    supplier_with_profile(&app, "s@example.com", "Volt Traders").await;

    let counts = call(&app, Method::GET, "/api/test", None, None, None).await;
    assert_eq!(counts.status, StatusCode::OK);
    assert_eq!(counts.body["data"]["backend"], "memory");
    assert_eq!(counts.body["data"]["users"], 2);
    assert_eq!(counts.body["data"]["suppliers"], 1);
    assert_eq!(counts.body["data"]["products"], 0);

    let health = call(&app, Method::GET, "/health", None, None, None).await;
    assert_eq!(health.status, StatusCode::OK);
}
