//! Router configuration.
//!
//! One router carries every route. Authentication is decided per handler by
//! its extractors (`AuthenticatedUser` or `MaybeUser`); the auth middleware
//! only decodes a bearer token when one is present.

use std::time::Duration;

use axum::{
    http::{HeaderName, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app_state::AppState;
use crate::auth::middleware::auth_middleware;
use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::{
    auth, dashboard, diagnostics, health, loans, metrics, products, profile, quotes, rfqs,
    suppliers, ApiDoc,
};
use crate::middleware::{
    add_security_headers, idempotency_middleware, metrics_middleware, request_logger_middleware,
};

/// Marketplace API routes without state or layers
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        // RFQs
        .route("/api/rfqs", get(rfqs::list_rfqs).post(rfqs::create_rfq))
        .route("/api/rfqs/my-rfqs", get(rfqs::my_rfqs))
        .route(
            "/api/rfqs/{id}",
            get(rfqs::get_rfq)
                .put(rfqs::update_rfq_status)
                .delete(rfqs::delete_rfq),
        )
        // Products
        .route("/api/products", get(products::list_products))
        .route("/api/products/my-products", get(products::my_products))
        .route("/api/products/create", post(products::create_product))
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        // Quotes
        .route("/api/quotes/create", post(quotes::submit_quote))
        .route("/api/quotes/{id}/status", put(quotes::decide_quote))
        // Suppliers
        .route("/api/suppliers", get(suppliers::list_suppliers))
        .route("/api/suppliers/profile", get(suppliers::my_supplier_profile))
        .route("/api/suppliers/upsert", post(suppliers::upsert_supplier))
        .route("/api/suppliers/products", get(products::my_products))
        .route("/api/suppliers/quotes", get(quotes::my_quotes))
        .route("/api/suppliers/{id}", get(suppliers::get_supplier))
        .route("/api/suppliers/{id}/verify", put(suppliers::verify_supplier))
        // Shared profile, dashboard, loans
        .route(
            "/api/user/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/loans/submit", post(loans::submit_application))
        .route("/api/loans/my-applications", get(loans::my_applications))
        // Diagnostics
        .route("/api/test", get(diagnostics::store_counts))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::get_prometheus_metrics))
}

/// Build the application router with all middleware attached.
pub fn build_router(app_state: AppState) -> Router {
    let config = app_state.config.clone();

    api_routes()
        .fallback(route_not_found)
        // innermost first: idempotency needs the claims the auth layer inserts
        .layer(from_fn_with_state(
            app_state.idempotency.clone(),
            idempotency_middleware,
        ))
        .layer(from_fn_with_state(app_state.clone(), auth_middleware))
        .layer(from_fn(metrics_middleware))
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_logger_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(add_security_headers))
                .layer(cors_layer(&config))
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(config.request_timeout),
                )),
        )
        .with_state(app_state)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route")
}

/// CORS policy from `CORS_ALLOWED_ORIGINS`; permissive only in development
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        if config.is_production() {
            return CorsLayer::new();
        }
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static("idempotent-replayed"),
        ])
}
