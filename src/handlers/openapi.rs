use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TradeMart Marketplace API",
        description = "RFQs, quotes, supplier catalogues and loan referrals for B2B buyers and suppliers"
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::diagnostics::store_counts,
        crate::handlers::metrics::get_prometheus_metrics,
        crate::handlers::auth::signup,
        crate::handlers::auth::signin,
        crate::handlers::rfqs::list_rfqs,
        crate::handlers::rfqs::create_rfq,
        crate::handlers::rfqs::my_rfqs,
        crate::handlers::rfqs::get_rfq,
        crate::handlers::rfqs::update_rfq_status,
        crate::handlers::rfqs::delete_rfq,
        crate::handlers::products::list_products,
        crate::handlers::products::my_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::quotes::submit_quote,
        crate::handlers::quotes::decide_quote,
        crate::handlers::quotes::my_quotes,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::my_supplier_profile,
        crate::handlers::suppliers::upsert_supplier,
        crate::handlers::suppliers::verify_supplier,
        crate::handlers::profile::get_profile,
        crate::handlers::profile::update_profile,
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::loans::submit_application,
        crate::handlers::loans::my_applications,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Signup and signin"),
        (name = "rfqs", description = "Requests for quotation"),
        (name = "quotes", description = "Supplier quotes"),
        (name = "products", description = "Product catalogue"),
        (name = "suppliers", description = "Supplier directory and profiles"),
        (name = "profile", description = "Shared user profile"),
        (name = "dashboard", description = "Role dashboard"),
        (name = "loans", description = "Business loan referrals"),
        (name = "health", description = "Liveness and diagnostics"),
        (name = "metrics", description = "Prometheus metrics")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
