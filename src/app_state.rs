//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::auth::{JwtService, PasswordService};
use crate::config::Config;
use crate::database::MarketplaceStore;
use crate::services::{
    AuthService, DashboardService, IdempotencyStore, LoanService, ProductService, ProfileService,
    QuoteService, RfqService, SupplierService,
};

/// Cloned into every request; all members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Persistence backend (PostgreSQL or in-memory)
    pub store: Arc<dyn MarketplaceStore>,
    pub jwt_service: JwtService,
    pub auth_service: AuthService,
    pub rfq_service: RfqService,
    pub quote_service: QuoteService,
    pub product_service: ProductService,
    pub supplier_service: SupplierService,
    pub profile_service: ProfileService,
    pub loan_service: LoanService,
    pub dashboard_service: DashboardService,
    /// Replay cache for `Idempotency-Key` requests
    pub idempotency: IdempotencyStore,
    /// Renders the Prometheus exposition text for `/metrics`
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn MarketplaceStore>,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration);
        let passwords = PasswordService::new(config.bcrypt_cost);
        let idempotency = IdempotencyStore::new(Duration::from_secs(config.idempotency_ttl));

        Self {
            auth_service: AuthService::new(store.clone(), jwt_service.clone(), passwords),
            rfq_service: RfqService::new(store.clone()),
            quote_service: QuoteService::new(store.clone()),
            product_service: ProductService::new(store.clone()),
            supplier_service: SupplierService::new(store.clone()),
            profile_service: ProfileService::new(store.clone()),
            loan_service: LoanService::new(store.clone()),
            dashboard_service: DashboardService::new(store.clone()),
            config: Arc::new(config),
            store,
            jwt_service,
            idempotency,
            metrics_handle,
        }
    }
}

impl FromRef<AppState> for IdempotencyStore {
    fn from_ref(state: &AppState) -> Self {
        state.idempotency.clone()
    }
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_service.clone()
    }
}
