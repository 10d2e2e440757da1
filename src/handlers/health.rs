use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
}

/// Result of pinging the store
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreCheck {
    pub backend: String,
    pub reachable: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthState,
    pub version: String,
    pub environment: String,
    pub checked_at: DateTime<Utc>,
    pub store: StoreCheck,
}

impl HealthReport {
    fn from_store_check(environment: &str, store: StoreCheck) -> Self {
        let status = if store.reachable {
            HealthState::Healthy
        } else {
            HealthState::Degraded
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: environment.to_string(),
            checked_at: Utc::now(),
            store,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.status {
            HealthState::Healthy => StatusCode::OK,
            HealthState::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Liveness plus a store round trip
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthReport),
        (status = 503, description = "Store unreachable", body = HealthReport)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let started = Instant::now();
    let ping = state.store.ping().await;

    let check = StoreCheck {
        backend: state.store.backend().to_string(),
        reachable: ping.is_ok(),
        latency_ms: started.elapsed().as_millis() as u64,
        error: ping.err().map(|err| {
            error!(error = %err, "Store health check failed");
            err.to_string()
        }),
    };

    let report = HealthReport::from_store_check(&state.config.environment, check);
    (report.status_code(), Json(report))
}
