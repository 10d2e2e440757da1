use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::response::Success;
use crate::app_state::AppState;
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreCounts {
    pub backend: String,
    pub users: i64,
    pub suppliers: i64,
    pub products: i64,
}

/// Connectivity check: proves the store answers by counting rows
#[utoipa::path(
    get,
    path = "/api/test",
    tag = "health",
    responses(
        (status = 200, description = "Row counts", body = StoreCounts),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn store_counts(State(state): State<AppState>) -> Result<Success<StoreCounts>> {
    let store = &state.store;
    let (users, suppliers, products) = tokio::try_join!(
        store.count_users(),
        store.count_suppliers(),
        store.count_products()
    )?;

    Ok(Success(StoreCounts {
        backend: store.backend().to_string(),
        users,
        suppliers,
        products,
    }))
}
