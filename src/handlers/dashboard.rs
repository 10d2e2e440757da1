use axum::extract::State;
use serde::Deserialize;
use utoipa::IntoParams;

use super::extractors::ApiQuery;
use super::response::Success;
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::Result;
use crate::models::{DashboardData, DashboardView};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// `rfqs` or `products`; defaults by role
    #[param(value_type = Option<String>)]
    pub view: Option<DashboardView>,
}

/// Dashboard list. Every item carries a `kind` tag (`rfq` or `product`)
/// that decides its edit and delete endpoints.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "dashboard",
    params(DashboardQuery),
    responses((status = 200, description = "Tagged items with stats", body = serde_json::Value)),
    security(("bearer_auth" = []))
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<DashboardQuery>,
) -> Result<Success<DashboardData>> {
    let data = state.dashboard_service.load(&claims, query.view).await?;
    Ok(Success(data))
}
