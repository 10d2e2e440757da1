//! Supplier directory and supplier self-service profile.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::extractors::{pagination, ApiJson, ApiQuery, ValidatedUuid};
use super::response::Success;
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::database::repository::PageInfo;
use crate::error::Result;
use crate::models::{
    Product, Supplier, SupplierFilter, UpsertSupplierRequest, VerifySupplierRequest,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SupplierListQuery {
    pub industry: Option<String>,
    pub verified: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupplierListData {
    pub suppliers: Vec<Supplier>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupplierData {
    pub supplier: Supplier,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupplierPageData {
    pub supplier: Supplier,
    pub products: Vec<Product>,
}

#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "suppliers",
    params(SupplierListQuery),
    responses((status = 200, description = "Page of suppliers", body = SupplierListData))
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SupplierListQuery>,
) -> Result<Success<SupplierListData>> {
    let filter = SupplierFilter {
        industry: query.industry,
        verified: query.verified,
        search: query.search,
    };
    let page = state
        .supplier_service
        .list(&filter, &pagination(query.page, query.per_page))
        .await?;
    let (suppliers, pagination) = page.into_parts();
    Ok(Success(SupplierListData {
        suppliers,
        pagination,
    }))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    tag = "suppliers",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier with catalogue", body = SupplierPageData),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Success<SupplierPageData>> {
    let id = ValidatedUuid::parse(&id)?;
    let (supplier, products) = state.supplier_service.get_with_products(id).await?;
    Ok(Success(SupplierPageData { supplier, products }))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/profile",
    tag = "suppliers",
    responses(
        (status = 200, description = "Own supplier profile", body = SupplierData),
        (status = 404, description = "Profile not created yet")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_supplier_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Success<SupplierData>> {
    let supplier = state.supplier_service.my_profile(&claims).await?;
    Ok(Success(SupplierData { supplier }))
}

#[utoipa::path(
    post,
    path = "/api/suppliers/upsert",
    tag = "suppliers",
    request_body = UpsertSupplierRequest,
    responses(
        (status = 200, description = "Profile saved", body = SupplierData),
        (status = 403, description = "Only suppliers have a supplier profile")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert_supplier(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<UpsertSupplierRequest>,
) -> Result<Success<SupplierData>> {
    let supplier = state.supplier_service.upsert(&claims, request).await?;
    Ok(Success(SupplierData { supplier }))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}/verify",
    tag = "suppliers",
    params(("id" = Uuid, Path, description = "Supplier id")),
    request_body = VerifySupplierRequest,
    responses(
        (status = 200, description = "Verification flag set", body = SupplierData),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn verify_supplier(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<VerifySupplierRequest>,
) -> Result<Success<SupplierData>> {
    let id = ValidatedUuid::parse(&id)?;
    let supplier = state
        .supplier_service
        .set_verified(&claims, id, request.verified)
        .await?;
    Ok(Success(SupplierData { supplier }))
}
