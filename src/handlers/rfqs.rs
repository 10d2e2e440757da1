//! RFQ board and buyer RFQ management.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::extractors::{pagination, ApiJson, ApiQuery, ValidatedUuid};
use super::response::{Created, Success};
use crate::app_state::AppState;
use crate::auth::{AuthenticatedUser, MaybeUser};
use crate::database::repository::PageInfo;
use crate::database::schema::types::RfqStatus;
use crate::error::Result;
use crate::services::RfqDetail;
use crate::models::{CreateRfqRequest, Rfq, RfqFilter, RfqStats, UpdateRfqStatusRequest};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RfqListQuery {
    pub status: Option<RfqStatus>,
    pub category: Option<String>,
    /// Matches title, description or category
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfqListData {
    pub rfqs: Vec<Rfq>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RfqData {
    pub rfq: Rfq,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyRfqsData {
    pub rfqs: Vec<Rfq>,
    pub stats: RfqStats,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedData {
    pub id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/rfqs",
    tag = "rfqs",
    params(RfqListQuery),
    responses((status = 200, description = "Page of RFQs, newest first", body = RfqListData))
)]
pub async fn list_rfqs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RfqListQuery>,
) -> Result<Success<RfqListData>> {
    let filter = RfqFilter {
        status: query.status,
        category: query.category,
        search: query.search,
    };
    let page = state
        .rfq_service
        .list(&filter, &pagination(query.page, query.per_page))
        .await?;
    let (rfqs, pagination) = page.into_parts();
    Ok(Success(RfqListData { rfqs, pagination }))
}

#[utoipa::path(
    post,
    path = "/api/rfqs",
    tag = "rfqs",
    request_body = CreateRfqRequest,
    responses(
        (status = 201, description = "RFQ posted", body = RfqData),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Only buyers post RFQs")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_rfq(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateRfqRequest>,
) -> Result<Created<RfqData>> {
    let rfq = state.rfq_service.create(&claims, request).await?;
    Ok(Created(RfqData { rfq }))
}

#[utoipa::path(
    get,
    path = "/api/rfqs/my-rfqs",
    tag = "rfqs",
    responses((status = 200, description = "The buyer's RFQs with stats", body = MyRfqsData)),
    security(("bearer_auth" = []))
)]
pub async fn my_rfqs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Success<MyRfqsData>> {
    let (rfqs, stats) = state.rfq_service.my_rfqs(&claims).await?;
    Ok(Success(MyRfqsData { rfqs, stats }))
}

#[utoipa::path(
    get,
    path = "/api/rfqs/{id}",
    tag = "rfqs",
    params(("id" = Uuid, Path, description = "RFQ id")),
    responses(
        (status = 200, description = "RFQ with the quotes visible to the caller", body = RfqDetail),
        (status = 404, description = "RFQ not found")
    )
)]
pub async fn get_rfq(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
    Path(id): Path<String>,
) -> Result<Success<RfqDetail>> {
    let id = ValidatedUuid::parse(&id)?;
    let detail = state.rfq_service.detail(claims.as_ref(), id).await?;
    Ok(Success(detail))
}

#[utoipa::path(
    put,
    path = "/api/rfqs/{id}",
    tag = "rfqs",
    params(("id" = Uuid, Path, description = "RFQ id")),
    request_body = UpdateRfqStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = RfqData),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Transition not allowed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_rfq_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateRfqStatusRequest>,
) -> Result<Success<RfqData>> {
    let id = ValidatedUuid::parse(&id)?;
    let rfq = state
        .rfq_service
        .update_status(&claims, id, request.status)
        .await?;
    Ok(Success(RfqData { rfq }))
}

#[utoipa::path(
    delete,
    path = "/api/rfqs/{id}",
    tag = "rfqs",
    params(("id" = Uuid, Path, description = "RFQ id")),
    responses(
        (status = 200, description = "RFQ and its quotes removed", body = DeletedData),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_rfq(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Success<DeletedData>> {
    let id = ValidatedUuid::parse(&id)?;
    let id = state.rfq_service.delete(&claims, id).await?;
    Ok(Success(DeletedData { id }))
}
