use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::extractors::{ApiJson, ValidatedUuid};
use super::response::{Created, Success};
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::Result;
use crate::models::{CreateQuoteRequest, DecideQuoteRequest, Quote, QuoteStats};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuoteData {
    pub quote: Quote,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyQuotesData {
    pub quotes: Vec<Quote>,
    pub stats: QuoteStats,
}

/// Submit a quote on an RFQ that is not closed
#[utoipa::path(
    post,
    path = "/api/quotes/create",
    tag = "quotes",
    request_body = CreateQuoteRequest,
    responses(
        (status = 201, description = "Quote submitted", body = QuoteData),
        (status = 403, description = "Only suppliers quote"),
        (status = 404, description = "RFQ or supplier profile missing"),
        (status = 409, description = "RFQ closed or already quoted by this supplier")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_quote(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateQuoteRequest>,
) -> Result<Created<QuoteData>> {
    let quote = state.quote_service.submit(&claims, request).await?;
    Ok(Created(QuoteData { quote }))
}

/// Accept or reject a pending quote on one of the caller's RFQs
#[utoipa::path(
    put,
    path = "/api/quotes/{id}/status",
    tag = "quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    request_body = DecideQuoteRequest,
    responses(
        (status = 200, description = "Quote decided", body = QuoteData),
        (status = 403, description = "Not the RFQ owner"),
        (status = 409, description = "Quote already decided")
    ),
    security(("bearer_auth" = []))
)]
pub async fn decide_quote(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<DecideQuoteRequest>,
) -> Result<Success<QuoteData>> {
    let id = ValidatedUuid::parse(&id)?;
    let quote = state
        .quote_service
        .decide(&claims, id, request.status)
        .await?;
    Ok(Success(QuoteData { quote }))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/quotes",
    tag = "quotes",
    responses((status = 200, description = "The supplier's quotes with stats", body = MyQuotesData)),
    security(("bearer_auth" = []))
)]
pub async fn my_quotes(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Success<MyQuotesData>> {
    let (quotes, stats) = state.quote_service.my_quotes(&claims).await?;
    Ok(Success(MyQuotesData { quotes, stats }))
}
