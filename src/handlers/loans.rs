use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extractors::ApiJson;
use super::response::{Created, Success};
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::Result;
use crate::models::{LoanApplication, LoanApplicationRequest};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoanApplicationData {
    pub application: LoanApplication,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoanApplicationsData {
    pub applications: Vec<LoanApplication>,
}

/// Record a business loan referral lead
#[utoipa::path(
    post,
    path = "/api/loans/submit",
    tag = "loans",
    request_body = LoanApplicationRequest,
    responses(
        (status = 201, description = "Application received", body = LoanApplicationData),
        (status = 400, description = "Invalid form"),
        (status = 401, description = "Sign in required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_application(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<LoanApplicationRequest>,
) -> Result<Created<LoanApplicationData>> {
    let application = state.loan_service.submit(&claims, request).await?;
    Ok(Created(LoanApplicationData { application }))
}

#[utoipa::path(
    get,
    path = "/api/loans/my-applications",
    tag = "loans",
    responses((status = 200, description = "Caller's applications", body = LoanApplicationsData)),
    security(("bearer_auth" = []))
)]
pub async fn my_applications(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Success<LoanApplicationsData>> {
    let applications = state.loan_service.my_applications(&claims).await?;
    Ok(Success(LoanApplicationsData { applications }))
}
