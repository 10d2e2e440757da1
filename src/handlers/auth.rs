//! Signup and signin.

use axum::extract::State;

use super::extractors::ApiJson;
use super::response::{Created, Success};
use crate::app_state::AppState;
use crate::error::Result;
use crate::models::{AuthResponse, SigninRequest, SignupRequest};

/// Create a buyer or supplier account and return a session token
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Role may not self-register"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<Created<AuthResponse>> {
    let response = state.auth_service.signup(request).await?;
    Ok(Created(response))
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    tag = "auth",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SigninRequest>,
) -> Result<Success<AuthResponse>> {
    let response = state.auth_service.signin(request).await?;
    Ok(Success(response))
}
