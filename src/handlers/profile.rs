use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extractors::ApiJson;
use super::response::Success;
use crate::app_state::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::Result;
use crate::models::{UpdateProfileRequest, User};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserData {
    pub user: User,
}

#[utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "profile",
    responses((status = 200, description = "Caller's profile", body = UserData)),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Success<UserData>> {
    let user = state.profile_service.get(&claims).await?;
    Ok(Success(UserData { user }))
}

/// Update shared profile fields. The role cannot be changed here.
#[utoipa::path(
    put,
    path = "/api/user/profile",
    tag = "profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserData),
        (status = 400, description = "Invalid or empty update")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Success<UserData>> {
    let user = state.profile_service.update(&claims, request).await?;
    Ok(Success(UserData { user }))
}
