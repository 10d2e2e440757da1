use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::app_state::AppState;
use crate::auth::Claims;
use crate::error::{ApiError, ErrorCode};

/// Pull the token out of an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// JWT authentication middleware.
///
/// Runs on every route. A request without a bearer token passes through
/// anonymously; a token that fails verification is rejected with 401. Routes
/// that need a user enforce it with the [`AuthenticatedUser`] extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return next.run(request).await;
    };

    match state.jwt_service.decode_token(token) {
        Ok(claims) => {
            debug!(user_id = %claims.sub, role = %claims.role, "Authenticated request");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            metrics::counter!("auth_attempts_total", "result" => "invalid_token").increment(1);
            err.into_response()
        }
    }
}

/// Extractor for authenticated user claims
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| ApiError::code(ErrorCode::TokenMissing))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Claims when the caller sent a valid token, `None` for anonymous callers
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Claims>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<Claims>().cloned()))
    }
}
