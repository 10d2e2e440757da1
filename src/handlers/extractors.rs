//! Extractors that report failures in the API error envelope instead of
//! axum's plain-text rejections.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::database::repository::Pagination;
use crate::error::{handle_rejection, ApiError, ErrorCode};

/// Validated UUID helper for path segments
pub struct ValidatedUuid;

impl ValidatedUuid {
    /// Parse a string into a UUID, returning an ApiError on failure
    pub fn parse(s: &str) -> Result<Uuid, ApiError> {
        Uuid::parse_str(s)
            .map_err(|_| ApiError::validation_error(format!("Invalid id: {}", s), Some("id")))
    }
}

/// `Json<T>` whose rejection is an [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(handle_rejection)?;
        Ok(ApiJson(value))
    }
}

/// `Query<T>` whose rejection is an [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err: QueryRejection| {
                ApiError::with_details(
                    ErrorCode::InvalidInput,
                    "Invalid query parameters",
                    err.body_text(),
                )
            })?;
        Ok(ApiQuery(value))
    }
}

/// Page and page size as sent in list query strings (`page`, `perPage`)
pub fn pagination(page: Option<u32>, per_page: Option<u32>) -> Pagination {
    let defaults = Pagination::default();
    Pagination::new(
        page.unwrap_or(defaults.page),
        per_page.unwrap_or(defaults.per_page),
    )
}
