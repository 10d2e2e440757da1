use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Stable error codes carried in every failure envelope.
///
/// Clients switch on the code; the human-readable text is a lookup keyed by
/// the code (see [`ErrorCode::message`]) and is never parsed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication
    InvalidCredentials,
    TokenExpired,
    TokenInvalid,
    TokenMissing,

    // Authorization
    InsufficientPermissions,
    ResourceAccessDenied,
    RoleNotAuthorized,

    // Validation
    InvalidInput,
    MissingRequiredField,
    InvalidFormat,
    InvalidEmail,
    InvalidPhone,

    // Resource
    NotFound,
    AlreadyExists,

    // Marketplace rules
    SupplierProfileNotFound,
    QuoteAlreadySubmitted,
    RfqNotOpen,
    InvalidStatusTransition,
    QuoteAlreadyDecided,

    // Idempotency
    IdempotencyKeyReused,
    RequestInProgress,

    // Database
    DatabaseConnectionFailed,
    QueryFailed,

    // Internal
    InternalServerError,
}

impl ErrorCode {
    /// Numeric code, grouped by category
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::InvalidCredentials => 1001,
            ErrorCode::TokenExpired => 1002,
            ErrorCode::TokenInvalid => 1003,
            ErrorCode::TokenMissing => 1004,

            ErrorCode::InsufficientPermissions => 2001,
            ErrorCode::ResourceAccessDenied => 2002,
            ErrorCode::RoleNotAuthorized => 2003,

            ErrorCode::InvalidInput => 3001,
            ErrorCode::MissingRequiredField => 3002,
            ErrorCode::InvalidFormat => 3003,
            ErrorCode::InvalidEmail => 3006,
            ErrorCode::InvalidPhone => 3009,

            ErrorCode::NotFound => 4001,
            ErrorCode::AlreadyExists => 4002,

            ErrorCode::SupplierProfileNotFound => 5001,
            ErrorCode::QuoteAlreadySubmitted => 5002,
            ErrorCode::RfqNotOpen => 5003,
            ErrorCode::InvalidStatusTransition => 5004,
            ErrorCode::QuoteAlreadyDecided => 5005,

            ErrorCode::IdempotencyKeyReused => 6001,
            ErrorCode::RequestInProgress => 6002,

            ErrorCode::DatabaseConnectionFailed => 7001,
            ErrorCode::QueryFailed => 7002,

            ErrorCode::InternalServerError => 9999,
        }
    }

    /// User-facing message for this code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Your session has expired. Please sign in again",
            ErrorCode::TokenInvalid => "Invalid authentication token",
            ErrorCode::TokenMissing => "Please sign in to continue",

            ErrorCode::InsufficientPermissions => {
                "You don't have permission to perform this action"
            }
            ErrorCode::ResourceAccessDenied => "You can only modify your own listings",
            ErrorCode::RoleNotAuthorized => "Your account type is not allowed to do this",

            ErrorCode::InvalidInput => "Invalid input provided",
            ErrorCode::MissingRequiredField => "Required field is missing",
            ErrorCode::InvalidFormat => "Invalid format provided",
            ErrorCode::InvalidEmail => "Please enter a valid email address",
            ErrorCode::InvalidPhone => "Please enter a valid phone number",

            ErrorCode::NotFound => "The requested resource was not found",
            ErrorCode::AlreadyExists => "This resource already exists",

            ErrorCode::SupplierProfileNotFound => {
                "Supplier profile not found. Please complete your supplier profile first"
            }
            ErrorCode::QuoteAlreadySubmitted => "You have already submitted a quote for this RFQ",
            ErrorCode::RfqNotOpen => "This RFQ is no longer accepting quotes",
            ErrorCode::InvalidStatusTransition => "This status change is not allowed",
            ErrorCode::QuoteAlreadyDecided => "This quote has already been accepted or rejected",

            ErrorCode::IdempotencyKeyReused => {
                "This request key was already used with different data"
            }
            ErrorCode::RequestInProgress => "This request is already being processed",

            ErrorCode::DatabaseConnectionFailed => "Database connection failed",
            ErrorCode::QueryFailed => "Database query failed",

            ErrorCode::InternalServerError => "An internal server error occurred",
        }
    }

    /// Parse a wire code such as `"QUOTE_ALREADY_SUBMITTED"`
    pub fn from_wire(code: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(code.to_string())).ok()
    }
}

/// Failure envelope: `{success: false, error, code, ...}`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: ErrorCode,
    pub code_number: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub request_id: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("{1}")]
    WithCode(ErrorCode, String),

    #[error("{1}")]
    WithCodeAndDetails(ErrorCode, String, String),

    #[error("Validation failed: {field}")]
    ValidationWithField {
        code: ErrorCode,
        field: String,
        message: String,
    },
}

impl ApiError {
    /// Create error with specific error code
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError::WithCode(code, message.into())
    }

    /// Create error carrying only a code; the message is the code's lookup text
    pub fn code(code: ErrorCode) -> Self {
        ApiError::WithCode(code, code.message().to_string())
    }

    /// Create error with code and additional details
    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        ApiError::WithCodeAndDetails(code, message.into(), details.into())
    }

    /// Create validation error for specific field
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationWithField {
            code: ErrorCode::InvalidInput,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create general validation error
    pub fn validation_error(message: impl Into<String>, field: Option<&str>) -> Self {
        if let Some(field_name) = field {
            ApiError::ValidationWithField {
                code: ErrorCode::InvalidInput,
                field: field_name.to_string(),
                message: message.into(),
            }
        } else {
            ApiError::with_code(ErrorCode::InvalidInput, message)
        }
    }

    /// Helper: Resource not found
    pub fn not_found(resource: &str) -> Self {
        ApiError::with_code(ErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Helper: Resource already exists
    pub fn already_exists(resource: &str) -> Self {
        ApiError::with_code(
            ErrorCode::AlreadyExists,
            format!("{} already exists", resource),
        )
    }

    /// Helper: caller does not own the resource
    pub fn not_owner() -> Self {
        ApiError::code(ErrorCode::ResourceAccessDenied)
    }

    /// Helper: caller's role may not perform the action
    pub fn role_not_authorized(action: &str) -> Self {
        ApiError::with_details(
            ErrorCode::RoleNotAuthorized,
            ErrorCode::RoleNotAuthorized.message(),
            action.to_string(),
        )
    }

    /// Error code for this error
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Database(sqlx::Error::PoolTimedOut) => ErrorCode::DatabaseConnectionFailed,
            ApiError::Database(_) => ErrorCode::QueryFailed,
            ApiError::Internal(_) => ErrorCode::InternalServerError,
            ApiError::WithCode(code, _) => *code,
            ApiError::WithCodeAndDetails(code, _, _) => *code,
            ApiError::ValidationWithField { code, .. } => *code,
        }
    }

    fn error_details(&self) -> Option<String> {
        match self {
            ApiError::WithCodeAndDetails(_, _, details) => Some(details.clone()),
            _ => None,
        }
    }

    fn error_field(&self) -> Option<String> {
        match self {
            ApiError::ValidationWithField { field, .. } => Some(field.clone()),
            _ => None,
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self.error_code() {
            ErrorCode::InvalidCredentials
            | ErrorCode::TokenExpired
            | ErrorCode::TokenInvalid
            | ErrorCode::TokenMissing => StatusCode::UNAUTHORIZED,

            ErrorCode::InsufficientPermissions
            | ErrorCode::ResourceAccessDenied
            | ErrorCode::RoleNotAuthorized => StatusCode::FORBIDDEN,

            ErrorCode::InvalidInput
            | ErrorCode::MissingRequiredField
            | ErrorCode::InvalidFormat
            | ErrorCode::InvalidEmail
            | ErrorCode::InvalidPhone => StatusCode::BAD_REQUEST,

            ErrorCode::NotFound | ErrorCode::SupplierProfileNotFound => StatusCode::NOT_FOUND,

            ErrorCode::AlreadyExists
            | ErrorCode::QuoteAlreadySubmitted
            | ErrorCode::RfqNotOpen
            | ErrorCode::InvalidStatusTransition
            | ErrorCode::QuoteAlreadyDecided
            | ErrorCode::RequestInProgress => StatusCode::CONFLICT,

            ErrorCode::IdempotencyKeyReused => StatusCode::UNPROCESSABLE_ENTITY,

            ErrorCode::DatabaseConnectionFailed => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::QueryFailed | ErrorCode::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller. Server-side failures never leak internals.
    fn public_message(&self) -> String {
        match self {
            ApiError::WithCode(_, msg) | ApiError::WithCodeAndDetails(_, msg, _) => msg.clone(),
            ApiError::ValidationWithField { message, .. } => message.clone(),
            _ => self.error_code().message().to_string(),
        }
    }

    fn log_error(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<(String, String, String)> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    (field.to_string(), e.code.to_string(), message)
                })
            })
            .collect();
        fields.sort();

        match fields.into_iter().next() {
            Some((field, rule, message)) => {
                let code = match rule.as_str() {
                    "email" => ErrorCode::InvalidEmail,
                    "phone" => ErrorCode::InvalidPhone,
                    "required" => ErrorCode::MissingRequiredField,
                    "regex" => ErrorCode::InvalidFormat,
                    _ => ErrorCode::InvalidInput,
                };
                ApiError::ValidationWithField {
                    code,
                    field,
                    message,
                }
            }
            None => ApiError::code(ErrorCode::InvalidInput),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ApiError::code(ErrorCode::TokenExpired)
            }
            _ => ApiError::code(ErrorCode::TokenInvalid),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = crate::middleware::request_logger::current_request_id()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let status = self.status_code();
        let code = self.error_code();

        self.log_error(&request_id);

        let body = ErrorResponse {
            success: false,
            error: self.public_message(),
            code,
            code_number: code.code(),
            field: self.error_field(),
            details: self.error_details(),
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Handle Axum JSON rejections and convert to structured API errors
pub fn handle_rejection(err: JsonRejection) -> ApiError {
    match err {
        JsonRejection::JsonDataError(e) => ApiError::with_details(
            ErrorCode::InvalidInput,
            "Invalid input provided",
            e.body_text(),
        ),
        JsonRejection::JsonSyntaxError(_) => {
            ApiError::with_code(ErrorCode::InvalidFormat, "Invalid JSON format")
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::with_code(ErrorCode::InvalidFormat, "JSON content type required")
        }
        _ => ApiError::with_code(ErrorCode::InvalidInput, "Invalid request body format"),
    }
}
