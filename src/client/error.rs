use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::error::ErrorCode;

const GENERIC_MESSAGE: &str = "Something went wrong. Please try again";

/// Errors surfaced by [`TradeMartClient`](super::TradeMartClient) and the
/// form and dashboard helpers built on it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connect, timeout, TLS
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with the error envelope
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
        field: Option<String>,
    },

    /// Rejected locally, before any request was made
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Another action on the same item has not finished yet
    #[error("An action on {0} is already in progress")]
    ActionInFlight(Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the envelope
    #[error("Parse error: {0}")]
    Parse(String),

    /// Draft storage could not be read or written
    #[error("Draft storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Error code reported by the server, if any
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => *code,
            ClientError::NotFound(_) => Some(ErrorCode::NotFound),
            _ => None,
        }
    }

    /// Message to show the user.
    ///
    /// Server errors are looked up by code. Validation-family codes carry a
    /// field-specific server message, which is preferred over the generic
    /// text. Unknown codes fall back to the server text, then to a generic line.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { code, message, .. } => match code {
                Some(code) if is_field_code(*code) && !message.is_empty() => message.clone(),
                Some(code) => code.message().to_string(),
                None if !message.is_empty() => message.clone(),
                None => GENERIC_MESSAGE.to_string(),
            },
            ClientError::Validation { message, .. } => message.clone(),
            ClientError::ActionInFlight(_) => ErrorCode::RequestInProgress.message().to_string(),
            ClientError::NotFound(_) => ErrorCode::NotFound.message().to_string(),
            ClientError::Http(_) | ClientError::Parse(_) | ClientError::Storage(_) => {
                GENERIC_MESSAGE.to_string()
            }
        }
    }

    /// True when the caller must sign in (again) before retrying
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::TokenMissing | ErrorCode::TokenExpired | ErrorCode::TokenInvalid)
        )
    }

    /// First failing field of a `validator` run, in field-name order
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    (field.to_string(), message)
                })
            })
            .collect();
        fields.sort();

        match fields.into_iter().next() {
            Some((field, message)) => ClientError::Validation { field, message },
            None => ClientError::Validation {
                field: "form".to_string(),
                message: ErrorCode::InvalidInput.message().to_string(),
            },
        }
    }
}

fn is_field_code(code: ErrorCode) -> bool {
    matches!(
        code,
        ErrorCode::InvalidInput
            | ErrorCode::MissingRequiredField
            | ErrorCode::InvalidFormat
            | ErrorCode::InvalidEmail
            | ErrorCode::InvalidPhone
    )
}
