use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::database::schema::types::LoanStatus;
use crate::utils::validation::{validate_non_negative, validate_phone, validate_positive, GST_RE, PINCODE_RE};

/// Business-loan referral lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub business_name: String,
    pub business_type: String,
    #[schema(value_type = Option<f64>)]
    pub annual_turnover: Option<Decimal>,
    #[schema(value_type = f64, example = 500000.0)]
    pub loan_amount: Decimal,
    pub loan_purpose: String,
    pub city: String,
    pub pincode: Option<String>,
    pub gst_number: Option<String>,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
}

/// Loan form fields as submitted by the client
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanApplicationRequest {
    #[validate(length(min = 2, max = 100, message = "Full name is required"))]
    pub full_name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[validate(length(min = 2, max = 200, message = "Business name is required"))]
    pub business_name: String,

    #[validate(length(min = 2, max = 100, message = "Business type is required"))]
    pub business_type: String,

    #[validate(custom(function = "validate_non_negative"))]
    #[schema(value_type = Option<f64>)]
    pub annual_turnover: Option<Decimal>,

    #[validate(custom(function = "validate_positive"))]
    #[schema(value_type = f64)]
    pub loan_amount: Decimal,

    #[validate(length(min = 3, max = 1000, message = "Loan purpose is required"))]
    pub loan_purpose: String,

    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: String,

    #[validate(regex(path = *PINCODE_RE, message = "Pincode must be 6 digits"))]
    pub pincode: Option<String>,

    #[validate(regex(path = *GST_RE, message = "Please enter a valid GST number"))]
    pub gst_number: Option<String>,
}
