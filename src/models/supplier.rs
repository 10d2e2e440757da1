use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{normalize_list, validate_non_negative, WEBSITE_RE};

/// Company-level profile of a supplier account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub industry: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    #[schema(value_type = f64, example = 4.5)]
    pub rating: Decimal,
    pub verified: bool,
    pub specialties: Vec<String>,
    #[schema(value_type = f64, example = 5000.0)]
    pub min_order_value: Decimal,
    pub established_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create-or-update payload for the caller's own supplier profile.
///
/// `rating` and `verified` are not accepted here.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpsertSupplierRequest {
    #[validate(length(min = 2, max = 200, message = "Company name must be between 2 and 200 characters"))]
    pub company_name: String,

    #[validate(length(min = 2, max = 100, message = "Industry is required"))]
    pub industry: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(max = 200))]
    pub location: Option<String>,

    #[validate(regex(path = *WEBSITE_RE, message = "Website must start with http:// or https://"))]
    pub website: Option<String>,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 specialties"))]
    pub specialties: Vec<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(value_type = f64)]
    pub min_order_value: Decimal,

    #[validate(range(min = 1800, max = 2100))]
    pub established_year: Option<i32>,
}

impl UpsertSupplierRequest {
    pub fn normalized(mut self) -> Self {
        self.company_name = self.company_name.trim().to_string();
        self.industry = self.industry.trim().to_string();
        self
    }

    pub fn normalized_specialties(&self) -> Vec<String> {
        normalize_list(&self.specialties)
    }
}

/// Query parameters for the public supplier directory
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierFilter {
    pub industry: Option<String>,
    pub verified: Option<bool>,
    pub search: Option<String>,
}

impl SupplierFilter {
    pub fn matches(&self, supplier: &Supplier) -> bool {
        if let Some(industry) = &self.industry {
            if !supplier.industry.eq_ignore_ascii_case(industry) {
                return false;
            }
        }
        if let Some(verified) = self.verified {
            if supplier.verified != verified {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_name = supplier.company_name.to_lowercase().contains(&needle);
            let in_specialties = supplier
                .specialties
                .iter()
                .any(|s| s.to_lowercase().contains(&needle));
            if !in_name && !in_specialties {
                return false;
            }
        }
        true
    }
}

/// Admin payload for the verification flag
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifySupplierRequest {
    pub verified: bool,
}
