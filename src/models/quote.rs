use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::database::schema::types::QuoteStatus;
use crate::utils::validation::{validate_positive, CURRENCY_RE};

/// A supplier's priced response to an RFQ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    pub rfq_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    #[schema(value_type = f64, example = 450.0)]
    pub price: Decimal,
    pub currency: String,
    pub lead_time: String,
    pub notes: Option<String>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub rfq_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    #[schema(value_type = f64)]
    pub price: Decimal,

    #[serde(default = "default_currency")]
    #[validate(regex(path = *CURRENCY_RE, message = "Currency must be a 3-letter code"))]
    pub currency: String,

    #[validate(length(min = 1, max = 100, message = "Lead time is required"))]
    #[schema(example = "2 weeks")]
    pub lead_time: String,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Body of `PUT /api/quotes/{id}/status`
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecideQuoteRequest {
    pub status: QuoteStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteStats {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl QuoteStats {
    pub fn from_quotes(quotes: &[Quote]) -> Self {
        quotes.iter().fold(Self::default(), |mut stats, q| {
            stats.total += 1;
            match q.status {
                QuoteStatus::Pending => stats.pending += 1,
                QuoteStatus::Accepted => stats.accepted += 1,
                QuoteStatus::Rejected => stats.rejected += 1,
            }
            stats
        })
    }
}

fn default_currency() -> String {
    "INR".to_string()
}
