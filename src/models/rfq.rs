use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::database::schema::types::RfqStatus;
use crate::utils::validation::{validate_non_negative, CURRENCY_RE};

/// Request for quotation posted by a buyer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rfq {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub quantity: i32,
    pub unit: String,
    #[schema(value_type = Option<f64>, example = 500.0)]
    pub budget: Option<Decimal>,
    pub currency: String,
    pub deadline: Option<NaiveDate>,
    pub delivery_location: Option<String>,
    pub status: RfqStatus,
    pub quote_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RfqStatus {
    /// Whether the owning buyer may move an RFQ from `self` to `next`.
    ///
    /// `quoted` is only ever reached by a supplier submitting a quote.
    pub fn can_transition_to(self, next: RfqStatus) -> bool {
        matches!(
            (self, next),
            (RfqStatus::Open, RfqStatus::Closed)
                | (RfqStatus::Closed, RfqStatus::Open)
                | (RfqStatus::Quoted, RfqStatus::Closed)
        )
    }

    /// Status a dashboard toggle moves to
    pub fn toggled(self) -> RfqStatus {
        match self {
            RfqStatus::Open | RfqStatus::Quoted => RfqStatus::Closed,
            RfqStatus::Closed => RfqStatus::Open,
        }
    }

    /// Whether suppliers may still quote
    pub fn accepts_quotes(self) -> bool {
        !matches!(self, RfqStatus::Closed)
    }

    /// Display label used on dashboards
    pub fn label(self) -> &'static str {
        match self {
            RfqStatus::Open => "Open",
            RfqStatus::Quoted => "Quoted",
            RfqStatus::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRfqRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    #[schema(example = "500 kg copper wire, 2.5mm")]
    pub title: String,

    #[validate(length(min = 10, max = 5000, message = "Description must be at least 10 characters"))]
    pub description: String,

    #[validate(length(min = 2, max = 100, message = "Category is required"))]
    pub category: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    #[validate(length(min = 1, max = 50, message = "Unit is required"))]
    pub unit: String,

    #[validate(custom(function = "validate_non_negative"))]
    #[schema(value_type = Option<f64>)]
    pub budget: Option<Decimal>,

    #[serde(default = "default_currency")]
    #[validate(regex(path = *CURRENCY_RE, message = "Currency must be a 3-letter code"))]
    pub currency: String,

    pub deadline: Option<NaiveDate>,

    #[validate(length(max = 300))]
    pub delivery_location: Option<String>,
}

impl CreateRfqRequest {
    /// Trim free text so length rules apply to what gets stored
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.category = self.category.trim().to_string();
        self.unit = self.unit.trim().to_string();
        self.currency = self.currency.trim().to_uppercase();
        self.delivery_location = self
            .delivery_location
            .map(|loc| loc.trim().to_string())
            .filter(|loc| !loc.is_empty());
        self
    }
}

/// Body of `PUT /api/rfqs/{id}`
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRfqStatusRequest {
    pub status: RfqStatus,
}

/// Query parameters for the public RFQ board
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfqFilter {
    pub status: Option<RfqStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl RfqFilter {
    pub fn matches(&self, rfq: &Rfq) -> bool {
        if let Some(status) = self.status {
            if rfq.status != status {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !rfq.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !rfq.title.to_lowercase().contains(&needle)
                && !rfq.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Buyer dashboard summary. An RFQ without a budget contributes zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfqStats {
    pub total: usize,
    pub open: usize,
    pub quoted: usize,
    pub closed: usize,
    #[schema(value_type = f64)]
    pub total_budget: Decimal,
}

impl RfqStats {
    pub fn from_rfqs(rfqs: &[Rfq]) -> Self {
        rfqs.iter().fold(Self::default(), |mut stats, rfq| {
            stats.total += 1;
            match rfq.status {
                RfqStatus::Open => stats.open += 1,
                RfqStatus::Quoted => stats.quoted += 1,
                RfqStatus::Closed => stats.closed += 1,
            }
            stats.total_budget = stats
                .total_budget
                .saturating_add(rfq.budget.unwrap_or(Decimal::ZERO));
            stats
        })
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rfq(status: RfqStatus, budget: Option<i64>) -> Rfq {
        let now = Utc::now();
        Rfq {
            id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            title: "Steel rods".to_string(),
            description: "TMT bars for construction".to_string(),
            category: "Construction".to_string(),
            quantity: 10,
            unit: "ton".to_string(),
            budget: budget.map(Decimal::from),
            currency: "INR".to_string(),
            deadline: None,
            delivery_location: None,
            status,
            quote_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_buyer_dashboard_stats() {
        let rfqs = vec![
            rfq(RfqStatus::Open, Some(500)),
            rfq(RfqStatus::Closed, Some(200)),
            rfq(RfqStatus::Closed, Some(300)),
        ];
        let stats = RfqStats::from_rfqs(&rfqs);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.open, 1);
        assert_eq!(stats.closed, 2);
        assert_eq!(stats.total_budget, Decimal::from(1000));
    }

    #[test]
    fn test_missing_budget_counts_as_zero() {
        let stats = RfqStats::from_rfqs(&[rfq(RfqStatus::Quoted, None), rfq(RfqStatus::Open, Some(7))]);
        assert_eq!(stats.quoted, 1);
        assert_eq!(stats.total_budget, Decimal::from(7));
    }

    #[test]
    fn test_budget_total_saturates() {
        let mut big = rfq(RfqStatus::Open, None);
        big.budget = Some(Decimal::MAX);
        let stats = RfqStats::from_rfqs(&[big.clone(), big, rfq(RfqStatus::Open, Some(1))]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.total_budget, Decimal::MAX);
    }

    #[test]
    fn test_transitions() {
        assert!(RfqStatus::Open.can_transition_to(RfqStatus::Closed));
        assert!(RfqStatus::Closed.can_transition_to(RfqStatus::Open));
        assert!(RfqStatus::Quoted.can_transition_to(RfqStatus::Closed));
        assert!(!RfqStatus::Open.can_transition_to(RfqStatus::Quoted));
        assert!(!RfqStatus::Closed.can_transition_to(RfqStatus::Quoted));
        assert_eq!(RfqStatus::Quoted.toggled(), RfqStatus::Closed);
        assert_eq!(RfqStatus::Open.toggled().toggled(), RfqStatus::Open);
    }

    fn status_strategy() -> impl Strategy<Value = RfqStatus> {
        prop_oneof![
            Just(RfqStatus::Open),
            Just(RfqStatus::Quoted),
            Just(RfqStatus::Closed),
        ]
    }

    proptest! {
        #[test]
        fn prop_stats_partition_total(entries in prop::collection::vec((status_strategy(), prop::option::of(0i64..1_000_000)), 0..40)) {
            let rfqs: Vec<Rfq> = entries.iter().map(|(s, b)| rfq(*s, *b)).collect();
            let stats = RfqStats::from_rfqs(&rfqs);
            prop_assert_eq!(stats.total, rfqs.len());
            prop_assert_eq!(stats.open + stats.quoted + stats.closed, stats.total);
            let expected: i64 = entries.iter().map(|(_, b)| b.unwrap_or(0)).sum();
            prop_assert_eq!(stats.total_budget, Decimal::from(expected));
        }
    }
}
