use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::require_supplier_profile;
use crate::auth::Claims;
use crate::database::repository::NewQuote;
use crate::database::schema::types::QuoteStatus;
use crate::database::MarketplaceStore;
use crate::error::{ApiError, ErrorCode, Result};
use crate::models::{CreateQuoteRequest, Quote, QuoteStats};

#[derive(Clone)]
pub struct QuoteService {
    store: Arc<dyn MarketplaceStore>,
}

impl QuoteService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    /// Submit a quote. Checks run in a fixed order so the caller always gets
    /// the most fundamental failure: role, supplier profile, RFQ existence,
    /// RFQ state, field validity, then the one-quote-per-supplier rule.
    pub async fn submit(&self, caller: &Claims, request: CreateQuoteRequest) -> Result<Quote> {
        caller.authorize("quotes:submit", "submit quotes")?;
        let supplier = require_supplier_profile(&self.store, caller).await?;

        let rfq = self
            .store
            .find_rfq(request.rfq_id)
            .await?
            .ok_or_else(|| ApiError::not_found("RFQ"))?;
        if !rfq.status.accepts_quotes() {
            return Err(ApiError::code(ErrorCode::RfqNotOpen));
        }

        request.validate()?;
        let lead_time = request.lead_time.trim();
        if lead_time.is_empty() {
            return Err(ApiError::validation_field("lead_time", "Lead time is required"));
        }

        let quote = self
            .store
            .insert_quote(NewQuote {
                rfq_id: rfq.id,
                supplier_id: supplier.id,
                supplier_name: supplier.company_name.clone(),
                price: request.price,
                currency: request.currency.clone(),
                lead_time: lead_time.to_string(),
                notes: request.notes.clone(),
            })
            .await?;

        info!(quote_id = %quote.id, rfq_id = %rfq.id, supplier_id = %supplier.id, "Quote submitted");
        metrics::counter!("quotes_submitted_total").increment(1);
        Ok(quote)
    }

    /// Accept or reject a pending quote on one of the caller's RFQs
    pub async fn decide(&self, caller: &Claims, quote_id: Uuid, status: QuoteStatus) -> Result<Quote> {
        if status == QuoteStatus::Pending {
            return Err(ApiError::validation_field(
                "status",
                "Status must be accepted or rejected",
            ));
        }

        let quote = self
            .store
            .find_quote(quote_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Quote"))?;
        let rfq = self
            .store
            .find_rfq(quote.rfq_id)
            .await?
            .ok_or_else(|| ApiError::not_found("RFQ"))?;
        if rfq.buyer_id != caller.sub {
            return Err(ApiError::not_owner());
        }
        if quote.status != QuoteStatus::Pending {
            return Err(ApiError::code(ErrorCode::QuoteAlreadyDecided));
        }

        let decided = self.store.decide_quote(quote_id, status).await?;
        info!(quote_id = %quote_id, rfq_id = %rfq.id, status = %status, "Quote decided");
        Ok(decided)
    }

    /// Quotes the calling supplier has submitted. Empty until a profile exists.
    pub async fn my_quotes(&self, caller: &Claims) -> Result<(Vec<Quote>, QuoteStats)> {
        caller.authorize("quotes:read", "view supplier quotes")?;
        let quotes = match self.store.find_supplier_by_user(caller.sub).await? {
            Some(supplier) => self.store.quotes_by_supplier(supplier.id).await?,
            None => Vec::new(),
        };
        let stats = QuoteStats::from_quotes(&quotes);
        Ok((quotes, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::types::{RfqStatus, UserRole};
    use crate::services::{test_support, RfqService};
    use rust_decimal::Decimal;

    fn quote_request(rfq_id: Uuid, price: i64) -> CreateQuoteRequest {
        CreateQuoteRequest {
            rfq_id,
            price: Decimal::from(price),
            currency: "INR".to_string(),
            lead_time: "3 weeks".to_string(),
            notes: Some("Ex-works Rajkot".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_requires_supplier_profile() {
        let store = test_support::store();
        let service = QuoteService::new(store.clone());
        let (_, buyer) = test_support::user(&store, UserRole::Buyer).await;
        let (_, supplier) = test_support::user(&store, UserRole::Supplier).await;
        let rfq = RfqService::new(store.clone())
            .create(&buyer, test_support::rfq_request(Some(100)))
            .await
            .unwrap();

        let err = service.submit(&buyer, quote_request(rfq.id, 90)).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::RoleNotAuthorized);

        let err = service.submit(&supplier, quote_request(rfq.id, 90)).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::SupplierProfileNotFound);
    }

    #[tokio::test]
    async fn test_submit_rules() {
        let store = test_support::store();
        let service = QuoteService::new(store.clone());
        let rfqs = RfqService::new(store.clone());
        let (_, buyer) = test_support::user(&store, UserRole::Buyer).await;
        let (_, supplier) = test_support::user(&store, UserRole::Supplier).await;
        test_support::supplier_profile(&store, &supplier).await;
        let rfq = rfqs.create(&buyer, test_support::rfq_request(Some(100))).await.unwrap();

        let err = service.submit(&supplier, quote_request(Uuid::new_v4(), 90)).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotFound);

        let err = service.submit(&supplier, quote_request(rfq.id, 0)).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidInput);

        let quote = service.submit(&supplier, quote_request(rfq.id, 90)).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert_eq!(quote.supplier_name, "Shakti Metals");

        let detail = rfqs.detail(Some(&buyer), rfq.id).await.unwrap();
        assert_eq!(detail.rfq.status, RfqStatus::Quoted);
        assert_eq!(detail.quotes.len(), 1);

        let err = service.submit(&supplier, quote_request(rfq.id, 80)).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::QuoteAlreadySubmitted);
        assert_eq!(
            err.error_code().message(),
            "You have already submitted a quote for this RFQ"
        );
    }

    #[tokio::test]
    async fn test_closed_rfq_refuses_quotes() {
        let store = test_support::store();
        let service = QuoteService::new(store.clone());
        let rfqs = RfqService::new(store.clone());
        let (_, buyer) = test_support::user(&store, UserRole::Buyer).await;
        let (_, supplier) = test_support::user(&store, UserRole::Supplier).await;
        test_support::supplier_profile(&store, &supplier).await;
        let rfq = rfqs.create(&buyer, test_support::rfq_request(None)).await.unwrap();
        rfqs.update_status(&buyer, rfq.id, RfqStatus::Closed).await.unwrap();

        let err = service.submit(&supplier, quote_request(rfq.id, 10)).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::RfqNotOpen);
    }

    #[tokio::test]
    async fn test_decide_by_owner_only() {
        let store = test_support::store();
        let service = QuoteService::new(store.clone());
        let rfqs = RfqService::new(store.clone());
        let (_, buyer) = test_support::user(&store, UserRole::Buyer).await;
        let (_, supplier) = test_support::user(&store, UserRole::Supplier).await;
        test_support::supplier_profile(&store, &supplier).await;
        let rfq = rfqs.create(&buyer, test_support::rfq_request(None)).await.unwrap();
        let quote = service.submit(&supplier, quote_request(rfq.id, 10)).await.unwrap();

        let err = service
            .decide(&supplier, quote.id, QuoteStatus::Accepted)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ResourceAccessDenied);

        let accepted = service.decide(&buyer, quote.id, QuoteStatus::Accepted).await.unwrap();
        assert_eq!(accepted.status, QuoteStatus::Accepted);

        let (quotes, stats) = service.my_quotes(&supplier).await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(stats.accepted, 1);

        let detail = rfqs.detail(None, rfq.id).await.unwrap();
        assert_eq!(detail.rfq.status, RfqStatus::Closed);
        assert!(detail.quotes.is_empty());
    }
}
