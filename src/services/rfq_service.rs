use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Claims;
use crate::database::repository::{PagedResult, Pagination};
use crate::database::schema::types::RfqStatus;
use crate::database::MarketplaceStore;
use crate::error::{ApiError, ErrorCode, Result};
use crate::models::{CreateRfqRequest, Quote, Rfq, RfqFilter, RfqStats};

/// RFQ with the quotes the caller may see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfqDetail {
    pub rfq: Rfq,
    pub quotes: Vec<Quote>,
}

#[derive(Clone)]
pub struct RfqService {
    store: Arc<dyn MarketplaceStore>,
}

impl RfqService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, caller: &Claims, request: CreateRfqRequest) -> Result<Rfq> {
        caller.authorize("rfqs:create", "post RFQs")?;
        let request = request.normalized();
        request.validate()?;

        let rfq = self.store.insert_rfq(caller.sub, &request).await?;
        info!(rfq_id = %rfq.id, buyer_id = %caller.sub, "RFQ created");
        metrics::counter!("rfqs_created_total").increment(1);
        Ok(rfq)
    }

    pub async fn list(&self, filter: &RfqFilter, pagination: &Pagination) -> Result<PagedResult<Rfq>> {
        self.store.list_rfqs(filter, pagination).await
    }

    /// The caller's own RFQs with dashboard stats
    pub async fn my_rfqs(&self, caller: &Claims) -> Result<(Vec<Rfq>, RfqStats)> {
        caller.authorize("rfqs:manage", "view buyer RFQs")?;
        let rfqs = self.store.rfqs_by_buyer(caller.sub).await?;
        let stats = RfqStats::from_rfqs(&rfqs);
        Ok((rfqs, stats))
    }

    /// RFQ detail. The owner sees every quote, a supplier sees only their own,
    /// anyone else sees none.
    pub async fn detail(&self, caller: Option<&Claims>, id: Uuid) -> Result<RfqDetail> {
        let rfq = self.find(id).await?;

        let quotes = match caller {
            Some(claims) if claims.sub == rfq.buyer_id => self.store.quotes_for_rfq(id).await?,
            Some(claims) if claims.can("quotes:read") => {
                match self.store.find_supplier_by_user(claims.sub).await? {
                    Some(supplier) => self
                        .store
                        .quotes_for_rfq(id)
                        .await?
                        .into_iter()
                        .filter(|q| q.supplier_id == supplier.id)
                        .collect(),
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        };

        Ok(RfqDetail { rfq, quotes })
    }

    /// Owner-driven status change. Re-sending the current status is a no-op.
    pub async fn update_status(&self, caller: &Claims, id: Uuid, status: RfqStatus) -> Result<Rfq> {
        let rfq = self.find_owned(caller, id).await?;

        if rfq.status == status {
            return Ok(rfq);
        }
        if !rfq.status.can_transition_to(status) {
            return Err(ApiError::with_details(
                ErrorCode::InvalidStatusTransition,
                ErrorCode::InvalidStatusTransition.message(),
                format!("{} -> {}", rfq.status, status),
            ));
        }

        let updated = self
            .store
            .set_rfq_status(id, status)
            .await?
            .ok_or_else(|| ApiError::not_found("RFQ"))?;
        info!(rfq_id = %id, from = %rfq.status, to = %status, "RFQ status changed");
        Ok(updated)
    }

    pub async fn delete(&self, caller: &Claims, id: Uuid) -> Result<Uuid> {
        self.find_owned(caller, id).await?;
        if !self.store.delete_rfq(id).await? {
            return Err(ApiError::not_found("RFQ"));
        }
        info!(rfq_id = %id, "RFQ deleted");
        Ok(id)
    }

    async fn find(&self, id: Uuid) -> Result<Rfq> {
        self.store
            .find_rfq(id)
            .await?
            .ok_or_else(|| ApiError::not_found("RFQ"))
    }

    async fn find_owned(&self, caller: &Claims, id: Uuid) -> Result<Rfq> {
        let rfq = self.find(id).await?;
        if rfq.buyer_id != caller.sub {
            return Err(ApiError::not_owner());
        }
        Ok(rfq)
    }
}
