use std::sync::Arc;

use tracing::debug;

use crate::auth::Claims;
use crate::database::repository::Pagination;
use crate::database::schema::types::UserRole;
use crate::database::MarketplaceStore;
use crate::error::Result;
use crate::models::{
    DashboardData, DashboardItem, DashboardStats, DashboardView, ProductFilter, ProductStats,
    RfqFilter, RfqStats,
};

/// Upper bound on rows for the shared boards shown to non-owners
const BOARD_LIMIT: u32 = 100;

/// Builds the mixed dashboard list. Items carry their own kind, so the page
/// never infers what a row is from the viewer's role.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn MarketplaceStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self, caller: &Claims, view: Option<DashboardView>) -> Result<DashboardData> {
        let view = view.unwrap_or_else(|| DashboardView::default_for(caller.role));
        debug!(user_id = %caller.sub, role = %caller.role, ?view, "Loading dashboard");

        let (items, stats) = match view {
            DashboardView::Rfqs => {
                let rfqs = if caller.role == UserRole::Buyer {
                    self.store.rfqs_by_buyer(caller.sub).await?
                } else {
                    self.store
                        .list_rfqs(&RfqFilter::default(), &Pagination::new(1, BOARD_LIMIT))
                        .await?
                        .items
                };
                let stats = DashboardStats::Rfqs(RfqStats::from_rfqs(&rfqs));
                (rfqs.into_iter().map(DashboardItem::Rfq).collect(), stats)
            }
            DashboardView::Products => {
                let products = if caller.role == UserRole::Supplier {
                    match self.store.find_supplier_by_user(caller.sub).await? {
                        Some(supplier) => self.store.products_by_supplier(supplier.id).await?,
                        None => Vec::new(),
                    }
                } else {
                    self.store
                        .list_products(&ProductFilter::default(), &Pagination::new(1, BOARD_LIMIT))
                        .await?
                        .items
                };
                let stats = DashboardStats::Products(ProductStats::from_products(&products));
                (products.into_iter().map(DashboardItem::Product).collect(), stats)
            }
        };

        Ok(DashboardData {
            role: caller.role,
            view,
            items,
            stats,
        })
    }
}
