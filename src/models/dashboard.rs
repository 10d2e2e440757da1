use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::{Product, ProductStats};
use super::rfq::{Rfq, RfqStats};
use crate::database::schema::types::UserRole;

/// Which list the dashboard shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardView {
    Rfqs,
    Products,
}

impl DashboardView {
    /// Default list for a role: suppliers manage products, everyone else RFQs
    pub fn default_for(role: UserRole) -> Self {
        match role {
            UserRole::Supplier => DashboardView::Products,
            UserRole::Buyer | UserRole::Admin => DashboardView::Rfqs,
        }
    }
}

/// Kind tag of a dashboard item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Product,
    Rfq,
}

/// A row on the dashboard. The variant, not the viewer's role, decides which
/// endpoints edit or delete it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DashboardItem {
    Product(Product),
    Rfq(Rfq),
}

impl DashboardItem {
    pub fn id(&self) -> Uuid {
        match self {
            DashboardItem::Product(p) => p.id,
            DashboardItem::Rfq(r) => r.id,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            DashboardItem::Product(_) => ItemKind::Product,
            DashboardItem::Rfq(_) => ItemKind::Rfq,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            DashboardItem::Product(p) => &p.name,
            DashboardItem::Rfq(r) => &r.title,
        }
    }

    /// Status label as rendered on the dashboard
    pub fn status_label(&self) -> &'static str {
        match self {
            DashboardItem::Product(p) if p.in_stock => "In stock",
            DashboardItem::Product(_) => "Out of stock",
            DashboardItem::Rfq(r) => r.status.label(),
        }
    }

    pub fn delete_path(&self) -> String {
        match self {
            DashboardItem::Product(p) => format!("/api/products/{}", p.id),
            DashboardItem::Rfq(r) => format!("/api/rfqs/{}", r.id),
        }
    }

    pub fn edit_path(&self) -> String {
        match self {
            DashboardItem::Product(p) => format!("/dashboard/products/{}/edit", p.id),
            DashboardItem::Rfq(r) => format!("/dashboard/rfqs/{}", r.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DashboardStats {
    Rfqs(RfqStats),
    Products(ProductStats),
}

impl DashboardStats {
    /// Stats for the rows of one view. Rows of the other kind are ignored.
    pub fn for_items(view: DashboardView, items: &[DashboardItem]) -> Self {
        match view {
            DashboardView::Rfqs => {
                let rfqs: Vec<Rfq> = items
                    .iter()
                    .filter_map(|item| match item {
                        DashboardItem::Rfq(rfq) => Some(rfq.clone()),
                        DashboardItem::Product(_) => None,
                    })
                    .collect();
                DashboardStats::Rfqs(RfqStats::from_rfqs(&rfqs))
            }
            DashboardView::Products => {
                let products: Vec<Product> = items
                    .iter()
                    .filter_map(|item| match item {
                        DashboardItem::Product(product) => Some(product.clone()),
                        DashboardItem::Rfq(_) => None,
                    })
                    .collect();
                DashboardStats::Products(ProductStats::from_products(&products))
            }
        }
    }
}

/// Body of `GET /api/dashboard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub role: UserRole,
    pub view: DashboardView,
    pub items: Vec<DashboardItem>,
    pub stats: DashboardStats,
}
