use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::require_supplier_profile;
use crate::auth::Claims;
use crate::database::repository::{PagedResult, Pagination};
use crate::database::MarketplaceStore;
use crate::error::{ApiError, Result};
use crate::models::{Product, Supplier, SupplierFilter, UpsertSupplierRequest};

#[derive(Clone)]
pub struct SupplierService {
    store: Arc<dyn MarketplaceStore>,
}

impl SupplierService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        filter: &SupplierFilter,
        pagination: &Pagination,
    ) -> Result<PagedResult<Supplier>> {
        self.store.list_suppliers(filter, pagination).await
    }

    /// Public supplier page: profile plus catalogue
    pub async fn get_with_products(&self, id: Uuid) -> Result<(Supplier, Vec<Product>)> {
        let supplier = self
            .store
            .find_supplier(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Supplier"))?;
        let products = self.store.products_by_supplier(id).await?;
        Ok((supplier, products))
    }

    pub async fn my_profile(&self, caller: &Claims) -> Result<Supplier> {
        caller.authorize("suppliers:profile", "view a supplier profile")?;
        require_supplier_profile(&self.store, caller).await
    }

    pub async fn upsert(&self, caller: &Claims, request: UpsertSupplierRequest) -> Result<Supplier> {
        caller.authorize("suppliers:profile", "manage a supplier profile")?;
        let request = request.normalized();
        request.validate()?;

        let supplier = self.store.upsert_supplier(caller.sub, &request).await?;
        info!(supplier_id = %supplier.id, user_id = %caller.sub, "Supplier profile saved");
        Ok(supplier)
    }

    /// Admin-only verification flag
    pub async fn set_verified(&self, caller: &Claims, id: Uuid, verified: bool) -> Result<Supplier> {
        caller.require_permission("suppliers:verify")?;
        let supplier = self
            .store
            .set_supplier_verified(id, verified)
            .await?
            .ok_or_else(|| ApiError::not_found("Supplier"))?;
        info!(supplier_id = %id, verified, admin_id = %caller.sub, "Supplier verification changed");
        Ok(supplier)
    }
}
