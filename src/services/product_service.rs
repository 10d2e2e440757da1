use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::require_supplier_profile;
use crate::auth::Claims;
use crate::database::repository::{PagedResult, Pagination};
use crate::database::MarketplaceStore;
use crate::error::{ApiError, Result};
use crate::models::{
    CreateProductRequest, Product, ProductFilter, ProductStats, UpdateProductRequest,
};

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn MarketplaceStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, caller: &Claims, request: CreateProductRequest) -> Result<Product> {
        caller.authorize("products:create", "list products")?;
        let supplier = require_supplier_profile(&self.store, caller).await?;
        let request = request.normalized();
        request.validate()?;

        let product = self.store.insert_product(supplier.id, &request).await?;
        info!(product_id = %product.id, supplier_id = %supplier.id, "Product created");
        Ok(product)
    }

    pub async fn get(&self, id: Uuid) -> Result<Product> {
        self.store
            .find_product(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product"))
    }

    pub async fn list(
        &self,
        filter: &ProductFilter,
        pagination: &Pagination,
    ) -> Result<PagedResult<Product>> {
        self.store.list_products(filter, pagination).await
    }

    /// The calling supplier's catalogue with stats. Empty until a profile exists.
    pub async fn my_products(&self, caller: &Claims) -> Result<(Vec<Product>, ProductStats)> {
        caller.authorize("products:read", "view supplier products")?;
        let products = match self.store.find_supplier_by_user(caller.sub).await? {
            Some(supplier) => self.store.products_by_supplier(supplier.id).await?,
            None => Vec::new(),
        };
        let stats = ProductStats::from_products(&products);
        Ok((products, stats))
    }

    pub async fn update(
        &self,
        caller: &Claims,
        id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<Product> {
        let request = request.normalized();
        request.validate()?;
        let mut product = self.find_owned(caller, id).await?;
        request.apply_to(&mut product);

        let updated = self.store.update_product(&product).await?;
        info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    pub async fn delete(&self, caller: &Claims, id: Uuid) -> Result<Uuid> {
        self.find_owned(caller, id).await?;
        if !self.store.delete_product(id).await? {
            return Err(ApiError::not_found("Product"));
        }
        info!(product_id = %id, "Product deleted");
        Ok(id)
    }

    async fn find_owned(&self, caller: &Claims, id: Uuid) -> Result<Product> {
        let product = self.get(id).await?;
        let owns = match self.store.find_supplier_by_user(caller.sub).await? {
            Some(supplier) => supplier.id == product.supplier_id,
            None => false,
        };
        if !owns {
            return Err(ApiError::not_owner());
        }
        Ok(product)
    }
}
