//! Storage traits for the marketplace.
//!
//! This module provides:
//! - One repository trait per aggregate (users, suppliers, products, RFQs, quotes, loans)
//! - The `MarketplaceStore` supertrait that handlers and services depend on
//! - Pagination types shared by every list query
//! - A transaction wrapper for the PostgreSQL store

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::schema::types::{QuoteStatus, RfqStatus};
use crate::error::ApiError;
use crate::models::{
    CreateProductRequest, CreateRfqRequest, LoanApplication, LoanApplicationRequest, NewUser,
    Product, ProductFilter, Quote, Rfq, RfqFilter, Supplier, SupplierFilter,
    UpsertSupplierRequest, User, UserCredentials,
};

pub type StoreResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. A taken email is `ALREADY_EXISTS`.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_credentials_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>>;

    /// Persist profile fields of an existing user. Role and email are not written.
    async fn update_user_profile(&self, user: &User) -> StoreResult<User>;

    async fn count_users(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait SupplierRepository: Send + Sync {
    async fn find_supplier(&self, id: Uuid) -> StoreResult<Option<Supplier>>;

    async fn find_supplier_by_user(&self, user_id: Uuid) -> StoreResult<Option<Supplier>>;

    /// Create the user's supplier profile or overwrite its editable fields
    async fn upsert_supplier(
        &self,
        user_id: Uuid,
        profile: &UpsertSupplierRequest,
    ) -> StoreResult<Supplier>;

    async fn set_supplier_verified(&self, id: Uuid, verified: bool)
        -> StoreResult<Option<Supplier>>;

    async fn list_suppliers(
        &self,
        filter: &SupplierFilter,
        pagination: &Pagination,
    ) -> StoreResult<PagedResult<Supplier>>;

    async fn count_suppliers(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert_product(
        &self,
        supplier_id: Uuid,
        product: &CreateProductRequest,
    ) -> StoreResult<Product>;

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>>;

    /// Overwrite every editable column of `product`
    async fn update_product(&self, product: &Product) -> StoreResult<Product>;

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_products(
        &self,
        filter: &ProductFilter,
        pagination: &Pagination,
    ) -> StoreResult<PagedResult<Product>>;

    async fn products_by_supplier(&self, supplier_id: Uuid) -> StoreResult<Vec<Product>>;

    async fn count_products(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait RfqRepository: Send + Sync {
    async fn insert_rfq(&self, buyer_id: Uuid, rfq: &CreateRfqRequest) -> StoreResult<Rfq>;

    async fn find_rfq(&self, id: Uuid) -> StoreResult<Option<Rfq>>;

    async fn list_rfqs(
        &self,
        filter: &RfqFilter,
        pagination: &Pagination,
    ) -> StoreResult<PagedResult<Rfq>>;

    async fn rfqs_by_buyer(&self, buyer_id: Uuid) -> StoreResult<Vec<Rfq>>;

    async fn set_rfq_status(&self, id: Uuid, status: RfqStatus) -> StoreResult<Option<Rfq>>;

    /// Delete the RFQ together with its quotes
    async fn delete_rfq(&self, id: Uuid) -> StoreResult<bool>;
}

/// Data for a quote insert, already checked by the quote service
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub rfq_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub price: Decimal,
    pub currency: String,
    pub lead_time: String,
    pub notes: Option<String>,
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Insert a pending quote and move an `open` RFQ to `quoted`, atomically.
    ///
    /// A second quote for the same (RFQ, supplier) pair is
    /// `QUOTE_ALREADY_SUBMITTED`; a closed RFQ is `RFQ_NOT_OPEN`.
    async fn insert_quote(&self, quote: NewQuote) -> StoreResult<Quote>;

    async fn find_quote(&self, id: Uuid) -> StoreResult<Option<Quote>>;

    async fn quotes_for_rfq(&self, rfq_id: Uuid) -> StoreResult<Vec<Quote>>;

    async fn quotes_by_supplier(&self, supplier_id: Uuid) -> StoreResult<Vec<Quote>>;

    /// Accept or reject a pending quote. Accepting also rejects the RFQ's other
    /// pending quotes and closes the RFQ, atomically.
    async fn decide_quote(&self, id: Uuid, status: QuoteStatus) -> StoreResult<Quote>;
}

#[async_trait]
pub trait LoanRepository: Send + Sync {
    async fn insert_loan_application(
        &self,
        user_id: Uuid,
        application: &LoanApplicationRequest,
    ) -> StoreResult<LoanApplication>;

    async fn loan_applications_by_user(&self, user_id: Uuid)
        -> StoreResult<Vec<LoanApplication>>;
}

/// Everything the API needs from persistence
#[async_trait]
pub trait MarketplaceStore:
    UserRepository
    + SupplierRepository
    + ProductRepository
    + RfqRepository
    + QuoteRepository
    + LoanRepository
{
    /// Backend name reported by health checks
    fn backend(&self) -> &'static str;

    /// Cheap round trip proving the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paged result containing items and metadata
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        let total_pages = ((total as f64) / (pagination.per_page as f64)).ceil() as u32;
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
            total_pages,
        }
    }

    /// Page an already filtered, already ordered list in memory
    pub fn from_vec(all: Vec<T>, pagination: &Pagination) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(pagination.limit() as usize)
            .collect();
        Self::new(items, total, pagination)
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    /// Split into items and the wire pagination block
    pub fn into_parts(self) -> (Vec<T>, PageInfo) {
        let info = PageInfo {
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next_page(),
            has_prev: self.has_prev_page(),
        };
        (self.items, info)
    }
}

/// Pagination block returned next to list results
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Transaction wrapper for database operations
pub struct Transaction<'a> {
    tx: sqlx::Transaction<'a, sqlx::Postgres>,
}

impl<'a> Transaction<'a> {
    pub async fn begin(pool: &'a PgPool) -> Result<Self, ApiError> {
        let tx = pool.begin().await.map_err(ApiError::from)?;
        Ok(Self { tx })
    }

    pub async fn commit(self) -> Result<(), ApiError> {
        self.tx.commit().await.map_err(ApiError::from)
    }

    pub async fn rollback(self) -> Result<(), ApiError> {
        self.tx.rollback().await.map_err(ApiError::from)
    }

    pub fn inner(&mut self) -> &mut sqlx::Transaction<'a, sqlx::Postgres> {
        &mut self.tx
    }
}
