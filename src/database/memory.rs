//! In-process store used by tests and `STORAGE_BACKEND=memory`.
//!
//! Every table is a `Vec` in insertion order behind one `RwLock`, so any
//! multi-row mutation happens under a single write guard and is atomic with
//! respect to other requests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::{
    LoanRepository, MarketplaceStore, NewQuote, PagedResult, Pagination, ProductRepository,
    QuoteRepository, RfqRepository, StoreResult, SupplierRepository, UserRepository,
};
use crate::database::schema::types::{LoanStatus, QuoteStatus, RfqStatus};
use crate::error::{ApiError, ErrorCode};
use crate::models::{
    CreateProductRequest, CreateRfqRequest, LoanApplication, LoanApplicationRequest, NewUser,
    Product, ProductFilter, Quote, Rfq, RfqFilter, Supplier, SupplierFilter,
    UpsertSupplierRequest, User, UserCredentials,
};

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    suppliers: Vec<Supplier>,
    products: Vec<Product>,
    rfqs: Vec<Rfq>,
    quotes: Vec<Quote>,
    loans: Vec<LoanApplication>,
}

impl Tables {
    fn quote_count(&self, rfq_id: Uuid) -> i64 {
        self.quotes.iter().filter(|q| q.rfq_id == rfq_id).count() as i64
    }

    fn rfq_view(&self, rfq: &Rfq) -> Rfq {
        let mut rfq = rfq.clone();
        rfq.quote_count = self.quote_count(rfq.id);
        rfq
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|(u, _)| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(ApiError::already_exists("An account with this email"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            role: new_user.role,
            name: new_user.name,
            phone: new_user.phone,
            company: new_user.company,
            address: None,
            city: None,
            state: None,
            country: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push((user.clone(), new_user.password_hash));
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    async fn find_credentials_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|(u, _)| u.email.eq_ignore_ascii_case(email))
            .map(|(u, hash)| UserCredentials {
                id: u.id,
                email: u.email.clone(),
                password_hash: hash.clone(),
                role: u.role,
            }))
    }

    async fn update_user_profile(&self, user: &User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let (stored, _) = tables
            .users
            .iter_mut()
            .find(|(u, _)| u.id == user.id)
            .ok_or_else(|| ApiError::not_found("User"))?;
        stored.name = user.name.clone();
        stored.phone = user.phone.clone();
        stored.company = user.company.clone();
        stored.address = user.address.clone();
        stored.city = user.city.clone();
        stored.state = user.state.clone();
        stored.country = user.country.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }
}

#[async_trait]
impl SupplierRepository for MemoryStore {
    async fn find_supplier(&self, id: Uuid) -> StoreResult<Option<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables.suppliers.iter().find(|s| s.id == id).cloned())
    }

    async fn find_supplier_by_user(&self, user_id: Uuid) -> StoreResult<Option<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables.suppliers.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn upsert_supplier(
        &self,
        user_id: Uuid,
        profile: &UpsertSupplierRequest,
    ) -> StoreResult<Supplier> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let specialties = profile.normalized_specialties();

        if let Some(existing) = tables.suppliers.iter_mut().find(|s| s.user_id == user_id) {
            existing.company_name = profile.company_name.trim().to_string();
            existing.industry = profile.industry.trim().to_string();
            existing.description = profile.description.clone();
            existing.location = profile.location.clone();
            existing.website = profile.website.clone();
            existing.specialties = specialties;
            existing.min_order_value = profile.min_order_value;
            existing.established_year = profile.established_year;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let supplier = Supplier {
            id: Uuid::new_v4(),
            user_id,
            company_name: profile.company_name.trim().to_string(),
            industry: profile.industry.trim().to_string(),
            description: profile.description.clone(),
            location: profile.location.clone(),
            website: profile.website.clone(),
            rating: rust_decimal::Decimal::ZERO,
            verified: false,
            specialties,
            min_order_value: profile.min_order_value,
            established_year: profile.established_year,
            created_at: now,
            updated_at: now,
        };
        tables.suppliers.push(supplier.clone());
        Ok(supplier)
    }

    async fn set_supplier_verified(
        &self,
        id: Uuid,
        verified: bool,
    ) -> StoreResult<Option<Supplier>> {
        let mut tables = self.tables.write().await;
        Ok(tables.suppliers.iter_mut().find(|s| s.id == id).map(|s| {
            s.verified = verified;
            s.updated_at = Utc::now();
            s.clone()
        }))
    }

    async fn list_suppliers(
        &self,
        filter: &SupplierFilter,
        pagination: &Pagination,
    ) -> StoreResult<PagedResult<Supplier>> {
        let tables = self.tables.read().await;
        let matching: Vec<Supplier> = tables
            .suppliers
            .iter()
            .rev()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        Ok(PagedResult::from_vec(matching, pagination))
    }

    async fn count_suppliers(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.suppliers.len() as i64)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert_product(
        &self,
        supplier_id: Uuid,
        product: &CreateProductRequest,
    ) -> StoreResult<Product> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            supplier_id,
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price,
            currency: product.currency.clone(),
            unit: product.unit.clone(),
            min_order_quantity: product.min_order_quantity,
            stock: product.stock,
            in_stock: product.stock > 0,
            features: product.features.clone(),
            tags: product.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn update_product(&self, product: &Product) -> StoreResult<Product> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| ApiError::not_found("Product"))?;
        *stored = Product {
            in_stock: product.stock > 0,
            created_at: stored.created_at,
            supplier_id: stored.supplier_id,
            updated_at: Utc::now(),
            ..product.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        Ok(tables.products.len() != before)
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        pagination: &Pagination,
    ) -> StoreResult<PagedResult<Product>> {
        let tables = self.tables.read().await;
        let matching: Vec<Product> = tables
            .products
            .iter()
            .rev()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(PagedResult::from_vec(matching, pagination))
    }

    async fn products_by_supplier(&self, supplier_id: Uuid) -> StoreResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .rev()
            .filter(|p| p.supplier_id == supplier_id)
            .cloned()
            .collect())
    }

    async fn count_products(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.products.len() as i64)
    }
}

#[async_trait]
impl RfqRepository for MemoryStore {
    async fn insert_rfq(&self, buyer_id: Uuid, rfq: &CreateRfqRequest) -> StoreResult<Rfq> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let rfq = Rfq {
            id: Uuid::new_v4(),
            buyer_id,
            title: rfq.title.trim().to_string(),
            description: rfq.description.trim().to_string(),
            category: rfq.category.trim().to_string(),
            quantity: rfq.quantity,
            unit: rfq.unit.trim().to_string(),
            budget: rfq.budget,
            currency: rfq.currency.clone(),
            deadline: rfq.deadline,
            delivery_location: rfq.delivery_location.clone(),
            status: RfqStatus::Open,
            quote_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.rfqs.push(rfq.clone());
        Ok(rfq)
    }

    async fn find_rfq(&self, id: Uuid) -> StoreResult<Option<Rfq>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rfqs
            .iter()
            .find(|r| r.id == id)
            .map(|r| tables.rfq_view(r)))
    }

    async fn list_rfqs(
        &self,
        filter: &RfqFilter,
        pagination: &Pagination,
    ) -> StoreResult<PagedResult<Rfq>> {
        let tables = self.tables.read().await;
        let matching: Vec<Rfq> = tables
            .rfqs
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .map(|r| tables.rfq_view(r))
            .collect();
        Ok(PagedResult::from_vec(matching, pagination))
    }

    async fn rfqs_by_buyer(&self, buyer_id: Uuid) -> StoreResult<Vec<Rfq>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rfqs
            .iter()
            .rev()
            .filter(|r| r.buyer_id == buyer_id)
            .map(|r| tables.rfq_view(r))
            .collect())
    }

    async fn set_rfq_status(&self, id: Uuid, status: RfqStatus) -> StoreResult<Option<Rfq>> {
        let mut tables = self.tables.write().await;
        let Some(rfq) = tables.rfqs.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        rfq.status = status;
        rfq.updated_at = Utc::now();
        let rfq = rfq.clone();
        Ok(Some(tables.rfq_view(&rfq)))
    }

    async fn delete_rfq(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.rfqs.len();
        tables.rfqs.retain(|r| r.id != id);
        let deleted = tables.rfqs.len() != before;
        if deleted {
            tables.quotes.retain(|q| q.rfq_id != id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl QuoteRepository for MemoryStore {
    async fn insert_quote(&self, quote: NewQuote) -> StoreResult<Quote> {
        let mut tables = self.tables.write().await;

        if tables
            .quotes
            .iter()
            .any(|q| q.rfq_id == quote.rfq_id && q.supplier_id == quote.supplier_id)
        {
            return Err(ApiError::code(ErrorCode::QuoteAlreadySubmitted));
        }

        let now = Utc::now();
        let rfq = tables
            .rfqs
            .iter_mut()
            .find(|r| r.id == quote.rfq_id)
            .ok_or_else(|| ApiError::not_found("RFQ"))?;
        match rfq.status {
            RfqStatus::Closed => return Err(ApiError::code(ErrorCode::RfqNotOpen)),
            RfqStatus::Open => {
                rfq.status = RfqStatus::Quoted;
                rfq.updated_at = now;
            }
            RfqStatus::Quoted => {}
        }

        let quote = Quote {
            id: Uuid::new_v4(),
            rfq_id: quote.rfq_id,
            supplier_id: quote.supplier_id,
            supplier_name: quote.supplier_name,
            price: quote.price,
            currency: quote.currency,
            lead_time: quote.lead_time,
            notes: quote.notes,
            status: QuoteStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.quotes.push(quote.clone());
        Ok(quote)
    }

    async fn find_quote(&self, id: Uuid) -> StoreResult<Option<Quote>> {
        let tables = self.tables.read().await;
        Ok(tables.quotes.iter().find(|q| q.id == id).cloned())
    }

    async fn quotes_for_rfq(&self, rfq_id: Uuid) -> StoreResult<Vec<Quote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .quotes
            .iter()
            .rev()
            .filter(|q| q.rfq_id == rfq_id)
            .cloned()
            .collect())
    }

    async fn quotes_by_supplier(&self, supplier_id: Uuid) -> StoreResult<Vec<Quote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .quotes
            .iter()
            .rev()
            .filter(|q| q.supplier_id == supplier_id)
            .cloned()
            .collect())
    }

    async fn decide_quote(&self, id: Uuid, status: QuoteStatus) -> StoreResult<Quote> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        let quote = tables
            .quotes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| ApiError::not_found("Quote"))?;
        if quote.status != QuoteStatus::Pending {
            return Err(ApiError::code(ErrorCode::QuoteAlreadyDecided));
        }
        quote.status = status;
        quote.updated_at = now;
        let decided = quote.clone();

        if status == QuoteStatus::Accepted {
            for other in tables
                .quotes
                .iter_mut()
                .filter(|q| q.rfq_id == decided.rfq_id && q.id != id && q.status == QuoteStatus::Pending)
            {
                other.status = QuoteStatus::Rejected;
                other.updated_at = now;
            }
            if let Some(rfq) = tables.rfqs.iter_mut().find(|r| r.id == decided.rfq_id) {
                rfq.status = RfqStatus::Closed;
                rfq.updated_at = now;
            }
        }
        Ok(decided)
    }
}

#[async_trait]
impl LoanRepository for MemoryStore {
    async fn insert_loan_application(
        &self,
        user_id: Uuid,
        application: &LoanApplicationRequest,
    ) -> StoreResult<LoanApplication> {
        let mut tables = self.tables.write().await;
        let record = LoanApplication {
            id: Uuid::new_v4(),
            user_id,
            full_name: application.full_name.trim().to_string(),
            email: application.email.trim().to_string(),
            phone: application.phone.trim().to_string(),
            business_name: application.business_name.trim().to_string(),
            business_type: application.business_type.trim().to_string(),
            annual_turnover: application.annual_turnover,
            loan_amount: application.loan_amount,
            loan_purpose: application.loan_purpose.trim().to_string(),
            city: application.city.trim().to_string(),
            pincode: application.pincode.clone(),
            gst_number: application.gst_number.clone(),
            status: LoanStatus::Submitted,
            created_at: Utc::now(),
        };
        tables.loans.push(record.clone());
        Ok(record)
    }

    async fn loan_applications_by_user(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<LoanApplication>> {
        let tables = self.tables.read().await;
        Ok(tables
            .loans
            .iter()
            .rev()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MarketplaceStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        let _tables = self.tables.read().await;
        Ok(())
    }
}
