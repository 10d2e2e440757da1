// Business logic services
// Marketplace rules live here; handlers only translate HTTP to these calls.

pub mod auth_service;
pub mod dashboard_service;
pub mod idempotency;
pub mod loan_service;
pub mod product_service;
pub mod profile_service;
pub mod quote_service;
pub mod rfq_service;
pub mod supplier_service;

pub use auth_service::AuthService;
pub use dashboard_service::DashboardService;
pub use idempotency::IdempotencyStore;
pub use loan_service::LoanService;
pub use product_service::ProductService;
pub use profile_service::ProfileService;
pub use quote_service::QuoteService;
pub use rfq_service::{RfqDetail, RfqService};
pub use supplier_service::SupplierService;

use std::sync::Arc;

use crate::auth::Claims;
use crate::database::MarketplaceStore;
use crate::error::{ApiError, ErrorCode, Result};
use crate::models::Supplier;

/// Supplier profile of the calling user, or `SUPPLIER_PROFILE_NOT_FOUND`
pub(crate) async fn require_supplier_profile(
    store: &Arc<dyn MarketplaceStore>,
    claims: &Claims,
) -> Result<Supplier> {
    store
        .find_supplier_by_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::code(ErrorCode::SupplierProfileNotFound))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::auth::Claims;
    use crate::database::schema::types::UserRole;
    use crate::database::{MarketplaceStore, MemoryStore};
    use crate::models::{CreateRfqRequest, NewUser, Supplier, UpsertSupplierRequest, User};

    pub fn store() -> Arc<dyn MarketplaceStore> {
        Arc::new(MemoryStore::new())
    }

    pub async fn user(store: &Arc<dyn MarketplaceStore>, role: UserRole) -> (User, Claims) {
        let user = store
            .create_user(NewUser {
                email: format!("{}-{}@example.com", role, uuid::Uuid::new_v4()),
                password_hash: "not-a-real-hash".to_string(),
                role,
                name: format!("Test {}", role),
                phone: None,
                company: None,
            })
            .await
            .unwrap();
        let claims = Claims::new(user.id, user.email.clone(), role, 3600);
        (user, claims)
    }

    pub async fn supplier_profile(store: &Arc<dyn MarketplaceStore>, claims: &Claims) -> Supplier {
        store
            .upsert_supplier(
                claims.sub,
                &UpsertSupplierRequest {
                    company_name: "Shakti Metals".to_string(),
                    industry: "Metals".to_string(),
                    description: None,
                    location: Some("Rajkot".to_string()),
                    website: None,
                    specialties: vec!["brass".to_string()],
                    min_order_value: Decimal::from(1000),
                    established_year: Some(2004),
                },
            )
            .await
            .unwrap()
    }

    pub fn rfq_request(budget: Option<i64>) -> CreateRfqRequest {
        CreateRfqRequest {
            title: "Brass fittings".to_string(),
            description: "Half-inch brass elbows, lead free".to_string(),
            category: "Plumbing".to_string(),
            quantity: 2000,
            unit: "piece".to_string(),
            budget: budget.map(Decimal::from),
            currency: "INR".to_string(),
            deadline: None,
            delivery_location: Some("Mumbai".to_string()),
        }
    }
}
