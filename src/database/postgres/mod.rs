//! PostgreSQL implementation of [`MarketplaceStore`].
//!
//! Queries are checked at runtime (`query_as::<_, Row>`) so the crate builds
//! without a live database.

use async_trait::async_trait;
use tracing::debug;

use super::repository::{MarketplaceStore, StoreResult};
use super::DatabasePool;
use crate::error::{ApiError, ErrorCode};

mod loans;
mod products;
mod quotes;
mod rfqs;
mod suppliers;
mod users;

/// Name of the unique constraint on `(rfq_id, supplier_id)`
const QUOTE_PAIR_CONSTRAINT: &str = "quotes_rfq_supplier_key";

#[derive(Clone)]
pub struct PgStore {
    pool: DatabasePool,
}

impl PgStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Translate unique violations into marketplace error codes
fn map_unique_violation(err: sqlx::Error, resource: &str) -> ApiError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            debug!(constraint = ?db_err.constraint(), "Unique constraint violated");
            if db_err.constraint() == Some(QUOTE_PAIR_CONSTRAINT) {
                return ApiError::code(ErrorCode::QuoteAlreadySubmitted);
            }
            return ApiError::already_exists(resource);
        }
    }
    ApiError::Database(err)
}

/// Trimmed search needle, or `None` when blank
fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[async_trait]
impl MarketplaceStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_blank_is_none() {
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(Some(" steel ")), Some("steel".to_string()));
        assert_eq!(search_term(None), None);
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = map_unique_violation(sqlx::Error::RowNotFound, "Quote");
        assert_eq!(err.error_code(), ErrorCode::QueryFailed);
    }
}
