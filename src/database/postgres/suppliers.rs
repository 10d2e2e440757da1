use async_trait::async_trait;
use uuid::Uuid;

use super::{map_unique_violation, search_term, PgStore};
use crate::database::repository::{PagedResult, Pagination, StoreResult, SupplierRepository};
use crate::models::{Supplier, SupplierFilter, UpsertSupplierRequest};

const SUPPLIER_COLUMNS: &str = "id, user_id, company_name, industry, description, location, \
     website, rating, verified, specialties, min_order_value, established_year, created_at, updated_at";

const SUPPLIER_FILTER: &str = "($1::text IS NULL OR LOWER(industry) = LOWER($1)) \
     AND ($2::bool IS NULL OR verified = $2) \
     AND ($3::text IS NULL OR company_name ILIKE '%' || $3 || '%' \
          OR EXISTS (SELECT 1 FROM unnest(specialties) s WHERE s ILIKE '%' || $3 || '%'))";

#[async_trait]
impl SupplierRepository for PgStore {
    async fn find_supplier(&self, id: Uuid) -> StoreResult<Option<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1");
        Ok(sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_supplier_by_user(&self, user_id: Uuid) -> StoreResult<Option<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE user_id = $1");
        Ok(sqlx::query_as::<_, Supplier>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn upsert_supplier(
        &self,
        user_id: Uuid,
        profile: &UpsertSupplierRequest,
    ) -> StoreResult<Supplier> {
        let sql = format!(
            "INSERT INTO suppliers (id, user_id, company_name, industry, description, location, \
                 website, specialties, min_order_value, established_year) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 company_name = EXCLUDED.company_name, \
                 industry = EXCLUDED.industry, \
                 description = EXCLUDED.description, \
                 location = EXCLUDED.location, \
                 website = EXCLUDED.website, \
                 specialties = EXCLUDED.specialties, \
                 min_order_value = EXCLUDED.min_order_value, \
                 established_year = EXCLUDED.established_year, \
                 updated_at = NOW() \
             RETURNING {SUPPLIER_COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(profile.company_name.trim())
            .bind(profile.industry.trim())
            .bind(&profile.description)
            .bind(&profile.location)
            .bind(&profile.website)
            .bind(profile.normalized_specialties())
            .bind(profile.min_order_value)
            .bind(profile.established_year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Supplier profile"))
    }

    async fn set_supplier_verified(
        &self,
        id: Uuid,
        verified: bool,
    ) -> StoreResult<Option<Supplier>> {
        let sql = format!(
            "UPDATE suppliers SET verified = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {SUPPLIER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .bind(verified)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_suppliers(
        &self,
        filter: &SupplierFilter,
        pagination: &Pagination,
    ) -> StoreResult<PagedResult<Supplier>> {
        let search = search_term(filter.search.as_deref());

        let sql = format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE {SUPPLIER_FILTER} \
             ORDER BY verified DESC, created_at DESC LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, Supplier>(&sql)
            .bind(&filter.industry)
            .bind(filter.verified)
            .bind(&search)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM suppliers WHERE {SUPPLIER_FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(&filter.industry)
            .bind(filter.verified)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        Ok(PagedResult::new(items, total, pagination))
    }

    async fn count_suppliers(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?)
    }
}
