use async_trait::async_trait;
use uuid::Uuid;

use super::{search_term, PgStore};
use crate::database::repository::{PagedResult, Pagination, RfqRepository, StoreResult};
use crate::database::schema::types::RfqStatus;
use crate::models::{CreateRfqRequest, Rfq, RfqFilter};

const RFQ_SELECT: &str = "SELECT r.id, r.buyer_id, r.title, r.description, r.category, \
     r.quantity, r.unit, r.budget, r.currency, r.deadline, r.delivery_location, r.status, \
     (SELECT COUNT(*) FROM quotes q WHERE q.rfq_id = r.id) AS quote_count, \
     r.created_at, r.updated_at \
     FROM rfqs r";

const RFQ_RETURNING: &str = "RETURNING id, buyer_id, title, description, category, quantity, \
     unit, budget, currency, deadline, delivery_location, status, \
     (SELECT COUNT(*) FROM quotes q WHERE q.rfq_id = rfqs.id) AS quote_count, \
     created_at, updated_at";

const RFQ_FILTER: &str = "($1::rfq_status IS NULL OR r.status = $1) \
     AND ($2::text IS NULL OR LOWER(r.category) = LOWER($2)) \
     AND ($3::text IS NULL OR r.title ILIKE '%' || $3 || '%' OR r.description ILIKE '%' || $3 || '%')";

#[async_trait]
impl RfqRepository for PgStore {
    async fn insert_rfq(&self, buyer_id: Uuid, rfq: &CreateRfqRequest) -> StoreResult<Rfq> {
        let sql = format!(
            "INSERT INTO rfqs (id, buyer_id, title, description, category, quantity, unit, \
                 budget, currency, deadline, delivery_location, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'open') \
             {RFQ_RETURNING}"
        );
        Ok(sqlx::query_as::<_, Rfq>(&sql)
            .bind(Uuid::new_v4())
            .bind(buyer_id)
            .bind(rfq.title.trim())
            .bind(rfq.description.trim())
            .bind(rfq.category.trim())
            .bind(rfq.quantity)
            .bind(rfq.unit.trim())
            .bind(rfq.budget)
            .bind(&rfq.currency)
            .bind(rfq.deadline)
            .bind(&rfq.delivery_location)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_rfq(&self, id: Uuid) -> StoreResult<Option<Rfq>> {
        let sql = format!("{RFQ_SELECT} WHERE r.id = $1");
        Ok(sqlx::query_as::<_, Rfq>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_rfqs(
        &self,
        filter: &RfqFilter,
        pagination: &Pagination,
    ) -> StoreResult<PagedResult<Rfq>> {
        let search = search_term(filter.search.as_deref());

        let sql = format!(
            "{RFQ_SELECT} WHERE {RFQ_FILTER} ORDER BY r.created_at DESC LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, Rfq>(&sql)
            .bind(filter.status)
            .bind(&filter.category)
            .bind(&search)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM rfqs r WHERE {RFQ_FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.status)
            .bind(&filter.category)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        Ok(PagedResult::new(items, total, pagination))
    }

    async fn rfqs_by_buyer(&self, buyer_id: Uuid) -> StoreResult<Vec<Rfq>> {
        let sql = format!("{RFQ_SELECT} WHERE r.buyer_id = $1 ORDER BY r.created_at DESC");
        Ok(sqlx::query_as::<_, Rfq>(&sql)
            .bind(buyer_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_rfq_status(&self, id: Uuid, status: RfqStatus) -> StoreResult<Option<Rfq>> {
        let sql = format!(
            "UPDATE rfqs SET status = $2, updated_at = NOW() WHERE id = $1 {RFQ_RETURNING}"
        );
        Ok(sqlx::query_as::<_, Rfq>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_rfq(&self, id: Uuid) -> StoreResult<bool> {
        // quotes go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM rfqs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
