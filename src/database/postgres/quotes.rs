use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{map_unique_violation, PgStore};
use crate::database::repository::{NewQuote, QuoteRepository, StoreResult, Transaction};
use crate::database::schema::types::{QuoteStatus, RfqStatus};
use crate::error::{ApiError, ErrorCode};
use crate::models::Quote;

const QUOTE_COLUMNS: &str = "id, rfq_id, supplier_id, supplier_name, price, currency, lead_time, \
     notes, status, created_at, updated_at";

#[async_trait]
impl QuoteRepository for PgStore {
    async fn insert_quote(&self, quote: NewQuote) -> StoreResult<Quote> {
        let mut tx = Transaction::begin(&self.pool).await?;

        // Lock the RFQ row so a concurrent close cannot slip between check and insert
        let status: Option<RfqStatus> =
            sqlx::query_scalar("SELECT status FROM rfqs WHERE id = $1 FOR UPDATE")
                .bind(quote.rfq_id)
                .fetch_optional(&mut **tx.inner())
                .await?;

        let status = match status {
            Some(status) => status,
            None => {
                tx.rollback().await?;
                return Err(ApiError::not_found("RFQ"));
            }
        };
        if !status.accepts_quotes() {
            tx.rollback().await?;
            return Err(ApiError::code(ErrorCode::RfqNotOpen));
        }

        let sql = format!(
            "INSERT INTO quotes (id, rfq_id, supplier_id, supplier_name, price, currency, \
                 lead_time, notes, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending') \
             RETURNING {QUOTE_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Quote>(&sql)
            .bind(Uuid::new_v4())
            .bind(quote.rfq_id)
            .bind(quote.supplier_id)
            .bind(&quote.supplier_name)
            .bind(quote.price)
            .bind(&quote.currency)
            .bind(&quote.lead_time)
            .bind(&quote.notes)
            .fetch_one(&mut **tx.inner())
            .await;

        let inserted = match inserted {
            Ok(q) => q,
            Err(e) => {
                tx.rollback().await?;
                return Err(map_unique_violation(e, "Quote"));
            }
        };

        if status == RfqStatus::Open {
            sqlx::query("UPDATE rfqs SET status = 'quoted', updated_at = NOW() WHERE id = $1")
                .bind(quote.rfq_id)
                .execute(&mut **tx.inner())
                .await?;
            debug!(rfq_id = %quote.rfq_id, "RFQ moved to quoted");
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_quote(&self, id: Uuid) -> StoreResult<Option<Quote>> {
        let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1");
        Ok(sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn quotes_for_rfq(&self, rfq_id: Uuid) -> StoreResult<Vec<Quote>> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE rfq_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Quote>(&sql)
            .bind(rfq_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn quotes_by_supplier(&self, supplier_id: Uuid) -> StoreResult<Vec<Quote>> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE supplier_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Quote>(&sql)
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn decide_quote(&self, id: Uuid, status: QuoteStatus) -> StoreResult<Quote> {
        let mut tx = Transaction::begin(&self.pool).await?;

        let sql = format!(
            "UPDATE quotes SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {QUOTE_COLUMNS}"
        );
        let decided = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&mut **tx.inner())
            .await?;

        let decided = match decided {
            Some(q) => q,
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM quotes WHERE id = $1)")
                        .bind(id)
                        .fetch_one(&mut **tx.inner())
                        .await?;
                tx.rollback().await?;
                return Err(if exists {
                    ApiError::code(ErrorCode::QuoteAlreadyDecided)
                } else {
                    ApiError::not_found("Quote")
                });
            }
        };

        if status == QuoteStatus::Accepted {
            sqlx::query(
                "UPDATE quotes SET status = 'rejected', updated_at = NOW() \
                 WHERE rfq_id = $1 AND id <> $2 AND status = 'pending'",
            )
            .bind(decided.rfq_id)
            .bind(decided.id)
            .execute(&mut **tx.inner())
            .await?;

            sqlx::query("UPDATE rfqs SET status = 'closed', updated_at = NOW() WHERE id = $1")
                .bind(decided.rfq_id)
                .execute(&mut **tx.inner())
                .await?;
        }

        tx.commit().await?;
        Ok(decided)
    }
}
