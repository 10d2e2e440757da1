use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::database::repository::{LoanRepository, StoreResult};
use crate::models::{LoanApplication, LoanApplicationRequest};

const LOAN_COLUMNS: &str = "id, user_id, full_name, email, phone, business_name, business_type, \
     annual_turnover, loan_amount, loan_purpose, city, pincode, gst_number, status, created_at";

#[async_trait]
impl LoanRepository for PgStore {
    async fn insert_loan_application(
        &self,
        user_id: Uuid,
        application: &LoanApplicationRequest,
    ) -> StoreResult<LoanApplication> {
        let sql = format!(
            "INSERT INTO loan_applications (id, user_id, full_name, email, phone, business_name, \
                 business_type, annual_turnover, loan_amount, loan_purpose, city, pincode, \
                 gst_number, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'submitted') \
             RETURNING {LOAN_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, LoanApplication>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(application.full_name.trim())
            .bind(application.email.trim())
            .bind(application.phone.trim())
            .bind(application.business_name.trim())
            .bind(application.business_type.trim())
            .bind(application.annual_turnover)
            .bind(application.loan_amount)
            .bind(application.loan_purpose.trim())
            .bind(application.city.trim())
            .bind(&application.pincode)
            .bind(&application.gst_number)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn loan_applications_by_user(
        &self,
        user_id: Uuid,
    ) -> StoreResult<Vec<LoanApplication>> {
        let sql = format!(
            "SELECT {LOAN_COLUMNS} FROM loan_applications WHERE user_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, LoanApplication>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }
}
