use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::auth::Claims;
use crate::database::MarketplaceStore;
use crate::error::Result;
use crate::models::{LoanApplication, LoanApplicationRequest};

/// Loan referral leads. Applications are linked only to the submitting user.
#[derive(Clone)]
pub struct LoanService {
    store: Arc<dyn MarketplaceStore>,
}

impl LoanService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    pub async fn submit(
        &self,
        caller: &Claims,
        request: LoanApplicationRequest,
    ) -> Result<LoanApplication> {
        request.validate()?;

        let application = self.store.insert_loan_application(caller.sub, &request).await?;
        info!(application_id = %application.id, user_id = %caller.sub, "Loan application submitted");
        metrics::counter!("loan_applications_total").increment(1);
        Ok(application)
    }

    pub async fn my_applications(&self, caller: &Claims) -> Result<Vec<LoanApplication>> {
        self.store.loan_applications_by_user(caller.sub).await
    }
}
