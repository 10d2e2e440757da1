use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{ClientError, TradeMartClient};
use crate::models::{CreateQuoteRequest, Quote};
use crate::services::RfqDetail;

const DEFAULT_CURRENCY: &str = "INR";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn invalid(field: &str, message: &str) -> ClientError {
    ClientError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Raw quote form input, as typed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteForm {
    pub price: String,
    pub currency: String,
    pub lead_time: String,
    pub notes: String,
}

impl QuoteForm {
    /// Check the form locally and build the request body.
    /// Nothing is sent when this fails.
    pub fn validate(&self, rfq_id: Uuid) -> Result<CreateQuoteRequest, ClientError> {
        let price = self.price.trim();
        if price.is_empty() {
            return Err(invalid("price", "Price is required"));
        }
        let price = Decimal::from_str(price)
            .map_err(|_| invalid("price", "Please enter a valid price"))?;
        if price <= Decimal::ZERO {
            return Err(invalid("price", "Price must be greater than zero"));
        }

        let lead_time = self.lead_time.trim();
        if lead_time.is_empty() {
            return Err(invalid("leadTime", "Lead time is required"));
        }

        let currency = match self.currency.trim() {
            "" => DEFAULT_CURRENCY.to_string(),
            code => code.to_uppercase(),
        };
        let notes = Some(self.notes.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let request = CreateQuoteRequest {
            rfq_id,
            price,
            currency,
            lead_time: lead_time.to_string(),
            notes,
        };
        request
            .validate()
            .map_err(|errors| ClientError::from_validation(&errors))?;
        Ok(request)
    }
}

/// What a successful submission produced
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSubmission {
    pub quote: Quote,
    /// Re-fetched RFQ, `None` when the follow-up read failed
    pub detail: Option<RfqDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuoteFormState {
    Idle,
    Submitting,
    /// Quote accepted by the server
    Success(Box<QuoteSubmission>),
}

/// Drives one RFQ's quote form through `Idle -> Submitting -> Success`
pub struct QuoteSubmitter {
    client: TradeMartClient,
    rfq_id: Uuid,
    state: Mutex<QuoteFormState>,
    last_error: Mutex<Option<String>>,
}

/// Puts the form back to `Idle` unless the submission finished
struct SubmittingGuard<'a> {
    state: &'a Mutex<QuoteFormState>,
    finished: bool,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock(self.state) = QuoteFormState::Idle;
        }
    }
}

impl QuoteSubmitter {
    pub fn new(client: TradeMartClient, rfq_id: Uuid) -> Self {
        Self {
            client,
            rfq_id,
            state: Mutex::new(QuoteFormState::Idle),
            last_error: Mutex::new(None),
        }
    }

    pub fn state(&self) -> QuoteFormState {
        lock(&self.state).clone()
    }

    /// User-facing text of the last failure, cleared on success
    pub fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    /// Validate, submit under a fresh idempotency key, then re-fetch the RFQ
    /// so the caller sees the new quote count and status.
    ///
    /// Once the server has accepted the quote the form is in `Success`, even
    /// if the re-fetch fails.
    pub async fn submit(&self, form: &QuoteForm) -> Result<QuoteSubmission, ClientError> {
        let request = match form.validate(self.rfq_id) {
            Ok(request) => request,
            Err(err) => {
                *lock(&self.last_error) = Some(err.user_message());
                return Err(err);
            }
        };

        let mut guard = {
            let mut state = lock(&self.state);
            if *state == QuoteFormState::Submitting {
                return Err(ClientError::ActionInFlight(self.rfq_id));
            }
            *state = QuoteFormState::Submitting;
            SubmittingGuard {
                state: &self.state,
                finished: false,
            }
        };

        let key = TradeMartClient::new_idempotency_key();
        let quote = match self.client.submit_quote(&request, &key).await {
            Ok(quote) => quote,
            Err(err) => {
                warn!(rfq_id = %self.rfq_id, error = %err, "Quote submission failed");
                *lock(&self.last_error) = Some(err.user_message());
                drop(guard);
                return Err(err);
            }
        };

        let detail = match self.client.get_rfq(self.rfq_id).await {
            Ok(detail) => Some(detail),
            Err(err) => {
                warn!(rfq_id = %self.rfq_id, quote_id = %quote.id, error = %err, "Quote submitted but RFQ refresh failed");
                None
            }
        };
        info!(
            rfq_id = %self.rfq_id,
            quote_id = %quote.id,
            quotes = detail.as_ref().map(|d| d.rfq.quote_count),
            "Quote submitted"
        );

        let submission = QuoteSubmission { quote, detail };
        *lock(&self.state) = QuoteFormState::Success(Box::new(submission.clone()));
        *lock(&self.last_error) = None;
        guard.finished = true;
        Ok(submission)
    }
}
