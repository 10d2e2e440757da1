//! Typed client for the marketplace API.
//!
//! [`TradeMartClient`] decodes the `{success, data, error}` envelope into
//! typed results and [`ClientError`]s. The [`dashboard`], [`quotes`] and
//! [`loan`] modules hold the stateful flows built on top of it. Every call is
//! a plain future: dropping it aborts the request.

pub mod dashboard;
pub mod error;
pub mod loan;
pub mod quotes;

pub use dashboard::Dashboard;
pub use error::ClientError;
pub use loan::{DraftStorage, FileDraftStorage, LoanFormSession, LoanSubmitOutcome, MemoryDraftStorage};
pub use quotes::{QuoteForm, QuoteFormState, QuoteSubmission, QuoteSubmitter};

use std::time::Duration;

use reqwest::{header::AUTHORIZATION, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::database::schema::types::RfqStatus;
use crate::error::ErrorCode;
use crate::handlers::loans::LoanApplicationData;
use crate::handlers::quotes::QuoteData;
use crate::handlers::response::ApiResponse;
use crate::handlers::rfqs::{DeletedData, MyRfqsData, RfqData};
use crate::middleware::idempotency::IDEMPOTENCY_KEY_HEADER;
use crate::models::{
    AuthResponse, CreateQuoteRequest, DashboardData, DashboardView, LoanApplication,
    LoanApplicationRequest, Quote, Rfq, SigninRequest, UpdateRfqStatusRequest,
};
use crate::services::RfqDetail;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure envelope as seen by the client. Every field is optional so that
/// proxies and older servers still produce a readable error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    field: Option<String>,
}

#[derive(Clone)]
pub struct TradeMartClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl TradeMartClient {
    /// Client for the API rooted at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Same client, authenticated with a bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fresh key for one logical mutating action
    pub fn new_idempotency_key() -> String {
        Uuid::new_v4().to_string()
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = SigninRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.request(Method::POST, "/api/auth/signin").json(&body))
            .await
    }

    pub async fn get_rfq(&self, id: Uuid) -> Result<RfqDetail, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/rfqs/{}", id)))
            .await
    }

    pub async fn my_rfqs(&self) -> Result<MyRfqsData, ClientError> {
        self.send(self.request(Method::GET, "/api/rfqs/my-rfqs")).await
    }

    pub async fn update_rfq_status(
        &self,
        id: Uuid,
        status: RfqStatus,
        idempotency_key: &str,
    ) -> Result<Rfq, ClientError> {
        let data: RfqData = self
            .send_mutation(
                Method::PUT,
                &format!("/api/rfqs/{}", id),
                Some(&UpdateRfqStatusRequest { status }),
                idempotency_key,
            )
            .await?;
        Ok(data.rfq)
    }

    /// DELETE on an item path such as `/api/products/{id}`; returns the deleted id
    pub async fn delete_path(&self, path: &str, idempotency_key: &str) -> Result<Uuid, ClientError> {
        let data: DeletedData = self
            .send_mutation::<(), _>(Method::DELETE, path, None, idempotency_key)
            .await?;
        Ok(data.id)
    }

    pub async fn submit_quote(
        &self,
        request: &CreateQuoteRequest,
        idempotency_key: &str,
    ) -> Result<Quote, ClientError> {
        let data: QuoteData = self
            .send_mutation(Method::POST, "/api/quotes/create", Some(request), idempotency_key)
            .await?;
        Ok(data.quote)
    }

    pub async fn dashboard(&self, view: Option<DashboardView>) -> Result<DashboardData, ClientError> {
        let mut builder = self.request(Method::GET, "/api/dashboard");
        if let Some(view) = view {
            builder = builder.query(&[("view", view)]);
        }
        self.send(builder).await
    }

    pub async fn submit_loan_application(
        &self,
        request: &LoanApplicationRequest,
        idempotency_key: &str,
    ) -> Result<LoanApplication, ClientError> {
        let data: LoanApplicationData = self
            .send_mutation(Method::POST, "/api/loans/submit", Some(request), idempotency_key)
            .await?;
        Ok(data.application)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send_mutation<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        idempotency_key: &str,
    ) -> Result<T, ClientError> {
        let mut builder = self
            .request(method, path)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)
                .map_err(|e| ClientError::Parse(format!("Failed to parse response: {}", e)))?;
            return envelope
                .data
                .ok_or_else(|| ClientError::Parse("Response envelope has no data".to_string()));
        }

        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
        let code = body.code.as_deref().and_then(ErrorCode::from_wire);
        let message = body.error.unwrap_or_default();
        debug!(status = status.as_u16(), ?code, "API call failed");

        if code == Some(ErrorCode::NotFound) {
            return Err(ClientError::NotFound(message));
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
            field: body.field,
        })
    }
}
