//! Loan form session: sign-in redirect, draft restore and submission.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trademart_api::client::loan::{sign_in_redirect, LOAN_APPLICATION_PATH};
use trademart_api::client::{
    ClientError, DraftStorage, FileDraftStorage, LoanFormSession, LoanSubmitOutcome,
    TradeMartClient,
};
use trademart_api::database::schema::types::LoanStatus;
use trademart_api::handlers::ApiResponse;
use trademart_api::models::{LoanApplication, LoanApplicationRequest};

fn filled_form() -> LoanApplicationRequest {
    LoanApplicationRequest {
        full_name: "Ravi Kumar".to_string(),
        email: "ravi@example.com".to_string(),
        phone: "+91 98765 43210".to_string(),
        business_name: "Kumar Traders".to_string(),
        business_type: "Wholesale".to_string(),
        annual_turnover: Some(Decimal::from(2_000_000)),
        loan_amount: Decimal::from(500_000),
        loan_purpose: "Working capital".to_string(),
        city: "Pune".to_string(),
        pincode: Some("411001".to_string()),
        gst_number: None,
    }
}

fn stored(form: &LoanApplicationRequest) -> LoanApplication {
    LoanApplication {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        full_name: form.full_name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        business_name: form.business_name.clone(),
        business_type: form.business_type.clone(),
        annual_turnover: form.annual_turnover,
        loan_amount: form.loan_amount,
        loan_purpose: form.loan_purpose.clone(),
        city: form.city.clone(),
        pincode: form.pincode.clone(),
        gst_number: form.gst_number.clone(),
        status: LoanStatus::Submitted,
        created_at: Utc::now(),
    }
}

#[test]
fn test_redirect_targets_the_loan_form() {
    assert_eq!(LOAN_APPLICATION_PATH, "/dashboard/loan-application");
    assert_eq!(
        sign_in_redirect(),
        "/auth/signin?callbackUrl=/dashboard/loan-application"
    );
}

#[tokio::test]
async fn test_anonymous_submit_keeps_draft_until_signed_in() {
    let server = MockServer::start().await;
    let drafts = tempfile::tempdir().unwrap();
    let storage: Arc<dyn DraftStorage> = Arc::new(FileDraftStorage::new(drafts.path()));
    let application = stored(&filled_form());

    Mock::given(method("POST"))
        .and(path("/api/loans/submit"))
        .and(header("authorization", "Bearer signed-in"))
        .and(header_exists("idempotency-key"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(ApiResponse::success(json!({ "application": application }))),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Anonymous visitor fills the form and submits
    let anonymous = TradeMartClient::new(server.uri()).unwrap();
    let mut session = LoanFormSession::new(anonymous, storage.clone()).unwrap();
    *session.form_mut() = filled_form();

    let outcome = session.submit().await.unwrap();
    assert_eq!(
        outcome,
        LoanSubmitOutcome::RedirectToSignIn {
            url: "/auth/signin?callbackUrl=/dashboard/loan-application".to_string()
        }
    );

    // Back from sign-in: the form comes back filled
    let signed_in = TradeMartClient::new(server.uri())
        .unwrap()
        .with_token("signed-in");
    let mut session = LoanFormSession::new(signed_in.clone(), storage.clone()).unwrap();
    assert_eq!(session.form(), &filled_form());

    match session.submit().await.unwrap() {
        LoanSubmitOutcome::Submitted(result) => assert_eq!(result, application),
        other => panic!("expected submission, got {:?}", other),
    }

    // Draft is gone after a successful submit
    let fresh = LoanFormSession::new(signed_in, storage).unwrap();
    assert_eq!(fresh.form(), &LoanApplicationRequest::default());
}

#[tokio::test]
async fn test_expired_session_redirects_and_saves_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/loans/submit"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": "Your session has expired. Please sign in again",
            "code": "TOKEN_EXPIRED",
            "requestId": "req-1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let drafts = tempfile::tempdir().unwrap();
    let storage: Arc<dyn DraftStorage> = Arc::new(FileDraftStorage::new(drafts.path()));
    let client = TradeMartClient::new(server.uri())
        .unwrap()
        .with_token("stale");

    let mut session = LoanFormSession::new(client.clone(), storage.clone()).unwrap();
    *session.form_mut() = filled_form();

    let outcome = session.submit().await.unwrap();
    assert!(matches!(outcome, LoanSubmitOutcome::RedirectToSignIn { .. }));

    let restored = LoanFormSession::new(client, storage).unwrap();
    assert_eq!(restored.form(), &filled_form());
}

#[tokio::test]
async fn test_invalid_form_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/loans/submit"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let drafts = tempfile::tempdir().unwrap();
    let storage: Arc<dyn DraftStorage> = Arc::new(FileDraftStorage::new(drafts.path()));
    let client = TradeMartClient::new(server.uri())
        .unwrap()
        .with_token("signed-in");

    let mut session = LoanFormSession::new(client, storage).unwrap();
    let mut form = filled_form();
    form.pincode = Some("0110".to_string());
    *session.form_mut() = form;

    let err = session.submit().await.unwrap_err();
    match err {
        ClientError::Validation { field, message } => {
            assert_eq!(field, "pincode");
            assert_eq!(message, "Pincode must be 6 digits");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}
