use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::auth::Claims;
use crate::error::{ApiError, ErrorCode};
use crate::services::idempotency::{Begin, IdempotencyStore, StoredResponse};

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
pub const IDEMPOTENT_REPLAYED_HEADER: &str = "idempotent-replayed";

const MAX_KEY_LEN: usize = 255;
const MAX_BODY_BYTES: usize = 1024 * 1024;

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Replays or guards mutating requests carrying an `Idempotency-Key`.
///
/// Must run inside the auth middleware: keys are scoped by the caller's id.
pub async fn idempotency_middleware(
    State(store): State<IdempotencyStore>,
    request: Request,
    next: Next,
) -> Response {
    if !is_mutating(request.method()) {
        return next.run(request).await;
    }
    let Some(raw_key) = request.headers().get(IDEMPOTENCY_KEY_HEADER) else {
        return next.run(request).await;
    };

    let key = match raw_key.to_str().map(str::trim) {
        Ok(key) if !key.is_empty() && key.len() <= MAX_KEY_LEN => key.to_string(),
        _ => {
            return ApiError::validation_field(
                "Idempotency-Key",
                "Idempotency-Key must be 1 to 255 visible characters",
            )
            .into_response()
        }
    };

    let scope = request
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.sub.to_string())
        .unwrap_or_else(|| "anonymous".to_string());
    let scoped = IdempotencyStore::scoped_key(&scope, &key);

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return ApiError::with_code(ErrorCode::InvalidInput, "Request body too large")
                .into_response()
        }
    };
    let fingerprint =
        IdempotencyStore::fingerprint(parts.method.as_str(), parts.uri.path(), &body);

    match store.begin(&scoped, &fingerprint) {
        Begin::Proceed => {}
        Begin::InFlight => {
            debug!(key = %key, "Duplicate request while original is in flight");
            return ApiError::code(ErrorCode::RequestInProgress).into_response();
        }
        Begin::Mismatch => {
            warn!(key = %key, path = %parts.uri.path(), "Idempotency key reused with a different request");
            return ApiError::code(ErrorCode::IdempotencyKeyReused).into_response();
        }
        Begin::Replay(stored) => {
            debug!(key = %key, status = stored.status, "Replaying stored response");
            metrics::counter!("idempotent_replays_total").increment(1);
            return replay(stored);
        }
    }

    let guard = store.guard(scoped);
    let response = next.run(Request::from_parts(parts, Body::from(body))).await;

    if response.status().is_server_error() {
        guard.abandon();
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            guard.abandon();
            return ApiError::Internal(format!("failed to buffer response: {}", err))
                .into_response();
        }
    };
    guard.complete(StoredResponse {
        status: parts.status.as_u16(),
        content_type: parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: bytes.clone(),
    });

    Response::from_parts(parts, Body::from(bytes))
}

fn replay(stored: StoredResponse) -> Response {
    let status = StatusCode::from_u16(stored.status).unwrap_or(StatusCode::OK);
    let mut response = (status, stored.body).into_response();
    let headers = response.headers_mut();
    if let Some(content_type) = stored
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
    {
        headers.insert(header::CONTENT_TYPE, content_type);
    }
    headers.insert(IDEMPOTENT_REPLAYED_HEADER, HeaderValue::from_static("true"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn_with_state, routing::post, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    fn app(counter: Arc<AtomicUsize>) -> Router {
        let store = IdempotencyStore::new(Duration::from_secs(60));
        Router::new()
            .route(
                "/things",
                post(move |body: String| {
                    let counter = counter.clone();
                    async move {
                        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        (StatusCode::CREATED, format!("{}#{}", body, n))
                    }
                }),
            )
            .layer(from_fn_with_state(store, idempotency_middleware))
    }

    fn request(key: &str, body: &'static str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/things")
            .header(IDEMPOTENCY_KEY_HEADER, key)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_replay_runs_handler_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let app = app(counter.clone());

        let first = app.clone().oneshot(request("k1", "a")).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let first_body = to_bytes(first.into_body(), 1024).await.unwrap();

        let second = app.clone().oneshot(request("k1", "a")).await.unwrap();
        assert_eq!(second.status(), StatusCode::CREATED);
        assert_eq!(second.headers().get(IDEMPOTENT_REPLAYED_HEADER).unwrap(), "true");
        let second_body = to_bytes(second.into_body(), 1024).await.unwrap();

        assert_eq!(first_body, second_body);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_not_stored() {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = counter.clone();
        let app = Router::new()
            .route(
                "/things",
                post(move || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
                    }
                }),
            )
            .layer(from_fn_with_state(
                IdempotencyStore::new(Duration::from_secs(60)),
                idempotency_middleware,
            ));

        for _ in 0..2 {
            let response = app.clone().oneshot(request("k1", "a")).await.unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert!(response.headers().get(IDEMPOTENT_REPLAYED_HEADER).is_none());
        }
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_duplicate_while_in_flight_is_refused() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let (on_enter, on_release, calls) = (entered.clone(), release.clone(), counter.clone());
        let app = Router::new()
            .route(
                "/things",
                post(move || {
                    let (on_enter, on_release, calls) =
                        (on_enter.clone(), on_release.clone(), calls.clone());
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        on_enter.notify_one();
                        on_release.notified().await;
                        (StatusCode::CREATED, "done")
                    }
                }),
            )
            .layer(from_fn_with_state(
                IdempotencyStore::new(Duration::from_secs(60)),
                idempotency_middleware,
            ));

        let original = tokio::spawn(app.clone().oneshot(request("k1", "a")));
        entered.notified().await;

        let duplicate = app.clone().oneshot(request("k1", "a")).await.unwrap();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
        let body = to_bytes(duplicate.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "REQUEST_IN_PROGRESS");

        release.notify_one();
        let first = original.await.unwrap().unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let replayed = app.oneshot(request("k1", "a")).await.unwrap();
        assert_eq!(replayed.headers().get(IDEMPOTENT_REPLAYED_HEADER).unwrap(), "true");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reused_key_different_body() {
        let counter = Arc::new(AtomicUsize::new(0));
        let app = app(counter.clone());

        app.clone().oneshot(request("k1", "a")).await.unwrap();
        let response = app.oneshot(request("k1", "b")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_requests_without_key_pass_through() {
        let counter = Arc::new(AtomicUsize::new(0));
        let app = app(counter.clone());

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(Method::POST)
                        .uri("/things")
                        .body(Body::from("a"))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert!(response.headers().get(IDEMPOTENT_REPLAYED_HEADER).is_none());
        }
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
