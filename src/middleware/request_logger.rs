use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::utils::{extract_ip_address, extract_request_id, extract_user_agent};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Request id of the request currently being served, if inside the logger
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// Logs every request and response and tags both with an `X-Request-ID`.
///
/// A caller-supplied id is kept; otherwise a fresh UUID is assigned. Error
/// bodies produced while the request runs report the same id.
pub async fn request_logger_middleware(request: Request, next: Next) -> Response {
    let request_id =
        extract_request_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        client_ip = extract_ip_address(request.headers()).as_deref().unwrap_or("-"),
        "Incoming request"
    );
    debug!(
        request_id = %request_id,
        user_agent = extract_user_agent(request.headers()).as_deref().unwrap_or("-"),
        "Request headers"
    );

    let mut response = REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis();

    match status {
        status if status.is_server_error() => error!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration_ms,
            "Request failed with server error"
        ),
        status if status.is_client_error() => warn!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration_ms,
            "Request failed with client error"
        ),
        StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => info!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration_ms,
            "Request completed successfully"
        ),
        _ => debug!(
            request_id = %request_id,
            status = %status,
            duration_ms = %duration_ms,
            "Request completed"
        ),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
