// Middleware: request ids and logging, metrics, security headers, idempotency.
// Authentication lives in `crate::auth::middleware`.

pub mod idempotency;
pub mod metrics;
pub mod request_logger;
pub mod security_headers;

pub use idempotency::idempotency_middleware;
pub use metrics::metrics_middleware;
pub use request_logger::request_logger_middleware;
pub use security_headers::add_security_headers;
