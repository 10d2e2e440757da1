//! HTTP handlers. Each module maps one resource onto its service; business
//! rules stay in `crate::services`.

pub mod auth;
pub mod dashboard;
pub mod diagnostics;
pub mod extractors;
pub mod health;
pub mod loans;
pub mod metrics;
pub mod openapi;
pub mod products;
pub mod profile;
pub mod quotes;
pub mod response;
pub mod rfqs;
pub mod suppliers;

pub use openapi::ApiDoc;
pub use response::{ApiResponse, Created, Success};
