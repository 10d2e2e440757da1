//! TradeMart marketplace API: buyers post RFQs, suppliers list products and
//! quote, both manage a shared profile and can file loan referrals.
//!
//! The crate also ships a typed HTTP client in [`client`] that drives the
//! dashboard, quote and loan-application flows against the API.

pub mod app_state;
pub mod auth;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;
pub mod startup;
pub mod utils;

pub use app_state::AppState;
pub use config::Config;
pub use error::ApiError;
pub use router::build_router;
