pub mod request_info;
pub mod validation;

pub use request_info::{extract_ip_address, extract_request_id, extract_user_agent};
