//! Form-field validation shared by every request type.
//!
//! All regex-based field checks live here so profile, supplier, RFQ and loan
//! forms apply the same rules.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

/// Phone number: optional leading `+`, 10 to 15 digits, spaces and dashes allowed between groups
pub static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9](?:[0-9 \-]{8,17})[0-9]$").expect("valid phone regex"));

/// Indian GSTIN: 2-digit state code, PAN, entity number, `Z`, checksum
pub static GST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN regex")
});

/// Six-digit postal code that does not start with zero
pub static PINCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("valid pincode regex"));

/// ISO 4217 style currency code
pub static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency regex"));

/// Website URL with explicit scheme
pub static WEBSITE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("valid url regex"));

/// Count the digits in a phone number, ignoring separators
pub fn phone_digits(phone: &str) -> usize {
    phone.chars().filter(|c| c.is_ascii_digit()).count()
}

/// True when the phone number matches the pattern and has 10-15 digits
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone_digits(phone);
    PHONE_RE.is_match(phone.trim()) && (10..=15).contains(&digits)
}

/// `validator` custom rule for phone fields
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Please enter a valid phone number".into());
        Err(err)
    }
}

/// Largest amount a `NUMERIC(18, 2)` money column holds
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, 2);

fn amount_too_large() -> ValidationError {
    let mut err = ValidationError::new("max_amount");
    err.message = Some("Amount is too large".into());
    err
}

/// `validator` custom rule for strictly positive amounts
pub fn validate_positive(amount: &Decimal) -> Result<(), ValidationError> {
    if !amount.is_sign_positive() || amount.is_zero() {
        let mut err = ValidationError::new("positive");
        err.message = Some("Amount must be greater than zero".into());
        return Err(err);
    }
    if *amount > MAX_AMOUNT {
        return Err(amount_too_large());
    }
    Ok(())
}

/// `validator` custom rule for amounts that may be zero but not negative
pub fn validate_non_negative(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("Amount cannot be negative".into());
        return Err(err);
    }
    if *amount > MAX_AMOUNT {
        return Err(amount_too_large());
    }
    Ok(())
}

/// Trim every entry and drop empty or duplicate values, preserving order
pub fn normalize_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !out.iter().any(|v| v.eq_ignore_ascii_case(trimmed)) {
            out.push(trimmed.to_string());
        }
    }
    out
}
