//! Input validation helpers
//!
//! Form rules shared by the create/update handlers: required text, email
//! pattern and numeric minimums. Each helper returns the first failing rule as
//! a human readable message.

use rust_decimal::Decimal;

use crate::server::controller::error::ApiError;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_NOTE_LEN: usize = 1000;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;
/// Ceiling for any single money amount or stock quantity.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
pub const MAX_QUANTITY: u32 = 999;

/// Required, non-blank text within the length limit.
pub fn validate_required_text(value: &str, message: &str, max_len: usize) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(message));
    }
    if value.chars().count() > max_len {
        return Err(ApiError::validation(format!(
            "{message} (at most {max_len} characters)"
        )));
    }
    Ok(())
}

/// Optional text, if present, within the length limit.
pub fn validate_optional_text(value: Option<&str>, field: &str, max_len: usize) -> Result<(), ApiError> {
    if let Some(v) = value {
        if v.chars().count() > max_len {
            return Err(ApiError::validation(format!(
                "{field} is too long (at most {max_len} characters)"
            )));
        }
    }
    Ok(())
}

/// Loose `local@domain.tld` check.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.len() > MAX_EMAIL_LEN || value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
        }
        None => false,
    }
}

pub fn validate_email(value: &str) -> Result<(), ApiError> {
    validate_required_text(value, "Email is required", MAX_EMAIL_LEN)?;
    if !is_valid_email(value) {
        return Err(ApiError::validation("Please enter a valid email address."));
    }
    Ok(())
}

pub fn validate_min_u32(value: u32, min: u32, message: &str) -> Result<(), ApiError> {
    if value < min {
        return Err(ApiError::validation(message));
    }
    Ok(())
}

pub fn validate_max_u32(value: u32, max: u32, message: &str) -> Result<(), ApiError> {
    if value > max {
        return Err(ApiError::validation(format!("{message} (at most {max})")));
    }
    Ok(())
}

pub fn validate_non_negative(value: Decimal, message: &str) -> Result<(), ApiError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ApiError::validation(message));
    }
    validate_max_amount(value)
}

pub fn validate_positive(value: Decimal, message: &str) -> Result<(), ApiError> {
    if value <= Decimal::ZERO {
        return Err(ApiError::validation(message));
    }
    validate_max_amount(value)
}

fn validate_max_amount(value: Decimal) -> Result<(), ApiError> {
    if value > MAX_AMOUNT {
        return Err(amount_too_large());
    }
    Ok(())
}

/// A computed total that no longer fits.
pub fn amount_too_large() -> ApiError {
    ApiError::validation(format!("Amount exceeds the maximum of {MAX_AMOUNT}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("john.smith@example.com"));
        assert!(is_valid_email("  h.tanaka@example.jp "));
        assert!(!is_valid_email("john.smith"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("john@example"));
        assert!(!is_valid_email("john@.com"));
        assert!(!is_valid_email("jo hn@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn required_text_rejects_blank() {
        assert!(validate_required_text("   ", "Guest name is required", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Ann", "Guest name is required", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text(&"x".repeat(5), "Name", 4).is_err());
    }

    #[test]
    fn numeric_minimums() {
        assert!(validate_min_u32(0, 1, "Number of guests is required").is_err());
        assert!(validate_min_u32(1, 1, "Number of guests is required").is_ok());
        assert!(validate_non_negative(Decimal::ZERO, "Price must be positive").is_ok());
        assert!(validate_non_negative(Decimal::from(-1), "Price must be positive").is_err());
        assert!(validate_positive(Decimal::ZERO, "Amount must be positive").is_err());
    }

    #[test]
    fn amounts_and_quantities_are_capped() {
        assert!(validate_positive(MAX_AMOUNT, "Amount must be positive").is_ok());
        let err = validate_positive(MAX_AMOUNT + Decimal::ONE, "Amount must be positive").unwrap_err();
        assert_eq!(err.to_string(), "Amount exceeds the maximum of 1000000000");
        assert!(validate_non_negative(Decimal::from_scientific("5e28").unwrap(), "x").is_err());
        assert!(validate_max_u32(MAX_QUANTITY, MAX_QUANTITY, "Quantity").is_ok());
        assert!(validate_max_u32(u32::MAX, MAX_QUANTITY, "Quantity").is_err());
    }
}
