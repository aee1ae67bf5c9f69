//! # Validation Utilities
//!
//! Input validation helpers.

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate email format (basic check).
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.contains('@') && email.contains('.') {
        Ok(())
    } else {
        Err("Invalid email format".to_string())
    }
}

/// Validate minimum length.
pub fn validate_min_length(value: &str, min: usize, field_name: &str) -> Result<(), String> {
    if value.len() < min {
        Err(format!("{} must be at least {} characters", field_name, min))
    } else {
        Ok(())
    }
}

/// Validate a `0x`-prefixed, 20-byte hex Ethereum address.
///
/// Checksum casing is not verified.
pub fn validate_eth_address(address: &str) -> Result<(), String> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| format!("Address must start with 0x: {}", address))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Invalid Ethereum address: {}", address));
    }

    Ok(())
}

/// Largest quantity a single record may carry.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Validate that a quantity is strictly positive and within [`MAX_QUANTITY`].
pub fn validate_positive(value: i64, field_name: &str) -> Result<(), String> {
    if value <= 0 {
        Err(format!("{} must be greater than zero", field_name))
    } else if value > MAX_QUANTITY {
        Err(format!("{} cannot exceed {}", field_name, MAX_QUANTITY))
    } else {
        Ok(())
    }
}

/// Validate a stock level: zero or more, within [`MAX_QUANTITY`].
pub fn validate_stock_level(value: i64, field_name: &str) -> Result<(), String> {
    if value < 0 {
        Err(format!("{} cannot be negative", field_name))
    } else if value > MAX_QUANTITY {
        Err(format!("{} cannot exceed {}", field_name, MAX_QUANTITY))
    } else {
        Ok(())
    }
}
