//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Integrity(format!("invalid {label} id")))
}

/// Reject negative counts coming from callers.
pub(crate) fn ensure_non_negative(value: i64, label: &str) -> ResultEngine<()> {
    if value < 0 {
        return Err(EngineError::InvalidQuantity(format!(
            "{label} must be >= 0, got {value}"
        )));
    }
    Ok(())
}

/// Multiply two counts, rejecting overflow instead of wrapping.
pub(crate) fn checked_mul(a: i64, b: i64, label: &str) -> ResultEngine<i64> {
    a.checked_mul(b)
        .ok_or_else(|| EngineError::InvalidQuantity(format!("{label} overflows")))
}

/// Add two counts, rejecting overflow instead of wrapping.
pub(crate) fn checked_add(a: i64, b: i64, label: &str) -> ResultEngine<i64> {
    a.checked_add(b)
        .ok_or_else(|| EngineError::InvalidQuantity(format!("{label} overflows")))
}

/// Parse a payment string into whole gold pieces.
pub(crate) fn parse_payment(raw: &str) -> ResultEngine<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| EngineError::PaymentMismatch(format!("payment \"{raw}\" is not a gold amount")))
}
