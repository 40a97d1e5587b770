//! Input validation for movement fields.
//!
//! These checks run before the engine is invoked; the engine assumes
//! well-formed input.

use rust_decimal::Decimal;

use super::error::LedgerError;

/// Maximum decimal digits an amount may carry.
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// Validates a movement amount: strictly positive, at most
/// [`MAX_AMOUNT_SCALE`] decimal digits.
///
/// # Errors
///
/// `ZeroAmount`, `NegativeAmount` or `ExcessivePrecision`.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if amount.is_sign_negative() {
        return Err(LedgerError::NegativeAmount);
    }
    validate_scale(amount)
}

/// Validates the precision of a balance-bearing decimal.
///
/// Trailing zeros do not count against the bound: `10.100` is accepted.
///
/// # Errors
///
/// `ExcessivePrecision` if more than [`MAX_AMOUNT_SCALE`] significant
/// decimal digits are present.
pub fn validate_scale(value: Decimal) -> Result<(), LedgerError> {
    let scale = value.normalize().scale();
    if scale > MAX_AMOUNT_SCALE {
        return Err(LedgerError::ExcessivePrecision { scale });
    }
    Ok(())
}

/// Validates an optional movement description against a length bound.
///
/// # Errors
///
/// `DescriptionTooLong` if the description exceeds `max_len` characters.
pub fn validate_description(description: Option<&str>, max_len: usize) -> Result<(), LedgerError> {
    if let Some(text) = description {
        let len = text.chars().count();
        if len > max_len {
            return Err(LedgerError::DescriptionTooLong { len, max: max_len });
        }
    }
    Ok(())
}
