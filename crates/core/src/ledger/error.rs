//! Error types for ledger operations.
//!
//! Every business-rule failure is a rejection reported to the caller with no
//! side effect; none of these are fatal to the process.

use rust_decimal::Decimal;
use thiserror::Error;

use saldo_shared::types::{AccountId, MovementId};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Movement amount cannot be zero.
    #[error("Movement amount cannot be zero")]
    ZeroAmount,

    /// Movement amount cannot be negative.
    #[error("Movement amount cannot be negative")]
    NegativeAmount,

    /// Movement amount carries more precision than the ledger stores.
    #[error("Movement amount has {scale} decimal digits, at most 2 are allowed")]
    ExcessivePrecision {
        /// Decimal digits carried by the rejected amount.
        scale: u32,
    },

    /// Description exceeds the configured length bound.
    #[error("Description is {len} characters long, at most {max} are allowed")]
    DescriptionTooLong {
        /// Length of the rejected description.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Accounts cannot be opened in overdraft.
    #[error("Opening balance cannot be negative")]
    NegativeOpeningBalance,

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is deactivated and admits no new movements.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// An account with this id is already registered.
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(AccountId),

    /// A debit would take the balance negative.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Balance before the rejected movement.
        available: Decimal,
        /// Amount the movement asked for.
        requested: Decimal,
    },

    // ========== Movement Errors ==========
    /// Movement not found.
    #[error("Movement not found: {0}")]
    MovementNotFound(MovementId),

    // ========== Concurrency Errors ==========
    /// Concurrent modification detected by the serialization mechanism.
    #[error("Concurrent modification detected, please retry")]
    Conflict,

    // ========== Store Errors ==========
    /// The underlying store could not commit; the whole unit of work was
    /// rolled back.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::ExcessivePrecision { .. } => "EXCESSIVE_PRECISION",
            Self::DescriptionTooLong { .. } => "DESCRIPTION_TOO_LONG",
            Self::NegativeOpeningBalance => "NEGATIVE_OPENING_BALANCE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountAlreadyExists(_) => "ACCOUNT_ALREADY_EXISTS",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::MovementNotFound(_) => "MOVEMENT_NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// The HTTP layer lives outside this crate; the mapping is kept here so
    /// every caller agrees on it.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation and business-rule rejections
            Self::ZeroAmount
            | Self::NegativeAmount
            | Self::ExcessivePrecision { .. }
            | Self::DescriptionTooLong { .. }
            | Self::NegativeOpeningBalance
            | Self::AccountInactive(_)
            | Self::InsufficientFunds { .. } => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::MovementNotFound(_) => 404,

            // 409 Conflict
            Self::AccountAlreadyExists(_) | Self::Conflict => 409,

            // 500 Internal Server Error
            Self::Persistence(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}
