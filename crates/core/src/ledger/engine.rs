//! Signed delta computation and admission checks.
//!
//! Pure, side-effect-free decision logic over a proposed movement and the
//! account's current state. Amount well-formedness (positive, bounded
//! precision) is a caller precondition, see [`super::validation`].

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{Account, Direction, MovementKind};

/// Stateless balance-mutation engine.
pub struct Ledger;

impl Ledger {
    /// Computes the signed balance change produced by a movement.
    ///
    /// Credit kinds contribute `+amount`, debit kinds `-amount`.
    #[must_use]
    pub fn delta(kind: MovementKind, amount: Decimal) -> Decimal {
        match kind.direction() {
            Direction::Credit => amount,
            Direction::Debit => -amount,
        }
    }

    /// Computes the additive inverse of [`Ledger::delta`].
    ///
    /// Used to undo a previously applied movement when it is edited or
    /// deleted. Exact: applying a delta and then its reversal restores the
    /// balance bit-for-bit.
    #[must_use]
    pub fn reverse_delta(kind: MovementKind, amount: Decimal) -> Decimal {
        -Self::delta(kind, amount)
    }

    /// Checks whether a movement may be admitted against the account as it
    /// stands, before any pending change is applied.
    ///
    /// Debit kinds require `balance >= amount`; credit kinds have no balance
    /// floor. Deactivated accounts admit nothing.
    ///
    /// # Errors
    ///
    /// `AccountInactive` if the account is deactivated, `InsufficientFunds`
    /// if a debit would take the balance negative.
    pub fn validate_admission(
        account: &Account,
        kind: MovementKind,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if !account.active {
            return Err(LedgerError::AccountInactive(account.id));
        }

        if kind.is_debit() && account.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                available: account.balance,
                requested: amount,
            });
        }

        Ok(())
    }
}
