//! Domain types for accounts and movements.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use saldo_shared::types::{AccountId, MovementId};

/// Direction of a movement's effect on the account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Increases the balance.
    Credit,
    /// Decreases the balance.
    Debit,
}

/// The closed set of recognized movement kinds.
///
/// The kind alone determines the direction; there is no per-movement sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementKind {
    /// Cash paid into the account.
    Deposit,
    /// Incoming leg of a transfer.
    TransferIn,
    /// Payment received from a third party.
    IncomingPayment,
    /// Cash taken out of the account.
    Withdrawal,
    /// Outgoing leg of a transfer.
    TransferOut,
    /// Payment made to a third party.
    OutgoingPayment,
}

impl MovementKind {
    /// Classifies the kind as credit or debit.
    ///
    /// The match is exhaustive on purpose: adding a kind without deciding
    /// its direction must not compile.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Deposit | Self::TransferIn | Self::IncomingPayment => Direction::Credit,
            Self::Withdrawal | Self::TransferOut | Self::OutgoingPayment => Direction::Debit,
        }
    }

    /// Returns true for debit-direction kinds.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self.direction(), Direction::Debit)
    }
}

/// A user account holding a balance.
///
/// The stored balance always equals the opening balance plus the sum of the
/// signed deltas of every movement currently attributed to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identity.
    pub id: AccountId,
    /// Current balance, exact decimal.
    pub balance: Decimal,
    /// Gate on new movements. Deactivated accounts keep their history.
    pub active: bool,
    /// When the account was opened.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Opens a new active account with the given opening balance.
    #[must_use]
    pub fn new(opening_balance: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            balance: opening_balance,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single recorded monetary event affecting exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Stable identity.
    pub id: MovementId,
    /// The owning account. A movement never outlives its account.
    pub account_id: AccountId,
    /// Determines the direction of the balance effect.
    pub kind: MovementKind,
    /// Strictly positive, at most 2 decimal digits.
    pub amount: Decimal,
    /// Optional free-text description, bounded length.
    pub description: Option<String>,
    /// When the movement took place.
    pub occurred_at: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a movement.
#[derive(Debug, Clone)]
pub struct NewMovement {
    /// The account the movement applies to.
    pub account_id: AccountId,
    /// Movement kind.
    pub kind: MovementKind,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Optional description.
    pub description: Option<String>,
}

/// Replacement fields for updating an existing movement.
///
/// Updates are destructive: the prior contribution is reversed and the new
/// one applied, with no audit trail of the original entry.
#[derive(Debug, Clone)]
pub struct MovementChange {
    /// New movement kind.
    pub kind: MovementKind,
    /// New strictly positive amount.
    pub amount: Decimal,
    /// New description, replacing the old one.
    pub description: Option<String>,
}

/// What a successful coordinator call hands back to the caller.
#[derive(Debug, Clone)]
pub struct MovementOutcome {
    /// The movement as persisted.
    pub movement: Movement,
    /// The account with its post-commit balance.
    pub account: Account,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_credit_kinds() {
        assert_eq!(MovementKind::Deposit.direction(), Direction::Credit);
        assert_eq!(MovementKind::TransferIn.direction(), Direction::Credit);
        assert_eq!(MovementKind::IncomingPayment.direction(), Direction::Credit);
    }

    #[test]
    fn test_debit_kinds() {
        assert_eq!(MovementKind::Withdrawal.direction(), Direction::Debit);
        assert_eq!(MovementKind::TransferOut.direction(), Direction::Debit);
        assert_eq!(MovementKind::OutgoingPayment.direction(), Direction::Debit);
        assert!(MovementKind::Withdrawal.is_debit());
        assert!(!MovementKind::Deposit.is_debit());
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&MovementKind::TransferIn).unwrap();
        assert_eq!(json, "\"transfer-in\"");
        let json = serde_json::to_string(&MovementKind::OutgoingPayment).unwrap();
        assert_eq!(json, "\"outgoing-payment\"");
    }

    #[test]
    fn test_new_account_is_active() {
        let account = Account::new(dec!(100.00));
        assert!(account.active);
        assert_eq!(account.balance, dec!(100.00));
        assert_eq!(account.created_at, account.updated_at);
    }
}
