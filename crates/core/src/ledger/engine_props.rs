//! Property tests for the balance-mutation engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::Ledger;
use super::types::{Account, Direction, MovementKind};

static ALL_KINDS: [MovementKind; 6] = [
    MovementKind::Deposit,
    MovementKind::TransferIn,
    MovementKind::IncomingPayment,
    MovementKind::Withdrawal,
    MovementKind::TransferOut,
    MovementKind::OutgoingPayment,
];

/// Strategy for amounts with at most 2 decimal digits, strictly positive.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000_00).prop_map(|cents| Decimal::new(cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = MovementKind> {
    prop::sample::select(ALL_KINDS.as_slice())
}

fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000_000_00).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Applying a delta and then its reversal restores the balance exactly,
    /// with no rounding drift.
    #[test]
    fn prop_apply_then_reverse_is_identity(
        balance in balance_strategy(),
        kind in kind_strategy(),
        amount in amount_strategy(),
    ) {
        let applied = balance + Ledger::delta(kind, amount);
        let restored = applied + Ledger::reverse_delta(kind, amount);
        prop_assert_eq!(restored, balance);
    }

    /// The delta's sign always matches the kind's direction and its
    /// magnitude always equals the amount.
    #[test]
    fn prop_delta_matches_direction(
        kind in kind_strategy(),
        amount in amount_strategy(),
    ) {
        let delta = Ledger::delta(kind, amount);
        match kind.direction() {
            Direction::Credit => prop_assert_eq!(delta, amount),
            Direction::Debit => prop_assert_eq!(delta, -amount),
        }
        prop_assert_eq!(delta.abs(), amount);
    }

    /// After any sequence of applied movements the balance equals the
    /// opening balance plus the sum of all signed deltas.
    #[test]
    fn prop_balance_is_opening_plus_deltas(
        opening in balance_strategy(),
        movements in prop::collection::vec((kind_strategy(), amount_strategy()), 1..30),
    ) {
        let mut balance = opening;
        for (kind, amount) in &movements {
            balance += Ledger::delta(*kind, *amount);
        }

        let total: Decimal = movements
            .iter()
            .map(|(kind, amount)| Ledger::delta(*kind, *amount))
            .sum();
        prop_assert_eq!(balance, opening + total);
    }

    /// For an active account, a debit is admitted exactly when the balance
    /// covers the amount; credits are always admitted.
    #[test]
    fn prop_admission_boundary(
        balance in balance_strategy(),
        kind in kind_strategy(),
        amount in amount_strategy(),
    ) {
        let account = Account::new(balance);
        let admitted = Ledger::validate_admission(&account, kind, amount).is_ok();
        match kind.direction() {
            Direction::Credit => prop_assert!(admitted),
            Direction::Debit => prop_assert_eq!(admitted, balance >= amount),
        }
    }
}
