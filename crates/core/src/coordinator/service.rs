//! Movement coordinator service.
//!
//! Each operation loads current account state, asks the ledger engine to
//! validate and compute deltas, and commits the movement record together
//! with the updated balance, or commits nothing at all.

use chrono::Utc;
use rust_decimal::Decimal;

use saldo_shared::config::CoordinatorConfig;
use saldo_shared::types::{AccountId, MovementId};

use super::store::{AccountStore, LedgerStore, MovementStore};
use crate::ledger::engine::Ledger;
use crate::ledger::error::LedgerError;
use crate::ledger::types::{Account, Movement, MovementChange, MovementOutcome, NewMovement};
use crate::ledger::validation;

/// Coordinates movement operations against a ledger store.
///
/// The store handle is passed in explicitly; the service keeps no ambient
/// state of its own.
#[derive(Debug)]
pub struct MovementService<S> {
    store: S,
    config: CoordinatorConfig,
}

impl<S: LedgerStore> MovementService<S> {
    /// Creates a service with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, CoordinatorConfig::default())
    }

    /// Creates a service with explicit configuration.
    pub const fn with_config(store: S, config: CoordinatorConfig) -> Self {
        Self { store, config }
    }

    /// Read access to the underlying store, e.g. for pass-through queries.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Opens a new active account with the given opening balance.
    ///
    /// # Errors
    ///
    /// `NegativeOpeningBalance`, `ExcessivePrecision` or a store error.
    pub fn open_account(&self, opening_balance: Decimal) -> Result<Account, LedgerError> {
        if opening_balance.is_sign_negative() {
            return Err(LedgerError::NegativeOpeningBalance);
        }
        validation::validate_scale(opening_balance)?;

        let account = Account::new(opening_balance);
        self.store.register_account(account.clone())?;
        tracing::debug!(account_id = %account.id, balance = %account.balance, "account opened");
        Ok(account)
    }

    /// Soft-disables an account. Existing history and balance are untouched;
    /// new movements are rejected from here on.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or a store error.
    pub fn deactivate_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        let account = self.run_with_retries(|| {
            self.store.serialized(account_id, |txn| {
                let mut account = txn
                    .load_account(account_id)?
                    .ok_or(LedgerError::AccountNotFound(account_id))?;
                account.active = false;
                account.updated_at = Utc::now();
                txn.save_account(&account)?;
                Ok(account)
            })
        })?;
        tracing::debug!(account_id = %account.id, "account deactivated");
        Ok(account)
    }

    /// Creates a movement and applies its signed delta to the account.
    ///
    /// # Errors
    ///
    /// Input validation errors, `AccountNotFound`, `AccountInactive`,
    /// `InsufficientFunds`, or a store error. On any error neither the
    /// movement nor the balance is persisted.
    pub fn create_movement(&self, input: NewMovement) -> Result<MovementOutcome, LedgerError> {
        validation::validate_amount(input.amount)?;
        validation::validate_description(
            input.description.as_deref(),
            self.config.max_description_len,
        )?;

        let outcome = self.run_with_retries(|| self.try_create(&input))?;
        tracing::debug!(
            movement_id = %outcome.movement.id,
            account_id = %outcome.account.id,
            balance = %outcome.account.balance,
            "movement created"
        );
        Ok(outcome)
    }

    /// Replaces a movement's kind, amount and description.
    ///
    /// The old contribution is reversed and the new one applied as one
    /// atomic step; the mid-reversal balance is never observable. Admission
    /// for the new kind/amount runs against the reversed balance.
    ///
    /// # Errors
    ///
    /// Input validation errors, `MovementNotFound`, `AccountNotFound`,
    /// `AccountInactive`, `InsufficientFunds`, or a store error. On any
    /// error movement and balance stay exactly as they were.
    pub fn update_movement(
        &self,
        movement_id: MovementId,
        change: MovementChange,
    ) -> Result<MovementOutcome, LedgerError> {
        validation::validate_amount(change.amount)?;
        validation::validate_description(
            change.description.as_deref(),
            self.config.max_description_len,
        )?;

        let outcome = self.run_with_retries(|| self.try_update(movement_id, &change))?;
        tracing::debug!(
            movement_id = %outcome.movement.id,
            account_id = %outcome.account.id,
            balance = %outcome.account.balance,
            "movement updated"
        );
        Ok(outcome)
    }

    /// Deletes a movement, reversing its contribution to the balance.
    ///
    /// No admission check runs here: reversing a credit may push the
    /// balance below what a fresh debit would be allowed to, and that is
    /// accepted behavior.
    ///
    /// # Errors
    ///
    /// `MovementNotFound`, `AccountNotFound`, or a store error.
    pub fn delete_movement(&self, movement_id: MovementId) -> Result<MovementOutcome, LedgerError> {
        let outcome = self.run_with_retries(|| self.try_delete(movement_id))?;
        tracing::debug!(
            movement_id = %outcome.movement.id,
            account_id = %outcome.account.id,
            balance = %outcome.account.balance,
            "movement deleted"
        );
        Ok(outcome)
    }

    fn try_create(&self, input: &NewMovement) -> Result<MovementOutcome, LedgerError> {
        self.store.serialized(input.account_id, |txn| {
            let mut account = txn
                .load_account(input.account_id)?
                .ok_or(LedgerError::AccountNotFound(input.account_id))?;

            Ledger::validate_admission(&account, input.kind, input.amount)?;

            let now = Utc::now();
            account.balance += Ledger::delta(input.kind, input.amount);
            account.updated_at = now;

            let movement = Movement {
                id: MovementId::new(),
                account_id: input.account_id,
                kind: input.kind,
                amount: input.amount,
                description: input.description.clone(),
                occurred_at: now,
                created_at: now,
                updated_at: now,
            };

            txn.save_movement(&movement)?;
            txn.save_account(&account)?;
            Ok(MovementOutcome { movement, account })
        })
    }

    fn try_update(
        &self,
        movement_id: MovementId,
        change: &MovementChange,
    ) -> Result<MovementOutcome, LedgerError> {
        let account_id = self
            .store
            .find_movement_account(movement_id)?
            .ok_or(LedgerError::MovementNotFound(movement_id))?;

        self.store.serialized(account_id, |txn| {
            // Reload inside the serialized section; the movement may have
            // been deleted since the lookup above.
            let mut movement = txn
                .load_movement(movement_id)?
                .ok_or(LedgerError::MovementNotFound(movement_id))?;
            let mut account = txn
                .load_account(account_id)?
                .ok_or(LedgerError::AccountNotFound(account_id))?;

            // Undo the old contribution on the working copy. The reversed
            // balance exists only inside this unit of work.
            account.balance += Ledger::reverse_delta(movement.kind, movement.amount);

            Ledger::validate_admission(&account, change.kind, change.amount)?;

            let now = Utc::now();
            account.balance += Ledger::delta(change.kind, change.amount);
            account.updated_at = now;

            movement.kind = change.kind;
            movement.amount = change.amount;
            movement.description = change.description.clone();
            movement.updated_at = now;

            txn.save_movement(&movement)?;
            txn.save_account(&account)?;
            Ok(MovementOutcome { movement, account })
        })
    }

    fn try_delete(&self, movement_id: MovementId) -> Result<MovementOutcome, LedgerError> {
        let account_id = self
            .store
            .find_movement_account(movement_id)?
            .ok_or(LedgerError::MovementNotFound(movement_id))?;

        self.store.serialized(account_id, |txn| {
            let movement = txn
                .load_movement(movement_id)?
                .ok_or(LedgerError::MovementNotFound(movement_id))?;
            let mut account = txn
                .load_account(account_id)?
                .ok_or(LedgerError::AccountNotFound(account_id))?;

            account.balance += Ledger::reverse_delta(movement.kind, movement.amount);
            account.updated_at = Utc::now();

            txn.delete_movement(movement.id)?;
            txn.save_account(&account)?;
            Ok(MovementOutcome { movement, account })
        })
    }

    /// Retries retryable failures (`Conflict`) up to the configured budget,
    /// then surfaces the error.
    fn run_with_retries<R>(
        &self,
        mut op: impl FnMut() -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let mut attempts = 0;
        loop {
            match op() {
                Err(err) if err.is_retryable() && attempts < self.config.max_conflict_retries => {
                    attempts += 1;
                    tracing::warn!(attempt = attempts, error = %err, "retrying conflicted operation");
                }
                result => return result,
            }
        }
    }
}
