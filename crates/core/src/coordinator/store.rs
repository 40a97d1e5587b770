//! Store seams the coordinator is generic over.
//!
//! The persisted representation is an external-collaborator concern; the
//! core only requires that both stores can be driven inside one atomic unit
//! of work, serialized per account.

use saldo_shared::types::{AccountId, MovementId};

use crate::ledger::error::LedgerError;
use crate::ledger::types::{Account, Movement};

/// Read/write access to account records.
pub trait AccountStore {
    /// Loads an account by id.
    fn load_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError>;

    /// Persists an account, inserting or overwriting.
    fn save_account(&mut self, account: &Account) -> Result<(), LedgerError>;

    /// Returns true if the account exists.
    fn account_exists(&self, id: AccountId) -> Result<bool, LedgerError>;
}

/// Read/write access to movement records.
pub trait MovementStore {
    /// Loads a movement by id.
    fn load_movement(&self, id: MovementId) -> Result<Option<Movement>, LedgerError>;

    /// Persists a movement, inserting or overwriting.
    fn save_movement(&mut self, movement: &Movement) -> Result<(), LedgerError>;

    /// Removes a movement record.
    ///
    /// # Errors
    ///
    /// `MovementNotFound` if no such record exists.
    fn delete_movement(&mut self, id: MovementId) -> Result<(), LedgerError>;
}

/// One atomic boundary spanning both stores.
///
/// Changes made through a unit of work become visible only when the
/// enclosing [`LedgerStore::serialized`] closure returns `Ok`; on `Err`
/// every change is discarded.
pub trait UnitOfWork: AccountStore + MovementStore {}

impl<T: AccountStore + MovementStore> UnitOfWork for T {}

/// Entry point the coordinator holds.
///
/// `serialized` is the single-writer-per-account boundary: no two units of
/// work against the same account id ever interleave. Operations against
/// different accounts proceed in parallel. Implementations detecting a
/// concurrent modification (optimistic stores) report `Conflict`, which the
/// coordinator retries a bounded number of times.
pub trait LedgerStore {
    /// Unit-of-work handle handed to the closure.
    type Txn<'a>: UnitOfWork
    where
        Self: 'a;

    /// Runs `op` as one atomic unit of work serialized on `account_id`.
    ///
    /// Commits when `op` returns `Ok`, rolls everything back when it
    /// returns `Err`. A commit failure surfaces as `Persistence` after the
    /// rollback.
    fn serialized<R, F>(&self, account_id: AccountId, op: F) -> Result<R, LedgerError>
    where
        F: FnOnce(&mut Self::Txn<'_>) -> Result<R, LedgerError>;

    /// Registers a freshly opened account.
    ///
    /// # Errors
    ///
    /// `AccountAlreadyExists` if the id is taken.
    fn register_account(&self, account: Account) -> Result<(), LedgerError>;

    /// Resolves the account a movement belongs to, without locking it.
    fn find_movement_account(&self, id: MovementId) -> Result<Option<AccountId>, LedgerError>;
}
