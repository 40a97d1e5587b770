//! Sharded in-memory store.
//!
//! Each account lives in its own shard together with its movements, behind
//! a mutex. A unit of work clones the shard, mutates the clone, and the
//! commit installs the clone while the lock is still held; rollback is
//! simply dropping the clone, and no observer ever sees a half-applied
//! operation. Operations against different accounts take different locks
//! and run in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use saldo_core::coordinator::store::{AccountStore, LedgerStore, MovementStore};
use saldo_core::ledger::error::LedgerError;
use saldo_core::ledger::types::{Account, Movement, MovementKind};
use saldo_shared::types::{AccountId, MovementId};

/// One account and every movement attributed to it.
#[derive(Debug, Clone)]
struct Shard {
    account: Account,
    movements: HashMap<MovementId, Movement>,
}

/// In-memory ledger store with per-account serialization.
#[derive(Debug, Default)]
pub struct MemoryStore {
    shards: DashMap<AccountId, Arc<Mutex<Shard>>>,
    /// movement id -> owning account, maintained at commit time.
    movement_owner: DashMap<MovementId, AccountId>,
}

/// Unit of work over a working copy of one shard.
#[derive(Debug)]
pub struct MemoryTxn {
    work: Shard,
    added: Vec<MovementId>,
    removed: Vec<MovementId>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an account snapshot, if registered.
    pub fn account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        self.read_shard(id, |shard| shard.account.clone())
    }

    /// Loads a movement snapshot, if present.
    pub fn movement(&self, id: MovementId) -> Result<Option<Movement>, LedgerError> {
        let Some(owner) = self.movement_owner.get(&id).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self
            .read_shard(owner, |shard| shard.movements.get(&id).cloned())?
            .flatten())
    }

    /// All movements of one account, oldest first.
    pub fn movements_for_account(&self, id: AccountId) -> Result<Vec<Movement>, LedgerError> {
        let movements = self
            .read_shard(id, |shard| shard.movements.values().cloned().collect())?
            .unwrap_or_default();
        Ok(sorted_by_occurrence(movements))
    }

    /// All movements of one kind across every account, oldest first.
    pub fn movements_by_kind(&self, kind: MovementKind) -> Result<Vec<Movement>, LedgerError> {
        let mut movements = Vec::new();
        for entry in &self.shards {
            let guard = lock(entry.value())?;
            movements.extend(
                guard
                    .movements
                    .values()
                    .filter(|m| m.kind == kind)
                    .cloned(),
            );
        }
        Ok(sorted_by_occurrence(movements))
    }

    /// Movements of one account that occurred within `[from, to]`, oldest
    /// first.
    pub fn movements_between(
        &self,
        id: AccountId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Movement>, LedgerError> {
        let movements = self
            .read_shard(id, |shard| {
                shard
                    .movements
                    .values()
                    .filter(|m| m.occurred_at >= from && m.occurred_at <= to)
                    .cloned()
                    .collect()
            })?
            .unwrap_or_default();
        Ok(sorted_by_occurrence(movements))
    }

    /// The `limit` most recent movements of one account, newest first.
    pub fn recent_movements(
        &self,
        id: AccountId,
        limit: usize,
    ) -> Result<Vec<Movement>, LedgerError> {
        let mut movements = self.movements_for_account(id)?;
        movements.reverse();
        movements.truncate(limit);
        Ok(movements)
    }

    fn read_shard<R>(
        &self,
        id: AccountId,
        f: impl FnOnce(&Shard) -> R,
    ) -> Result<Option<R>, LedgerError> {
        let Some(cell) = self.shards.get(&id).map(|e| Arc::clone(e.value())) else {
            return Ok(None);
        };
        let guard = lock(&cell)?;
        Ok(Some(f(&guard)))
    }
}

impl LedgerStore for MemoryStore {
    type Txn<'a>
        = MemoryTxn
    where
        Self: 'a;

    fn serialized<R, F>(&self, account_id: AccountId, op: F) -> Result<R, LedgerError>
    where
        F: FnOnce(&mut Self::Txn<'_>) -> Result<R, LedgerError>,
    {
        // Clone the Arc so the map entry guard is released before locking.
        let cell = self
            .shards
            .get(&account_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let mut guard = lock(&cell)?;
        let mut txn = MemoryTxn {
            work: guard.clone(),
            added: Vec::new(),
            removed: Vec::new(),
        };

        let result = op(&mut txn)?;

        // Commit: install the working copy and fix the owner index while
        // the shard lock is still held.
        for id in &txn.removed {
            self.movement_owner.remove(id);
        }
        for id in &txn.added {
            self.movement_owner.insert(*id, account_id);
        }
        *guard = txn.work;
        tracing::debug!(account_id = %account_id, "unit of work committed");
        Ok(result)
    }

    fn register_account(&self, account: Account) -> Result<(), LedgerError> {
        match self.shards.entry(account.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(LedgerError::AccountAlreadyExists(account.id))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(Shard {
                    account,
                    movements: HashMap::new(),
                })));
                Ok(())
            }
        }
    }

    fn find_movement_account(&self, id: MovementId) -> Result<Option<AccountId>, LedgerError> {
        Ok(self.movement_owner.get(&id).map(|e| *e.value()))
    }
}

impl AccountStore for MemoryTxn {
    fn load_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        if id == self.work.account.id {
            Ok(Some(self.work.account.clone()))
        } else {
            Ok(None)
        }
    }

    fn save_account(&mut self, account: &Account) -> Result<(), LedgerError> {
        if account.id != self.work.account.id {
            return Err(LedgerError::Internal(format!(
                "unit of work for account {} asked to save account {}",
                self.work.account.id, account.id
            )));
        }
        self.work.account = account.clone();
        Ok(())
    }

    fn account_exists(&self, id: AccountId) -> Result<bool, LedgerError> {
        Ok(id == self.work.account.id)
    }
}

impl MovementStore for MemoryTxn {
    fn load_movement(&self, id: MovementId) -> Result<Option<Movement>, LedgerError> {
        Ok(self.work.movements.get(&id).cloned())
    }

    fn save_movement(&mut self, movement: &Movement) -> Result<(), LedgerError> {
        if movement.account_id != self.work.account.id {
            return Err(LedgerError::Internal(format!(
                "unit of work for account {} asked to save a movement of account {}",
                self.work.account.id, movement.account_id
            )));
        }
        if self
            .work
            .movements
            .insert(movement.id, movement.clone())
            .is_none()
        {
            self.added.push(movement.id);
        }
        Ok(())
    }

    fn delete_movement(&mut self, id: MovementId) -> Result<(), LedgerError> {
        if self.work.movements.remove(&id).is_some() {
            self.removed.push(id);
            Ok(())
        } else {
            Err(LedgerError::MovementNotFound(id))
        }
    }
}

fn lock(cell: &Arc<Mutex<Shard>>) -> Result<MutexGuard<'_, Shard>, LedgerError> {
    cell.lock()
        .map_err(|_| LedgerError::Persistence("account shard lock poisoned".to_string()))
}

fn sorted_by_occurrence(mut movements: Vec<Movement>) -> Vec<Movement> {
    movements.sort_by(|a, b| {
        a.occurred_at
            .cmp(&b.occurred_at)
            .then_with(|| a.id.0.cmp(&b.id.0))
    });
    movements
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn registered_account(store: &MemoryStore, balance: rust_decimal::Decimal) -> Account {
        let account = Account::new(balance);
        store.register_account(account.clone()).unwrap();
        account
    }

    fn movement_for(account: &Account, amount: rust_decimal::Decimal) -> Movement {
        let now = Utc::now();
        Movement {
            id: MovementId::new(),
            account_id: account.id,
            kind: MovementKind::Deposit,
            amount,
            description: None,
            occurred_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_register_and_load_account() {
        let store = MemoryStore::new();
        let account = registered_account(&store, dec!(50.00));

        let loaded = store.account(account.id).unwrap().unwrap();
        assert_eq!(loaded, account);
        assert!(store.account(AccountId::new()).unwrap().is_none());
    }

    #[test]
    fn test_register_twice_is_rejected() {
        let store = MemoryStore::new();
        let account = registered_account(&store, dec!(0.00));

        let result = store.register_account(account.clone());
        assert!(matches!(
            result,
            Err(LedgerError::AccountAlreadyExists(id)) if id == account.id
        ));
    }

    #[test]
    fn test_serialized_on_unknown_account() {
        let store = MemoryStore::new();
        let result = store.serialized(AccountId::new(), |_txn| Ok(()));
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
    }

    #[test]
    fn test_commit_installs_changes_and_index() {
        let store = MemoryStore::new();
        let account = registered_account(&store, dec!(10.00));
        let movement = movement_for(&account, dec!(5.00));

        store
            .serialized(account.id, |txn| {
                let mut updated = txn.load_account(account.id)?.unwrap();
                updated.balance = dec!(15.00);
                txn.save_movement(&movement)?;
                txn.save_account(&updated)?;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.account(account.id).unwrap().unwrap().balance, dec!(15.00));
        assert_eq!(
            store.find_movement_account(movement.id).unwrap(),
            Some(account.id)
        );
        assert_eq!(store.movement(movement.id).unwrap().unwrap(), movement);
    }

    #[test]
    fn test_error_rolls_everything_back() {
        let store = MemoryStore::new();
        let account = registered_account(&store, dec!(10.00));
        let movement = movement_for(&account, dec!(5.00));

        let result: Result<(), LedgerError> = store.serialized(account.id, |txn| {
            let mut updated = txn.load_account(account.id)?.unwrap();
            updated.balance = dec!(999.00);
            txn.save_account(&updated)?;
            txn.save_movement(&movement)?;
            Err(LedgerError::Conflict)
        });

        assert!(matches!(result, Err(LedgerError::Conflict)));
        assert_eq!(store.account(account.id).unwrap().unwrap().balance, dec!(10.00));
        assert!(store.find_movement_account(movement.id).unwrap().is_none());
        assert!(store.movement(movement.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_updates_index() {
        let store = MemoryStore::new();
        let account = registered_account(&store, dec!(10.00));
        let movement = movement_for(&account, dec!(5.00));

        store
            .serialized(account.id, |txn| txn.save_movement(&movement))
            .unwrap();
        store
            .serialized(account.id, |txn| txn.delete_movement(movement.id))
            .unwrap();

        assert!(store.find_movement_account(movement.id).unwrap().is_none());
    }

    #[test]
    fn test_txn_rejects_foreign_account_writes() {
        let store = MemoryStore::new();
        let account = registered_account(&store, dec!(10.00));
        let other = Account::new(dec!(0.00));

        let result = store.serialized(account.id, |txn| txn.save_account(&other));
        assert!(matches!(result, Err(LedgerError::Internal(_))));

        let mut foreign = movement_for(&other, dec!(1.00));
        foreign.account_id = other.id;
        let result = store.serialized(account.id, |txn| txn.save_movement(&foreign));
        assert!(matches!(result, Err(LedgerError::Internal(_))));
    }

    #[test]
    fn test_queries_sort_and_filter() {
        let store = MemoryStore::new();
        let account = registered_account(&store, dec!(0.00));

        let mut first = movement_for(&account, dec!(1.00));
        first.occurred_at = Utc::now() - chrono::Duration::hours(2);
        let mut second = movement_for(&account, dec!(2.00));
        second.occurred_at = Utc::now() - chrono::Duration::hours(1);
        second.kind = MovementKind::Withdrawal;
        let third = movement_for(&account, dec!(3.00));

        store
            .serialized(account.id, |txn| {
                txn.save_movement(&first)?;
                txn.save_movement(&second)?;
                txn.save_movement(&third)
            })
            .unwrap();

        let all = store.movements_for_account(account.id).unwrap();
        assert_eq!(
            all.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![first.id, second.id, third.id]
        );

        let deposits = store.movements_by_kind(MovementKind::Deposit).unwrap();
        assert_eq!(deposits.len(), 2);

        let ranged = store
            .movements_between(
                account.id,
                second.occurred_at,
                Utc::now(),
            )
            .unwrap();
        assert_eq!(ranged.first().map(|m| m.id), Some(second.id));

        let recent = store.recent_movements(account.id, 2).unwrap();
        assert_eq!(
            recent.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![third.id, second.id]
        );
    }
}
