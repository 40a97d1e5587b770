//! Core balance-mutation logic for Saldo.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. It decides how a monetary movement changes an account
//! balance, which movements are admitted, and how a movement's effect is
//! undone when it is edited or deleted.
//!
//! # Modules
//!
//! - `ledger` - direction classification, signed deltas, admission checks
//! - `coordinator` - atomic create/update/delete orchestration over store seams

pub mod coordinator;
pub mod ledger;

pub use coordinator::{MovementService, store::LedgerStore};
pub use ledger::{Account, Direction, Ledger, LedgerError, Movement, MovementKind};
