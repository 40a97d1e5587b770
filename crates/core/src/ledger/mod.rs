//! Balance-mutation rules for account movements.
//!
//! This module implements the decision logic of the ledger:
//! - Domain types for accounts and movements
//! - Direction classification and signed delta computation
//! - Admission checks (active account, sufficient funds)
//! - Input validation for amounts and descriptions
//! - Error types for ledger operations

pub mod engine;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod engine_props;

pub use engine::Ledger;
pub use error::LedgerError;
pub use types::{
    Account, Direction, Movement, MovementChange, MovementKind, MovementOutcome, NewMovement,
};
