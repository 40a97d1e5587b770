//! Atomic orchestration of movement operations.
//!
//! The coordinator executes create/update/delete as one all-or-nothing state
//! transition spanning the movement record and the account balance. It owns
//! no storage itself; store handles are passed in explicitly.

pub mod service;
pub mod store;

pub use service::MovementService;
pub use store::{AccountStore, LedgerStore, MovementStore, UnitOfWork};
