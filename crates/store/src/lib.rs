//! In-memory ledger store for Saldo.
//!
//! Reference implementation of the `saldo-core` store seams: one shard per
//! account behind a lock, all-or-nothing commit, and read-only pass-through
//! queries. Useful as the test collaborator and as the template for a real
//! database-backed store.

pub mod memory;

pub use memory::MemoryStore;
