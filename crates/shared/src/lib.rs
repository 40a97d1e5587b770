//! Shared types and configuration for Saldo.
//!
//! This crate provides the types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
