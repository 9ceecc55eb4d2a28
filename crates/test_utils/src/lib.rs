//! Test Utilities Crate
//!
//! Shared test infrastructure for the chip ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: fixed timestamps and amounts for deterministic tests
//! - `builders`: builder patterns for sessions and profiles
//! - `stores`: failure-injecting wrappers around the in-memory store

pub mod builders;
pub mod fixtures;
pub mod stores;

pub use builders::*;
pub use fixtures::*;
pub use stores::*;
