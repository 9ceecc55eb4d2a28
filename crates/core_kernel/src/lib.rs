//! Core Kernel - Foundational types and utilities for the chip ledger
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money with precise decimal arithmetic (single table currency)
//! - Strongly-typed identifiers for sessions, transactions, and player profiles
//! - Port abstractions shared by all persistence collaborators

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, BALANCE_EPSILON};
pub use identifiers::{SessionId, TransactionId, ProfileId};
pub use ports::{PortError, DomainPort};
