//! Storage Infrastructure
//!
//! This crate provides the default adapter for the session and profile
//! ports: an in-memory document store that serializes the full entity graph
//! to JSON on every write.
//!
//! Serializing through JSON is deliberate even though the data never leaves
//! the process: each write replaces the whole document in one swap, exactly
//! the atomicity contract a remote document store must honor, and every save
//! and load exercises the same round-trip a remote backend would. An adapter
//! for a real remote store implements the same two port traits.

pub mod memory;

pub use memory::MemoryStore;
