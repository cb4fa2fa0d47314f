//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (clock, durable storage) are abstracted behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod storage;

pub use clock::NullClock;
pub use storage::NullStorage;
