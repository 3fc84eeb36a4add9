//! Nullable infrastructure for deterministic testing.
//!
//! Every external service the session core talks to sits behind a trait.
//! This crate provides test-friendly implementations that:
//! - Return scripted values
//! - Record every call for assertions
//! - Can be held at a [`Gate`] to pin down interleavings of concurrent calls
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests. Handles are
//! cheap to clone and share state, so a test can keep one clone for
//! scripting and assertions while the code under test owns another.

pub mod contract;
pub mod gate;
pub mod network;
pub mod provider;

pub use contract::{ContractCall, NullContract};
pub use gate::Gate;
pub use network::NullTransport;
pub use provider::{NullProvider, ProviderCall};
