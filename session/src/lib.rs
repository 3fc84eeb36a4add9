//! Session orchestration core for proofdesk.
//!
//! [`SessionController`] runs the wallet connection lifecycle and the proof
//! commands, [`AccountAggregator`] fetches per-account state concurrently,
//! and [`render`] turns snapshots into terminal text.

pub mod aggregator;
pub mod controller;
pub mod render;
pub mod spans;

pub use aggregator::AccountAggregator;
pub use controller::{OpenOutcome, ProofOutcome, RefreshOutcome, SessionController};
