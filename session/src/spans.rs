//! [`tracing::Span`] constructors for session operations.
//!
//! Keeping span names and fields in one place makes a session's connect,
//! aggregate and submit phases easy to correlate in the log output.

use proofdesk_types::Address;
use tracing::{info_span, Span};

/// Span covering one `open_session` attempt.
pub fn open_session_span(generation: u64) -> Span {
    info_span!("open_session", generation = %generation)
}

/// Span covering a `refresh` of the current account set.
pub fn refresh_span(generation: u64) -> Span {
    info_span!("refresh", generation = %generation)
}

/// Span covering the concurrent fetch of every account's state.
pub fn aggregate_span(account_count: usize) -> Span {
    info_span!("aggregate", accounts = %account_count)
}

/// Span covering a proof command from guard check to account refresh.
pub fn proof_command_span(command: &str, address: &Address) -> Span {
    info_span!("proof_command", command = %command, address = %address)
}
