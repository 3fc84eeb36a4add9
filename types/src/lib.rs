//! Fundamental types for proofdesk.
//!
//! This crate defines the values shared across every other crate in the workspace:
//! account addresses, native amounts, proof records, and the session snapshot
//! handed to the presentation layer.

pub mod address;
pub mod amount;
pub mod error;
pub mod proof;
pub mod receipt;
pub mod session;

pub use address::Address;
pub use amount::{format_ether, WEI_PER_ETHER};
pub use error::TypesError;
pub use proof::{ProofRecord, ProofTerms, ProofView};
pub use receipt::TxReceipt;
pub use session::{AccountView, BalanceView, ConnectError, Session, SessionStatus};
