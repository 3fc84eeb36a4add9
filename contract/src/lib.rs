//! Client for the on-chain proof contract.
//!
//! The contract exposes one read and two writes:
//! - `getProof(address)` returns `(success, proofType, interval, amount, status)`
//! - `newProof(proofType, interval, amount)` creates the caller's proof
//! - `updateProof(proofType, interval, amount)` replaces it
//!
//! `success = false` (or a revert) on the read is the normal "no proof yet"
//! outcome and maps to [`ProofView::NotConfigured`](proofdesk_types::ProofView).
//! Only transport and ABI failures are errors.

pub mod abi;
pub mod client;
pub mod error;
pub mod rpc_contract;

pub use client::ContractClient;
pub use error::{AbiError, ContractError};
pub use rpc_contract::{ReceiptPolicy, RpcProofContract};
