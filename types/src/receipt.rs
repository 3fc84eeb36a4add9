//! Confirmation of a state-mutating contract call.

use serde::{Deserialize, Serialize};

use crate::Address;

/// A mined transaction as confirmed by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash (`0x`-prefixed hex).
    pub tx_hash: String,
    /// Account the transaction was sent from.
    pub from: Address,
    /// Block the transaction was included in, when reported.
    pub block_number: Option<u64>,
}
