use proofdesk_types::Address;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("invalid return data: {0}")]
    Decode(String),

    #[error("value does not fit in {0}")]
    Overflow(&'static str),

    #[error("expected a {0} in the return data")]
    UnexpectedToken(&'static str),

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The read failed at the transport or ABI layer.
    #[error("contract call failed: {0}")]
    Call(String),

    /// A proof already exists for this account. Treated as a no-op by callers.
    #[error("proof already exists for {0}")]
    AlreadyExists(Address),

    /// An update was requested for an account that has no proof.
    #[error("no proof configured for {0}")]
    NotConfigured(Address),

    /// Signing, broadcasting, or confirming the transaction failed.
    #[error("proof submission failed: {0}")]
    Submission(String),

    /// No contract code at the configured address.
    #[error("proof contract not deployed at {0}")]
    NotDeployed(Address),

    /// The provider is on a different chain than the contract.
    #[error("provider is on chain {actual}, contract lives on chain {expected}")]
    WrongNetwork { expected: u64, actual: u64 },
}

impl From<AbiError> for ContractError {
    fn from(e: AbiError) -> Self {
        ContractError::Call(format!("ABI error: {e}"))
    }
}
