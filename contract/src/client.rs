//! The contract facade trait.

use async_trait::async_trait;
use proofdesk_types::{Address, ProofTerms, ProofView, TxReceipt};
use std::rc::Rc;

use crate::ContractError;

/// Async facade over the proof contract.
///
/// `create_proof` must not be called blindly: callers re-read the proof right
/// before submitting. The contract itself remains the final arbiter of
/// duplicate creation.
#[async_trait(?Send)]
pub trait ContractClient {
    /// Current proof state of `address`.
    ///
    /// `Ok(NotConfigured)` when the contract reports no proof or reverts.
    /// `Err(Call)` only on transport or ABI failure.
    async fn read_proof(&self, address: &Address) -> Result<ProofView, ContractError>;

    /// Submit `newProof` from `from` and wait for confirmation.
    async fn create_proof(
        &self,
        from: &Address,
        terms: ProofTerms,
    ) -> Result<TxReceipt, ContractError>;

    /// Submit `updateProof` from `from` and wait for confirmation.
    async fn update_proof(
        &self,
        from: &Address,
        terms: ProofTerms,
    ) -> Result<TxReceipt, ContractError>;
}

#[async_trait(?Send)]
impl<C: ContractClient + ?Sized> ContractClient for Rc<C> {
    async fn read_proof(&self, address: &Address) -> Result<ProofView, ContractError> {
        (**self).read_proof(address).await
    }

    async fn create_proof(
        &self,
        from: &Address,
        terms: ProofTerms,
    ) -> Result<TxReceipt, ContractError> {
        (**self).create_proof(from, terms).await
    }

    async fn update_proof(
        &self,
        from: &Address,
        terms: ProofTerms,
    ) -> Result<TxReceipt, ContractError> {
        (**self).update_proof(from, terms).await
    }
}
