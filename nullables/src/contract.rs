//! Nullable proof contract: an in-memory stand-in for the on-chain record.

use async_trait::async_trait;
use proofdesk_contract::{ContractClient, ContractError};
use proofdesk_types::{Address, ProofRecord, ProofTerms, ProofView, TxReceipt};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::gate::{pass, Gate};

/// A call observed by [`NullContract`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractCall {
    ReadProof(Address),
    CreateProof(Address, ProofTerms),
    UpdateProof(Address, ProofTerms),
}

#[derive(Default)]
struct ContractState {
    proofs: HashMap<Address, ProofRecord>,
    read_failures: HashMap<Address, ContractError>,
    submit_failure: Option<ContractError>,
    calls: Vec<ContractCall>,
    next_tx: u64,
    gate: Option<Gate>,
}

/// A scripted proof contract.
///
/// Successful submissions are applied to the in-memory proof table, so a
/// read after a create observes the new proof just as it would on chain.
/// Like the real contract, a second `create_proof` for the same account is
/// refused.
#[derive(Clone, Default)]
pub struct NullContract {
    state: Rc<RefCell<ContractState>>,
}

impl NullContract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a proof for `address` as if it had been created on chain.
    pub fn set_proof(&self, address: &str, record: ProofRecord) {
        self.state
            .borrow_mut()
            .proofs
            .insert(Address::new(address), record);
    }

    /// Make reads for `address` fail with `error` until cleared.
    pub fn fail_read(&self, address: &str, error: ContractError) {
        self.state
            .borrow_mut()
            .read_failures
            .insert(Address::new(address), error);
    }

    pub fn clear_read_failure(&self, address: &str) {
        self.state
            .borrow_mut()
            .read_failures
            .remove(&Address::new(address));
    }

    /// Make every submission fail with `error`. `None` restores success.
    pub fn fail_submissions(&self, error: Option<ContractError>) {
        self.state.borrow_mut().submit_failure = error;
    }

    /// Hold every subsequent call until the returned gate is opened.
    pub fn hold(&self) -> Gate {
        let gate = Gate::new();
        self.state.borrow_mut().gate = Some(gate.clone());
        gate
    }

    pub fn proof(&self, address: &str) -> Option<ProofRecord> {
        self.state.borrow().proofs.get(&Address::new(address)).copied()
    }

    /// Every call seen so far, in order.
    pub fn calls(&self) -> Vec<ContractCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of `create_proof` submissions attempted.
    pub fn create_attempts(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, ContractCall::CreateProof(..)))
            .count()
    }

    /// Number of `read_proof` calls, for any address.
    pub fn reads(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, ContractCall::ReadProof(_)))
            .count()
    }

    fn enter(&self, call: ContractCall) -> Option<Gate> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        state.gate.clone()
    }

    fn receipt(state: &mut ContractState, from: &Address) -> TxReceipt {
        state.next_tx += 1;
        TxReceipt {
            tx_hash: format!("0x{:064x}", state.next_tx),
            from: from.clone(),
            block_number: Some(state.next_tx),
        }
    }
}

#[async_trait(?Send)]
impl ContractClient for NullContract {
    async fn read_proof(&self, address: &Address) -> Result<ProofView, ContractError> {
        let gate = self.enter(ContractCall::ReadProof(address.clone()));
        pass(&gate).await;

        let state = self.state.borrow();
        if let Some(err) = state.read_failures.get(address) {
            return Err(err.clone());
        }
        Ok(match state.proofs.get(address) {
            Some(record) => ProofView::Configured(*record),
            None => ProofView::NotConfigured,
        })
    }

    async fn create_proof(
        &self,
        from: &Address,
        terms: ProofTerms,
    ) -> Result<TxReceipt, ContractError> {
        let gate = self.enter(ContractCall::CreateProof(from.clone(), terms));
        pass(&gate).await;

        let mut state = self.state.borrow_mut();
        if let Some(err) = &state.submit_failure {
            return Err(err.clone());
        }
        if state.proofs.contains_key(from) {
            return Err(ContractError::Submission(
                "execution reverted: proof exists".into(),
            ));
        }
        state
            .proofs
            .insert(from.clone(), ProofRecord { terms, status: 0 });
        Ok(Self::receipt(&mut state, from))
    }

    async fn update_proof(
        &self,
        from: &Address,
        terms: ProofTerms,
    ) -> Result<TxReceipt, ContractError> {
        let gate = self.enter(ContractCall::UpdateProof(from.clone(), terms));
        pass(&gate).await;

        let mut state = self.state.borrow_mut();
        if let Some(err) = &state.submit_failure {
            return Err(err.clone());
        }
        match state.proofs.get_mut(from) {
            Some(record) => record.terms = terms,
            None => {
                return Err(ContractError::Submission(
                    "execution reverted: no proof".into(),
                ))
            }
        }
        Ok(Self::receipt(&mut state, from))
    }
}
