//! [`ContractClient`] backed by the provider's JSON-RPC endpoint.

use async_trait::async_trait;
use ethers::providers::{Middleware, PendingTransaction, Provider, ProviderError, RpcError};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{TransactionReceipt, TransactionRequest, H160, H256, U256, U64};
use proofdesk_rpc::{HttpTransport, Transport};
use proofdesk_types::{Address, ProofTerms, ProofView, TxReceipt};
use std::time::Duration;

use crate::abi;
use crate::{ContractClient, ContractError};

/// JSON-RPC error code used by most nodes for `execution reverted`.
const REVERT_CODE: i64 = 3;

/// How long to wait for a submitted transaction to be mined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiptPolicy {
    /// Number of polls before giving up. Zero is treated as one.
    pub attempts: u32,
    /// Delay between polls.
    pub interval: Duration,
}

impl ReceiptPolicy {
    /// Total time a submission may wait: the initial delay plus one
    /// interval per poll.
    pub fn deadline(&self) -> Duration {
        self.interval
            .saturating_mul(self.attempts.max(1).saturating_add(1))
    }
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            attempts: 60,
            interval: Duration::from_secs(1),
        }
    }
}

/// The proof contract at a fixed address, reached through the wallet provider.
pub struct RpcProofContract<T = HttpTransport> {
    provider: Provider<T>,
    contract: Address,
    target: H160,
    receipts: ReceiptPolicy,
}

fn is_revert(err: &ProviderError) -> bool {
    err.as_error_response().is_some_and(|e| {
        e.code == REVERT_CODE || e.message.to_ascii_lowercase().contains("revert")
    })
}

fn saturating_u64(value: U256) -> u64 {
    if value.bits() > 64 {
        u64::MAX
    } else {
        value.as_u64()
    }
}

impl<T: Transport> RpcProofContract<T> {
    /// Bind to the contract at `contract`.
    pub fn new(transport: T, contract: Address) -> Result<Self, ContractError> {
        let target = abi::to_h160(&contract)
            .map_err(|_| ContractError::Call(format!("invalid contract address: {contract}")))?;
        let receipts = ReceiptPolicy::default();
        Ok(Self {
            provider: Provider::new(transport).interval(receipts.interval),
            contract,
            target,
            receipts,
        })
    }

    pub fn with_receipt_policy(mut self, receipts: ReceiptPolicy) -> Self {
        self.provider = self.provider.interval(receipts.interval);
        self.receipts = receipts;
        self
    }

    /// The contract address.
    pub fn address(&self) -> &Address {
        &self.contract
    }

    /// Check that the provider is on `expected_chain_id` (when given) and
    /// that code exists at the contract address.
    pub async fn check_deployment(&self, expected_chain_id: Option<u64>) -> Result<(), ContractError> {
        if let Some(expected) = expected_chain_id {
            let actual = self
                .provider
                .get_chainid()
                .await
                .map_err(|e| ContractError::Call(e.to_string()))?;
            if actual != U256::from(expected) {
                return Err(ContractError::WrongNetwork {
                    expected,
                    actual: saturating_u64(actual),
                });
            }
        }

        let code = self
            .provider
            .get_code(self.target, None)
            .await
            .map_err(|e| ContractError::Call(e.to_string()))?;
        if code.is_empty() {
            return Err(ContractError::NotDeployed(self.contract.clone()));
        }
        Ok(())
    }

    async fn submit(
        &self,
        from: &Address,
        calldata: Vec<u8>,
        call: &'static str,
    ) -> Result<TxReceipt, ContractError> {
        let sender = abi::to_h160(from)
            .map_err(|_| ContractError::Submission(format!("invalid sender address: {from}")))?;
        // Gas and nonce are left to the wallet that signs.
        let tx = TransactionRequest::new()
            .from(sender)
            .to(self.target)
            .data(calldata);
        let tx_hash: H256 = self
            .provider
            .request("eth_sendTransaction", [tx])
            .await
            .map_err(|e| ContractError::Submission(e.to_string()))?;

        tracing::info!(%from, ?tx_hash, call, "proof transaction broadcast");
        let receipt = self.wait_for_receipt(tx_hash).await?;

        if receipt.status == Some(U64::zero()) {
            return Err(ContractError::Submission(format!(
                "transaction {tx_hash:?} reverted"
            )));
        }
        let block_number = receipt.block_number.map(|n| n.as_u64());
        tracing::info!(?tx_hash, ?block_number, "proof transaction confirmed");
        Ok(TxReceipt {
            tx_hash: format!("{:?}", receipt.transaction_hash),
            from: from.clone(),
            block_number,
        })
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceipt, ContractError> {
        let pending = PendingTransaction::new(tx_hash, &self.provider)
            .interval(self.receipts.interval)
            .retries(self.receipts.attempts as usize);

        match tokio::time::timeout(self.receipts.deadline(), pending).await {
            Ok(Ok(Some(receipt))) => Ok(receipt),
            Ok(Ok(None)) => Err(ContractError::Submission(format!(
                "transaction {tx_hash:?} was dropped before it was mined"
            ))),
            Ok(Err(e)) => Err(ContractError::Submission(format!(
                "receipt query failed: {e}"
            ))),
            Err(_) => Err(ContractError::Submission(format!(
                "transaction {tx_hash:?} not confirmed after {} attempts",
                self.receipts.attempts.max(1)
            ))),
        }
    }
}

#[async_trait(?Send)]
impl<T: Transport> ContractClient for RpcProofContract<T> {
    async fn read_proof(&self, address: &Address) -> Result<ProofView, ContractError> {
        let calldata = abi::encode_get_proof(address)?;
        let call: TypedTransaction = TransactionRequest::new()
            .to(self.target)
            .data(calldata)
            .into();

        let bytes = match self.provider.call(&call, None).await {
            Ok(bytes) => bytes,
            Err(e) if is_revert(&e) => {
                tracing::debug!(%address, error = %e, "getProof reverted");
                return Ok(ProofView::NotConfigured);
            }
            Err(e) => return Err(ContractError::Call(e.to_string())),
        };

        if bytes.is_empty() {
            return Err(ContractError::Call(format!(
                "empty return data; no proof contract code at {}",
                self.contract
            )));
        }

        Ok(match abi::decode_get_proof(&bytes)? {
            Some(record) => ProofView::Configured(record),
            None => ProofView::NotConfigured,
        })
    }

    async fn create_proof(
        &self,
        from: &Address,
        terms: ProofTerms,
    ) -> Result<TxReceipt, ContractError> {
        self.submit(from, abi::encode_new_proof(&terms), "newProof").await
    }

    async fn update_proof(
        &self,
        from: &Address,
        terms: ProofTerms,
    ) -> Result<TxReceipt, ContractError> {
        self.submit(from, abi::encode_update_proof(&terms), "updateProof").await
    }
}
