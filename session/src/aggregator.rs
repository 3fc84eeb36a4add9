//! Concurrent per-account fetch of balance and proof state.

use futures_util::future::join_all;
use proofdesk_contract::ContractClient;
use proofdesk_provider::ProviderGateway;
use proofdesk_types::{AccountView, Address, BalanceView, ProofView};
use tracing::Instrument;

use crate::spans::aggregate_span;

/// Builds [`AccountView`]s for a set of addresses.
///
/// Every fetch is launched concurrently and awaited to completion (an
/// all-settled join). A failed balance or proof read is encoded into the
/// corresponding field; it never hides the other field or another account.
pub struct AccountAggregator<'a, P, C> {
    provider: &'a P,
    contract: &'a C,
}

impl<'a, P: ProviderGateway, C: ContractClient> AccountAggregator<'a, P, C> {
    pub fn new(provider: &'a P, contract: &'a C) -> Self {
        Self { provider, contract }
    }

    /// One view per input address, in input order. Never fails.
    pub async fn aggregate(&self, addresses: &[Address]) -> Vec<AccountView> {
        join_all(addresses.iter().map(|address| self.fetch_account(address)))
            .instrument(aggregate_span(addresses.len()))
            .await
    }

    /// Fetch balance and proof for a single address.
    pub async fn fetch_account(&self, address: &Address) -> AccountView {
        let (balance, proof) = futures_util::join!(
            self.provider.get_balance(address),
            self.contract.read_proof(address)
        );

        let native_balance = match balance {
            Ok(wei) => BalanceView::Value(wei),
            Err(e) => {
                tracing::warn!(%address, error = %e, "balance fetch failed");
                BalanceView::Error(e.to_string())
            }
        };

        let proof = match proof {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!(%address, error = %e, "proof fetch failed");
                ProofView::fetch_error(e.to_string())
            }
        };

        AccountView::new(address.clone(), native_balance, proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofdesk_contract::ContractError;
    use proofdesk_nullables::{NullContract, NullProvider};
    use proofdesk_provider::ProviderError;
    use proofdesk_types::{ProofRecord, ProofTerms};

    fn addrs(raw: &[&str]) -> Vec<Address> {
        raw.iter().map(|a| Address::new(*a)).collect()
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let provider = NullProvider::new();
        let contract = NullContract::new();
        let views = AccountAggregator::new(&provider, &contract).aggregate(&[]).await;
        assert!(views.is_empty());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn balance_failure_keeps_proof_result() {
        let provider = NullProvider::new();
        let contract = NullContract::new();
        provider.fail_balance("0xA", ProviderError::Rpc("timeout".into()));
        contract.set_proof(
            "0xA",
            ProofRecord {
                terms: ProofTerms {
                    proof_type: 1,
                    interval: 60,
                    amount: 5,
                },
                status: 1,
            },
        );

        let view = AccountAggregator::new(&provider, &contract)
            .fetch_account(&Address::new("0xA"))
            .await;
        assert!(view.native_balance.is_error());
        assert!(view.proof.is_configured());
    }

    #[tokio::test]
    async fn proof_failure_keeps_balance_result() {
        let provider = NullProvider::new();
        let contract = NullContract::new();
        provider.set_balance("0xA", 77);
        contract.fail_read("0xA", ContractError::Call("abi".into()));

        let view = AccountAggregator::new(&provider, &contract)
            .fetch_account(&Address::new("0xA"))
            .await;
        assert_eq!(view.native_balance, BalanceView::Value(77));
        assert!(view.proof.is_error());
    }

    #[tokio::test]
    async fn one_failing_account_does_not_affect_others() {
        let provider = NullProvider::new();
        let contract = NullContract::new();
        provider.set_balance("0xA", 1);
        provider.set_balance("0xC", 3);
        provider.fail_balance("0xB", ProviderError::Rpc("down".into()));
        contract.fail_read("0xB", ContractError::Call("down".into()));

        let views = AccountAggregator::new(&provider, &contract)
            .aggregate(&addrs(&["0xA", "0xB", "0xC"]))
            .await;

        assert_eq!(views[0].native_balance, BalanceView::Value(1));
        assert_eq!(views[0].proof, ProofView::NotConfigured);
        assert!(views[1].native_balance.is_error());
        assert!(views[1].proof.is_error());
        assert_eq!(views[2].native_balance, BalanceView::Value(3));
        assert_eq!(views[2].proof, ProofView::NotConfigured);
    }

    #[tokio::test]
    async fn fetches_are_launched_before_any_completes() {
        let provider = NullProvider::new();
        let contract = NullContract::new();
        let gate = provider.hold();

        let aggregator = AccountAggregator::new(&provider, &contract);
        let addresses = addrs(&["0xA", "0xB", "0xC"]);
        let (views, ()) = tokio::join!(aggregator.aggregate(&addresses), async {
            while provider.balance_reads() < 3 {
                tokio::task::yield_now().await;
            }
            gate.open();
        });

        assert_eq!(views.len(), 3);
        assert_eq!(contract.reads(), 3);
    }
}
