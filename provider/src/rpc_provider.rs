//! [`ProviderGateway`] backed by an EIP-1193 style JSON-RPC endpoint.

use async_trait::async_trait;
use ethers::providers::{Middleware, Provider};
use ethers::types::{H160, U256};
use ethers::utils::to_checksum;
use proofdesk_rpc::{HttpTransport, Transport, TransportError};
use proofdesk_types::Address;

use crate::{ProviderError, ProviderGateway};

/// The transport and an ethers provider over a clone of it.
///
/// Account calls go to the transport directly so that refused, slow and
/// rejected requests stay distinguishable; reads go through ethers.
struct Endpoint<T> {
    transport: T,
    client: Provider<T>,
}

/// Wallet provider reached over JSON-RPC.
///
/// Holds no endpoint when no provider was configured; every call then
/// behaves as if the environment had no wallet injected.
pub struct RpcProvider<T = HttpTransport> {
    endpoint: Option<Endpoint<T>>,
}

impl<T: Transport> RpcProvider<T> {
    /// A provider reached through `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            endpoint: Some(Endpoint {
                client: Provider::new(transport.clone()),
                transport,
            }),
        }
    }

    /// A provider slot with nothing in it.
    pub fn unavailable() -> Self {
        Self { endpoint: None }
    }

    /// Whether a provider transport is present.
    pub fn is_available(&self) -> bool {
        self.endpoint.is_some()
    }

    fn require(&self) -> Result<&Endpoint<T>, ProviderError> {
        self.endpoint.as_ref().ok_or(ProviderError::Unavailable)
    }

    /// Accounts returned by `method`, in EIP-55 checksum form.
    async fn account_list(transport: &T, method: &str) -> Result<Vec<Address>, TransportError> {
        let raw: Vec<H160> = transport.request(method, ()).await?;
        Ok(raw
            .iter()
            .map(|account| Address::new(to_checksum(account, None)))
            .collect())
    }
}

fn to_h160(address: &Address) -> Result<H160, ProviderError> {
    address
        .to_bytes()
        .map(H160::from)
        .map_err(|e| ProviderError::Rpc(e.to_string()))
}

fn to_wei(balance: U256) -> Result<u128, ProviderError> {
    if balance.bits() > 128 {
        return Err(ProviderError::Rpc(format!("balance {balance} does not fit in u128")));
    }
    Ok(balance.as_u128())
}

#[async_trait(?Send)]
impl<T: Transport> ProviderGateway for RpcProvider<T> {
    async fn discover(&self) -> Result<Vec<Address>, ProviderError> {
        let endpoint = self.require()?;
        let accounts = Self::account_list(&endpoint.transport, "eth_accounts")
            .await
            .map_err(ProviderError::from_discover)?;
        tracing::debug!(count = accounts.len(), "provider exposed accounts");
        Ok(accounts)
    }

    async fn connect(&self) -> Result<(), ProviderError> {
        let endpoint = self.require()?;
        let granted = Self::account_list(&endpoint.transport, "eth_requestAccounts")
            .await
            .map_err(ProviderError::from_connect)?;
        tracing::info!(count = granted.len(), "provider granted account access");
        Ok(())
    }

    async fn get_balance(&self, address: &Address) -> Result<u128, ProviderError> {
        let endpoint = self.require()?;
        let balance = endpoint
            .client
            .get_balance(to_h160(address)?, None)
            .await
            .map_err(ProviderError::from_read)?;
        to_wei(balance)
    }
}
