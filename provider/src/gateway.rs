//! The provider facade trait.

use async_trait::async_trait;
use proofdesk_types::Address;
use std::rc::Rc;

use crate::ProviderError;

/// Async facade over the wallet provider.
///
/// `discover` and `connect` are separate because a provider may expose zero
/// accounts until the user grants permission. An empty `discover` result
/// means "not yet authorized", not "no accounts exist".
#[async_trait(?Send)]
pub trait ProviderGateway {
    /// Accounts the provider currently exposes to this client.
    async fn discover(&self) -> Result<Vec<Address>, ProviderError>;

    /// Ask the user to authorize this client. May reveal additional accounts.
    async fn connect(&self) -> Result<(), ProviderError>;

    /// Native balance of `address` in wei.
    async fn get_balance(&self, address: &Address) -> Result<u128, ProviderError>;
}

#[async_trait(?Send)]
impl<P: ProviderGateway + ?Sized> ProviderGateway for Rc<P> {
    async fn discover(&self) -> Result<Vec<Address>, ProviderError> {
        (**self).discover().await
    }

    async fn connect(&self) -> Result<(), ProviderError> {
        (**self).connect().await
    }

    async fn get_balance(&self, address: &Address) -> Result<u128, ProviderError> {
        (**self).get_balance(address).await
    }
}
