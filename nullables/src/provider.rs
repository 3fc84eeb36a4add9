//! Nullable wallet provider.

use async_trait::async_trait;
use proofdesk_provider::{ProviderError, ProviderGateway};
use proofdesk_types::Address;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::gate::{pass, Gate};

/// A call observed by [`NullProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderCall {
    Discover,
    Connect,
    GetBalance(Address),
}

#[derive(Default)]
struct ProviderState {
    /// `false` models an environment with no wallet injected.
    present: bool,
    /// Accounts already exposed without a permission prompt.
    exposed: Vec<Address>,
    /// Accounts revealed once `connect` succeeds.
    granted_on_connect: Vec<Address>,
    connect_error: Option<ProviderError>,
    discover_error: Option<ProviderError>,
    balances: HashMap<Address, Result<u128, ProviderError>>,
    calls: Vec<ProviderCall>,
    gate: Option<Gate>,
}

/// A scripted wallet provider.
///
/// Defaults: a provider is present, exposes no accounts, `connect` succeeds
/// without revealing any, and every balance is zero.
#[derive(Clone)]
pub struct NullProvider {
    state: Rc<RefCell<ProviderState>>,
}

impl NullProvider {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ProviderState {
                present: true,
                ..Default::default()
            })),
        }
    }

    /// A provider slot with no wallet in it.
    pub fn unavailable() -> Self {
        Self {
            state: Rc::new(RefCell::new(ProviderState::default())),
        }
    }

    /// Accounts the provider exposes before any `connect`.
    pub fn with_accounts(self, accounts: &[&str]) -> Self {
        self.state.borrow_mut().exposed = to_addresses(accounts);
        self
    }

    /// Accounts the provider reveals after a successful `connect`.
    pub fn grant_on_connect(self, accounts: &[&str]) -> Self {
        self.state.borrow_mut().granted_on_connect = to_addresses(accounts);
        self
    }

    /// Make every `connect` fail with `error`.
    pub fn reject_connect(&self, error: ProviderError) {
        self.state.borrow_mut().connect_error = Some(error);
    }

    /// Make every `discover` fail with `error`.
    pub fn fail_discover(&self, error: ProviderError) {
        self.state.borrow_mut().discover_error = Some(error);
    }

    pub fn set_balance(&self, address: &str, wei: u128) {
        self.state
            .borrow_mut()
            .balances
            .insert(Address::new(address), Ok(wei));
    }

    pub fn fail_balance(&self, address: &str, error: ProviderError) {
        self.state
            .borrow_mut()
            .balances
            .insert(Address::new(address), Err(error));
    }

    /// Hold every subsequent call until the returned gate is opened.
    pub fn hold(&self) -> Gate {
        let gate = Gate::new();
        self.state.borrow_mut().gate = Some(gate.clone());
        gate
    }

    /// Every call seen so far, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of calls matching `call`.
    pub fn count(&self, call: &ProviderCall) -> usize {
        self.state.borrow().calls.iter().filter(|c| *c == call).count()
    }

    /// Number of balance reads issued, for any address.
    pub fn balance_reads(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, ProviderCall::GetBalance(_)))
            .count()
    }

    /// Record `call` and return the gate to wait on, if any.
    fn enter(&self, call: ProviderCall) -> Option<Gate> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        state.gate.clone()
    }
}

impl Default for NullProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn to_addresses(accounts: &[&str]) -> Vec<Address> {
    accounts.iter().map(|a| Address::new(*a)).collect()
}

#[async_trait(?Send)]
impl ProviderGateway for NullProvider {
    async fn discover(&self) -> Result<Vec<Address>, ProviderError> {
        let gate = self.enter(ProviderCall::Discover);
        pass(&gate).await;

        let state = self.state.borrow();
        if !state.present {
            return Err(ProviderError::Unavailable);
        }
        if let Some(err) = &state.discover_error {
            return Err(err.clone());
        }
        Ok(state.exposed.clone())
    }

    async fn connect(&self) -> Result<(), ProviderError> {
        let gate = self.enter(ProviderCall::Connect);
        pass(&gate).await;

        let mut state = self.state.borrow_mut();
        if !state.present {
            return Err(ProviderError::Unavailable);
        }
        if let Some(err) = &state.connect_error {
            return Err(err.clone());
        }
        let granted = std::mem::take(&mut state.granted_on_connect);
        for account in granted {
            if !state.exposed.contains(&account) {
                state.exposed.push(account);
            }
        }
        Ok(())
    }

    async fn get_balance(&self, address: &Address) -> Result<u128, ProviderError> {
        let gate = self.enter(ProviderCall::GetBalance(address.clone()));
        pass(&gate).await;

        let state = self.state.borrow();
        if !state.present {
            return Err(ProviderError::Unavailable);
        }
        state.balances.get(address).cloned().unwrap_or(Ok(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofdesk_provider::ProviderFault;

    #[tokio::test]
    async fn connect_reveals_granted_accounts() {
        let provider = NullProvider::new().grant_on_connect(&["0xA"]);
        assert!(provider.discover().await.unwrap().is_empty());
        provider.connect().await.unwrap();
        assert_eq!(provider.discover().await.unwrap(), vec![Address::new("0xA")]);
        assert_eq!(
            provider.calls(),
            vec![ProviderCall::Discover, ProviderCall::Connect, ProviderCall::Discover]
        );
    }

    #[tokio::test]
    async fn rejected_connect_reveals_nothing() {
        let provider = NullProvider::new().grant_on_connect(&["0xA"]);
        let rejection =
            ProviderError::UserRejected(ProviderFault::new(Some("4001".into()), "User rejected"));
        provider.reject_connect(rejection.clone());

        assert_eq!(provider.connect().await, Err(rejection));
        assert!(provider.discover().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn absent_provider_fails_every_call() {
        let provider = NullProvider::unavailable();
        assert_eq!(provider.discover().await, Err(ProviderError::Unavailable));
        assert_eq!(provider.connect().await, Err(ProviderError::Unavailable));
    }

    #[tokio::test]
    async fn balances_default_to_zero() {
        let provider = NullProvider::new();
        provider.set_balance("0xA", 123);
        provider.fail_balance("0xB", ProviderError::Rpc("timeout".into()));

        assert_eq!(provider.get_balance(&Address::new("0xA")).await, Ok(123));
        assert!(provider.get_balance(&Address::new("0xB")).await.is_err());
        assert_eq!(provider.get_balance(&Address::new("0xC")).await, Ok(0));
        assert_eq!(provider.balance_reads(), 3);
    }
}
