//! Session snapshot types shared between the controller and the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Address, ProofView};

/// Why the last connection attempt failed, as reported by the provider.
///
/// `code` is provider-defined and opaque; it is passed through for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectError {
    pub code: Option<String>,
    pub message: String,
}

impl ConnectError {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Connection lifecycle of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// No connection; no accounts shown.
    Disconnected,
    /// Discovery or aggregation is in flight.
    Connecting,
    /// Accounts were discovered and aggregated.
    Connected,
    /// The provider refused or failed the connection.
    ConnectError(ConnectError),
}

impl SessionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn connect_error(&self) -> Option<&ConnectError> {
        match self {
            Self::ConnectError(e) => Some(e),
            _ => None,
        }
    }
}

/// Native balance of an account as far as the client knows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BalanceView {
    /// Not fetched yet. The session controller never commits this: its
    /// snapshots hold accounts only once they are aggregated. Presentation
    /// layers use it for rows they draw before the first snapshot arrives.
    Pending,
    /// Balance in wei.
    Value(u128),
    /// The balance fetch failed.
    Error(String),
}

impl BalanceView {
    pub fn value(&self) -> Option<u128> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Combined view of one account. Replaced wholesale on every refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub address: Address,
    pub native_balance: BalanceView,
    pub proof: ProofView,
}

impl AccountView {
    pub fn new(address: Address, native_balance: BalanceView, proof: ProofView) -> Self {
        Self {
            address,
            native_balance,
            proof,
        }
    }
}

/// The complete client-side session state.
///
/// A `Session` handed out by the controller is a snapshot: a full copy that
/// is never updated in place afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub status: SessionStatus,
    pub accounts: Vec<AccountView>,
}

impl Session {
    /// A fresh session in the `Disconnected` state.
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Disconnected,
            accounts: Vec::new(),
        }
    }

    /// Look up an account by address.
    pub fn account(&self, address: &Address) -> Option<&AccountView> {
        self.accounts.iter().find(|a| &a.address == address)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_disconnected_and_empty() {
        let session = Session::new();
        assert_eq!(session.status, SessionStatus::Disconnected);
        assert!(session.accounts.is_empty());
    }

    #[test]
    fn account_lookup_by_address() {
        let mut session = Session::new();
        session.accounts.push(AccountView::new(
            Address::new("0xA"),
            BalanceView::Value(5),
            ProofView::NotConfigured,
        ));
        assert!(session.account(&Address::new("0xA")).is_some());
        assert!(session.account(&Address::new("0xB")).is_none());
    }

    #[test]
    fn connect_error_display_includes_code() {
        let err = ConnectError::new(Some("4001".into()), "User rejected");
        assert_eq!(err.to_string(), "User rejected (code 4001)");
        let err = ConnectError::new(None, "no provider");
        assert_eq!(err.to_string(), "no provider");
    }

    #[test]
    fn balance_accessors() {
        assert_eq!(BalanceView::Value(7).value(), Some(7));
        assert_eq!(BalanceView::Pending.value(), None);
        assert!(BalanceView::Error("x".into()).is_error());
    }
}
