//! Provider error taxonomy and normalization.

use proofdesk_rpc::{JsonRpcError, TransportError};
use proofdesk_types::ConnectError;
use std::fmt;
use thiserror::Error;

/// EIP-1193 code for "the user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// A provider-reported failure with its opaque code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderFault {
    pub code: Option<String>,
    pub message: String,
}

impl ProviderFault {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&JsonRpcError> for ProviderFault {
    fn from(fault: &JsonRpcError) -> Self {
        Self::new(Some(fault.code.to_string()), fault.message.clone())
    }
}

impl fmt::Display for ProviderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No wallet provider is present. The user must install or enable one.
    #[error("no wallet provider available")]
    Unavailable,

    /// The human declined the connection prompt.
    #[error("user rejected the request: {0}")]
    UserRejected(ProviderFault),

    /// Any other provider-reported failure.
    #[error("provider error: {0}")]
    Provider(ProviderFault),

    /// A read failed on the network.
    #[error("RPC error: {0}")]
    Rpc(String),
}

impl ProviderError {
    /// Classify a transport error raised by an authorization call.
    ///
    /// Fault code 4001 becomes [`ProviderError::UserRejected`]; every other
    /// fault or transport failure becomes [`ProviderError::Provider`].
    pub fn from_connect(err: TransportError) -> Self {
        match err {
            TransportError::Rpc(fault) if fault.code == USER_REJECTED_CODE => {
                ProviderError::UserRejected(ProviderFault::from(&fault))
            }
            TransportError::Rpc(fault) => ProviderError::Provider(ProviderFault::from(&fault)),
            other => ProviderError::Provider(ProviderFault::new(None, other.to_string())),
        }
    }

    /// Classify a transport error raised while listing accounts.
    ///
    /// An endpoint that refuses the connection is treated as an absent
    /// provider. One that accepts it but answers too slowly is present, so a
    /// timeout stays a recoverable [`ProviderError::Provider`].
    pub fn from_discover(err: TransportError) -> Self {
        match err {
            TransportError::Unreachable(_) => ProviderError::Unavailable,
            other => ProviderError::from_connect(other),
        }
    }

    /// Classify an ethers error raised by a read such as `eth_getBalance`.
    pub fn from_read(err: ethers::providers::ProviderError) -> Self {
        ProviderError::Rpc(err.to_string())
    }

    /// Whether retrying the triggering command may succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ProviderError::Unavailable)
    }

    /// The session-level error recorded when a connection attempt fails.
    ///
    /// Code and message are copied verbatim from the provider's fault.
    pub fn to_connect_error(&self) -> ConnectError {
        match self {
            ProviderError::UserRejected(fault) | ProviderError::Provider(fault) => {
                ConnectError::new(fault.code.clone(), fault.message.clone())
            }
            ProviderError::Unavailable => ConnectError::new(None, self.to_string()),
            ProviderError::Rpc(message) => ConnectError::new(None, message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fault(code: i64, message: &str) -> TransportError {
        TransportError::rpc(code, message)
    }

    #[test]
    fn code_4001_is_user_rejection() {
        let err = ProviderError::from_connect(fault(4001, "User rejected"));
        assert_eq!(
            err,
            ProviderError::UserRejected(ProviderFault::new(Some("4001".into()), "User rejected"))
        );
    }

    #[test]
    fn other_codes_are_provider_errors() {
        let err = ProviderError::from_connect(fault(-32002, "Request already pending"));
        assert!(matches!(err, ProviderError::Provider(ref f) if f.code.as_deref() == Some("-32002")));
    }

    #[test]
    fn unreachable_discovery_means_no_provider() {
        let err = ProviderError::from_discover(TransportError::Unreachable("refused".into()));
        assert_eq!(err, ProviderError::Unavailable);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn slow_discovery_is_a_recoverable_provider_error() {
        let err = ProviderError::from_discover(TransportError::Timeout);
        match &err {
            ProviderError::Provider(fault) => {
                assert_eq!(fault.code, None);
                assert_eq!(fault.message, "request timed out");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.is_recoverable());
        assert_ne!(err.to_connect_error().message, "no wallet provider available");
    }

    #[test]
    fn unreachable_connect_is_provider_error_without_code() {
        let err = ProviderError::from_connect(TransportError::Unreachable("refused".into()));
        match err {
            ProviderError::Provider(fault) => {
                assert_eq!(fault.code, None);
                assert!(fault.message.contains("refused"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn connect_error_copies_code_and_message() {
        let err = ProviderError::UserRejected(ProviderFault::new(Some("4001".into()), "User rejected"));
        let ce = err.to_connect_error();
        assert_eq!(ce.code.as_deref(), Some("4001"));
        assert_eq!(ce.message, "User rejected");
    }

    #[test]
    fn unavailable_connect_error_has_no_code() {
        let ce = ProviderError::Unavailable.to_connect_error();
        assert_eq!(ce.code, None);
        assert_eq!(ce.message, "no wallet provider available");
    }
}
