//! Transport error type.

use ethers::providers::{JsonRpcError, ProviderError, RpcError};
use thiserror::Error;

/// Why a JSON-RPC request did not produce a result.
///
/// Error objects returned by the provider (EIP-1193 uses 4001 for a user
/// rejection, 4100 for an unauthorized account, and so on) are kept intact
/// in [`TransportError::Rpc`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// Nothing accepted the connection.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The endpoint accepted the request but did not answer in time.
    #[error("request timed out")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("remote error: {} (code {})", .0.message, .0.code)]
    Rpc(JsonRpcError),
}

impl TransportError {
    /// A provider error object with `code` and `message`.
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        TransportError::Rpc(JsonRpcError {
            code,
            message: message.into(),
            data: None,
        })
    }

    /// The provider-reported error object, if this error carries one.
    pub fn fault(&self) -> Option<&JsonRpcError> {
        match self {
            TransportError::Rpc(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the endpoint could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TransportError::Unreachable(_))
    }
}

impl RpcError for TransportError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        self.fault()
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            TransportError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for ProviderError {
    fn from(e: TransportError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(e))
    }
}
