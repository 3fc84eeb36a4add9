//! The request seam shared by the provider and contract facades.

use ethers::providers::JsonRpcClient;

use crate::TransportError;

/// Anything that can carry a JSON-RPC request to the wallet provider.
///
/// [`HttpTransport`](crate::HttpTransport) is the production transport;
/// tests substitute a scripted one. The bound on the error type lets callers
/// tell an absent provider from a slow one.
pub trait Transport: JsonRpcClient<Error = TransportError> + Clone + 'static {}

impl<T> Transport for T where T: JsonRpcClient<Error = TransportError> + Clone + 'static {}
