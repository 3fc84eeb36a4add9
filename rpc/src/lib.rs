//! JSON-RPC transport for proofdesk.
//!
//! The wallet provider and the proof contract are both reached through the
//! same JSON-RPC endpoint. Requests are made through ethers; this crate owns
//! the transport underneath it:
//! - [`HttpTransport`], the production transport over HTTP
//! - [`TransportError`], which keeps apart an endpoint that cannot be
//!   reached, one that is too slow, and one that answered with an error object
//! - [`Transport`], the seam test doubles implement

pub mod error;
pub mod http;
pub mod transport;

pub use error::TransportError;
pub use ethers::providers::JsonRpcError;
pub use http::HttpTransport;
pub use transport::Transport;
