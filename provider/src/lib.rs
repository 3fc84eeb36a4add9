//! Wallet provider gateway.
//!
//! A thin async facade over the user's wallet provider:
//! - `discover` lists the accounts the provider already exposes
//! - `connect` asks the human to authorize the client
//! - `get_balance` reads an account's native balance
//!
//! Provider error shapes are normalized here into [`ProviderError`]; nothing
//! provider-specific leaks past this crate.

pub mod error;
pub mod gateway;
pub mod rpc_provider;

pub use error::{ProviderError, ProviderFault, USER_REJECTED_CODE};
pub use gateway::ProviderGateway;
pub use rpc_provider::RpcProvider;
