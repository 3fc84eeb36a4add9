//! Nullable JSON-RPC transport with scripted responses.

use async_trait::async_trait;
use ethers::providers::JsonRpcClient;
use proofdesk_rpc::TransportError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// JSON-RPC code returned for methods nothing was scripted for.
pub const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Default)]
struct TransportState {
    /// One-shot responses, consumed in order per method.
    queued: HashMap<String, VecDeque<Result<Value, TransportError>>>,
    /// Fallback response once the queue for a method is empty.
    always: HashMap<String, Value>,
    /// Every request seen, in order.
    requests: Vec<(String, Value)>,
}

/// A test transport that answers from a script instead of the network.
///
/// Plugs into ethers as a [`JsonRpcClient`], so the real provider and
/// contract facades run unchanged on top of it.
#[derive(Clone, Debug, Default)]
pub struct NullTransport {
    state: Arc<Mutex<TransportState>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next `method` call with `result`.
    pub fn respond(&self, method: &str, result: Value) {
        self.enqueue(method, Ok(result));
    }

    /// Fail the next `method` call with `error`.
    pub fn fail(&self, method: &str, error: TransportError) {
        self.enqueue(method, Err(error));
    }

    /// Fail the next `method` call with a provider error object.
    pub fn fault(&self, method: &str, code: i64, message: &str) {
        self.fail(method, TransportError::rpc(code, message));
    }

    /// Answer every `method` call with `result` once its queue is drained.
    pub fn respond_always(&self, method: &str, result: Value) {
        self.state
            .lock()
            .unwrap()
            .always
            .insert(method.to_string(), result);
    }

    /// All requests seen so far, as `(method, params)`.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Params of every request made to `method`.
    pub fn requests_to(&self, method: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Clear all scripted responses and recorded requests.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = TransportState::default();
    }

    fn enqueue(&self, method: &str, response: Result<Value, TransportError>) {
        self.state
            .lock()
            .unwrap()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    fn answer(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push((method.to_string(), params));

        if let Some(response) = state.queued.get_mut(method).and_then(|q| q.pop_front()) {
            return response;
        }
        if let Some(result) = state.always.get(method) {
            return Ok(result.clone());
        }
        Err(TransportError::rpc(
            METHOD_NOT_FOUND,
            format!("no scripted response for {method}"),
        ))
    }
}

#[async_trait]
impl JsonRpcClient for NullTransport {
    type Error = TransportError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, TransportError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let params = serde_json::to_value(params)?;
        let result = self.answer(method, params)?;
        Ok(serde_json::from_value(result)?)
    }
}
