//! HTTP transport for JSON-RPC 2.0 calls.

use async_trait::async_trait;
use ethers::providers::{Http, HttpClientError, JsonRpcClient};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::time::Duration;

use crate::TransportError;

/// Default timeout for a single JSON-RPC request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// ethers' HTTP transport with the request timeout set and its errors
/// sorted into [`TransportError`].
///
/// Cloning is cheap: clones share the connection pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    inner: Http,
    url: String,
}

impl HttpTransport {
    /// Create a transport for `url` with the default timeouts.
    pub fn new(url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let parsed = Url::parse(url)
            .map_err(|e| TransportError::Http(format!("invalid endpoint {url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            inner: Http::new_with_client(parsed, client),
            url: url.to_string(),
        })
    }

    /// The configured endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl From<HttpClientError> for TransportError {
    fn from(err: HttpClientError) -> Self {
        match err {
            HttpClientError::ReqwestError(e) if e.is_timeout() => TransportError::Timeout,
            HttpClientError::ReqwestError(e) if e.is_connect() => {
                TransportError::Unreachable(e.to_string())
            }
            HttpClientError::ReqwestError(e) => TransportError::Http(e.to_string()),
            HttpClientError::JsonRpcError(e) => TransportError::Rpc(e),
            HttpClientError::SerdeJson { err, .. } => TransportError::Decode(err),
        }
    }
}

#[async_trait]
impl JsonRpcClient for HttpTransport {
    type Error = TransportError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, TransportError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        tracing::trace!(method, "json-rpc request");
        self.inner.request(method, params).await.map_err(|e| {
            let err = TransportError::from(e);
            tracing::debug!(method, error = %err, "json-rpc request failed");
            err
        })
    }
}
