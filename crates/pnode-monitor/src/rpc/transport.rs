use async_trait::async_trait;
use pnode_types::{PnodeError, PnodeResult};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::envelope::{JsonRpcRequest, JsonRpcResponse};

/// Delivers one JSON-RPC request to an endpoint and unwraps the envelope.
///
/// Non-2xx replies and `error` envelopes are both returned as `Err`, so the
/// caller never has to tell transport and protocol failures apart.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, endpoint: &str, request: &JsonRpcRequest) -> PnodeResult<Value>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> PnodeResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PnodeError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, endpoint: &str, request: &JsonRpcRequest) -> PnodeResult<Value> {
        debug!("RPC {} -> {}", request.method, endpoint);

        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| PnodeError::Transport(format!("{} failed: {}", request.method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PnodeError::HttpStatus(status.as_u16()));
        }

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| PnodeError::Decode(format!("Failed to parse RPC response: {}", e)))?;

        envelope.into_result()
    }
}
