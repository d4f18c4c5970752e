use pnode_types::{PnodeError, PnodeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Clone, Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: &str) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.to_string(),
            params: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl JsonRpcResponse {
    /// Unwraps the envelope. A populated `error` member is a call failure even
    /// when a `result` is also present.
    pub fn into_result(self) -> PnodeResult<Value> {
        match self.error {
            Some(Value::Null) | None => Ok(self.result.unwrap_or(Value::Null)),
            Some(error) => {
                let message = serde_json::from_value::<RpcErrorObject>(error)
                    .ok()
                    .and_then(|e| e.message)
                    .map(|m| match m {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "RPC error".to_string());
                Err(PnodeError::Rpc(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = JsonRpcRequest::new(3, "get-stats");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"jsonrpc": "2.0", "id": 3, "method": "get-stats", "params": []}));
    }

    #[test]
    fn test_result_envelope() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": [1, 2]})).unwrap();
        assert_eq!(resp.into_result().unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_error_envelope() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({"error": {"code": -32601, "message": "Method not found"}})).unwrap();
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Method not found");

        let resp: JsonRpcResponse = serde_json::from_value(json!({"error": {"code": -32000}})).unwrap();
        assert_eq!(resp.into_result().unwrap_err().to_string(), "RPC error");
    }

    #[test]
    fn test_null_error_is_success() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({"result": "1.2.0", "error": null})).unwrap();
        assert_eq!(resp.into_result().unwrap(), json!("1.2.0"));
    }
}
