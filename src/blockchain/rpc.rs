// src/blockchain/rpc.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::models::RpcError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

impl Request {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: default_jsonrpc(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

impl Response {
    /// Splits the envelope into the node's result or its error object.
    pub fn into_result(self) -> Result<Value, RpcError> {
        if let Some(err) = self.error {
            let message = match err.data {
                Some(Value::String(data)) => format!("{} ({})", err.message, data),
                _ => err.message,
            };
            return Err(RpcError::Node {
                code: err.code,
                message,
            });
        }
        self.result
            .ok_or_else(|| RpcError::Malformed("response has neither result nor error".into()))
    }
}
