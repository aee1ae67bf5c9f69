//! # JSON-RPC Transport
//!
//! [`RpcTransport`] is the seam between the clients and whatever speaks
//! Ethereum JSON-RPC: a node, a wallet bridge, or [`crate::mock::MockTransport`]
//! in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ChainError;

#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send one request and return its `result` member.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError>;

    /// Endpoint description for logs.
    fn endpoint(&self) -> &str;
}

/// JSON-RPC 2.0 over HTTP POST.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        debug!("[RPC] -> {} #{}", method, id);

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Transport(format!("HTTP {} from {}", status, self.url)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(format!("invalid JSON-RPC body: {}", e)))?;

        parse_response(body)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Split a JSON-RPC response envelope into its result or a classified error.
pub fn parse_response(mut body: Value) -> Result<Value, ChainError> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32603);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(ChainError::from_rpc(code, message));
    }

    match body.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(ChainError::Decode("response has neither result nor error".to_string())),
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_quantity(value: &Value) -> Result<u128, ChainError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ChainError::Decode(format!("expected hex quantity, got {}", value)))?;
    let digits = raw.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| ChainError::Decode(format!("bad hex quantity {}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result() {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "result": "0xaa36a7" });
        assert_eq!(parse_response(body).unwrap(), json!("0xaa36a7"));
    }

    #[test]
    fn test_parse_null_result_is_ok() {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "result": null });
        assert_eq!(parse_response(body).unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_error_rejection() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 4001, "message": "User rejected the request." }
        });
        assert!(parse_response(body).unwrap_err().is_user_rejection());
    }

    #[test]
    fn test_parse_error_generic() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32601, "message": "method not found" }
        });
        assert_eq!(
            parse_response(body).unwrap_err(),
            ChainError::Rpc { code: -32601, message: "method not found".into() }
        );
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&json!("0xaa36a7")).unwrap(), 11_155_111);
        assert_eq!(parse_quantity(&json!("0x")).unwrap(), 0);
        assert!(parse_quantity(&json!(12)).is_err());
        assert!(parse_quantity(&json!("0xzz")).is_err());
    }
}
