//! In-process [`RpcTransport`] with scripted responses, for tests and for
//! running the server without a node.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::abi;
use crate::error::ChainError;
use crate::rpc::RpcTransport;

type Reply = Result<Value, ChainError>;

/// Scripted transport.
///
/// Replies are queued per JSON-RPC method, or per contract function for
/// `eth_call`. The last reply in a queue repeats, so polling loops see a
/// stable answer. Unscripted requests fail with a transport error.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for a JSON-RPC method.
    pub fn on(self, method: &str, reply: Reply) -> Self {
        self.push(method.to_string(), reply);
        self
    }

    /// Queue a reply for an `eth_call` to the given contract function signature.
    pub fn on_call(self, signature: &str, reply: Reply) -> Self {
        self.push(call_key(&hex::encode(abi::selector(signature))), reply);
        self
    }

    fn push(&self, key: String, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.entry(key).or_default().push_back(reply);
        }
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|(m, _)| m == method).count()
    }

    fn next_reply(&self, key: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().ok()?;
        let queue = replies.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

fn call_key(selector_hex: &str) -> String {
    format!("eth_call:{}", selector_hex)
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((method.to_string(), params.clone()));
        }

        if method == "eth_call" {
            let selector = params
                .get(0)
                .and_then(|call| call.get("data"))
                .and_then(Value::as_str)
                .and_then(|data| data.strip_prefix("0x"))
                .and_then(|data| data.get(..8));
            if let Some(reply) = selector.and_then(|s| self.next_reply(&call_key(s))) {
                return reply;
            }
        }

        self.next_reply(method)
            .unwrap_or_else(|| Err(ChainError::Transport(format!("no scripted reply for {}", method))))
    }

    fn endpoint(&self) -> &str {
        "mock://"
    }
}
