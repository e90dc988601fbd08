use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Selector sent as call data when probing historical contract state.
pub const PROBE_CALL_DATA: &str = "0x06fdde03";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<serde_json::Value>,
    pub id: u64,
}

impl RpcRequest {
    pub fn new(method: &str, params: Vec<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        }
    }

    pub fn eth_call(to: &str, data: &str, block: &str) -> Self {
        Self::new(
            "eth_call",
            vec![
                serde_json::json!({ "to": to, "data": data }),
                serde_json::json!(block),
            ],
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    pub result: Option<serde_json::Value>,
    /// Left untyped: nodes disagree on the shape of `code`, and some omit it.
    pub error: Option<serde_json::Value>,
}

impl RpcResponse {
    /// `error.message` when present, otherwise the raw error value.
    /// `None` for an absent or `null` error.
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        let message = match error.get("message").and_then(|m| m.as_str()) {
            Some(msg) => msg.to_string(),
            None => match error.as_str() {
                Some(s) => s.to_string(),
                None => error.to_string(),
            },
        };
        Some(message)
    }
}

/// Canonical block tag: lowercase hex with a `0x` prefix.
pub fn block_to_hex(block: u64) -> String {
    format!("0x{:x}", block)
}

pub fn parse_hex_u64(s: &str) -> Option<u64> {
    let s = s.trim_start_matches("0x");
    u64::from_str_radix(s, 16).ok()
}

pub fn is_address(s: &str) -> bool {
    static ADDRESS: OnceLock<Regex> = OnceLock::new();
    ADDRESS
        .get_or_init(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid address regex"))
        .is_match(s)
}
