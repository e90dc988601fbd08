pub mod archive;

use crate::config::ProbeConfig;
use crate::rpc::block_to_hex;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use archive::ArchiveProber;

/// A single capability check: can `endpoint` answer an `eth_call` against
/// `contract_address` at `block_number`?
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub endpoint: String,
    pub block_number: u64,
    pub contract_address: String,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl ProbeRequest {
    pub fn new(endpoint: &str, block_number: u64, contract_address: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            block_number,
            contract_address: contract_address.to_string(),
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
            retry_delay: crate::config::DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn block_hex(&self) -> String {
        block_to_hex(self.block_number)
    }
}

/// Why one attempt failed. All kinds are retried the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The node answered with a JSON-RPC `error` object.
    Rpc(String),
    /// The HTTP exchange did not complete.
    Transport(String),
    /// The body was not a JSON-RPC response.
    Decode(String),
}

impl ProbeFailure {
    pub fn message(&self) -> &str {
        match self {
            ProbeFailure::Rpc(msg) | ProbeFailure::Transport(msg) | ProbeFailure::Decode(msg) => msg,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProbeFailure::Rpc(_) => "rpc error",
            ProbeFailure::Transport(_) => "transport error",
            ProbeFailure::Decode(_) => "decode error",
        }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub success: bool,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub result_data: Option<String>,
    /// Kind of the last failed attempt, if any.
    pub failure: Option<ProbeFailure>,
}

impl ProbeOutcome {
    fn succeeded(attempts: u32, result_data: Option<String>, failure: Option<ProbeFailure>) -> Self {
        Self {
            success: true,
            attempts,
            last_error: failure.as_ref().map(|f| f.message().to_string()),
            result_data,
            failure,
        }
    }

    fn exhausted(attempts: u32, failure: Option<ProbeFailure>) -> Self {
        Self {
            success: false,
            attempts,
            last_error: failure.as_ref().map(|f| f.message().to_string()),
            result_data: None,
            failure,
        }
    }
}

/// Rejected before any request is sent.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid RPC endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("max retries must be at least 1")]
    InvalidRetries,
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// One-shot probe with default client settings. `max_retries` and
/// `retry_delay` fall back to 3 attempts and 2 seconds.
pub async fn probe(
    endpoint: &str,
    block_number: u64,
    contract_address: &str,
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
) -> Result<ProbeOutcome, ProbeError> {
    let config = ProbeConfig::default();
    let request = ProbeRequest::new(endpoint, block_number, contract_address)
        .with_retries(max_retries.unwrap_or(config.max_retries))
        .with_delay(retry_delay.unwrap_or(config.retry_delay));

    ArchiveProber::new(&config)?.probe(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = ProbeRequest::new("https://rpc.example.org", 1_000_000, "0xabc");
        assert_eq!(request.max_retries, 3);
        assert_eq!(request.retry_delay, Duration::from_secs(2));
        assert_eq!(request.block_hex(), "0xf4240");
    }

    #[test]
    fn test_failure_display() {
        let failure = ProbeFailure::Rpc("header not found".to_string());
        assert_eq!(failure.message(), "header not found");
        assert_eq!(failure.to_string(), "rpc error: header not found");

        let failure = ProbeFailure::Decode("expected value".to_string());
        assert_eq!(failure.kind(), "decode error");
    }

    #[test]
    fn test_outcome_constructors() {
        let outcome = ProbeOutcome::exhausted(3, Some(ProbeFailure::Transport("refused".into())));
        assert!(!outcome.success);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.last_error.as_deref(), Some("refused"));
        assert!(outcome.result_data.is_none());

        let outcome = ProbeOutcome::succeeded(1, Some("0x1234".into()), None);
        assert!(outcome.success);
        assert!(outcome.last_error.is_none());
    }
}
