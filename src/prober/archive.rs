use super::{ProbeError, ProbeFailure, ProbeOutcome, ProbeRequest};
use crate::config::ProbeConfig;
use crate::rpc::{is_address, RpcRequest, RpcResponse, PROBE_CALL_DATA};
use reqwest::Client;
use url::Url;

pub struct ArchiveProber {
    client: Client,
}

impl ArchiveProber {
    pub fn new(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    async fn rpc_call(&self, url: &str, request: &RpcRequest) -> Result<RpcResponse, ProbeFailure> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProbeFailure::Transport(format!("HTTP error: {}", e)))?;

        // Status is not checked: nodes often pair 4xx/5xx with a JSON-RPC error body.
        let body = response
            .text()
            .await
            .map_err(|e| ProbeFailure::Transport(format!("HTTP body error: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| ProbeFailure::Decode(format!("JSON parse error: {}", e)))
    }

    /// Check whether the endpoint serves historical contract state at the
    /// requested block. Attempt failures never surface as `Err`; they are
    /// retried and reported in the outcome.
    pub async fn probe(&self, request: &ProbeRequest) -> Result<ProbeOutcome, ProbeError> {
        check_endpoint(&request.endpoint)?;
        if request.max_retries == 0 {
            return Err(ProbeError::InvalidRetries);
        }
        if !is_address(&request.contract_address) {
            log::warn!(
                "{} does not look like a contract address, sending anyway",
                request.contract_address
            );
        }

        let block_hex = request.block_hex();
        let payload = RpcRequest::eth_call(&request.contract_address, PROBE_CALL_DATA, &block_hex);
        let mut last_failure = None;

        for attempt in 1..=request.max_retries {
            log::info!(
                "Attempt {}/{}: eth_call {} at block {} ({})",
                attempt,
                request.max_retries,
                request.contract_address,
                request.block_number,
                block_hex
            );

            let failure = match self.rpc_call(&request.endpoint, &payload).await {
                Ok(response) => match response.error_message() {
                    Some(message) => ProbeFailure::Rpc(message),
                    None => {
                        let data = response.result.map(|v| match v.as_str() {
                            Some(s) => s.to_string(),
                            None => v.to_string(),
                        });
                        log::info!(
                            "Block {} is available on {} (attempt {})",
                            request.block_number,
                            request.endpoint,
                            attempt
                        );
                        return Ok(ProbeOutcome::succeeded(attempt, data, last_failure));
                    }
                },
                Err(failure) => failure,
            };

            log::warn!("Attempt {} failed: {}", attempt, failure);
            last_failure = Some(failure);

            if attempt < request.max_retries {
                log::info!("Retrying in {:?}", request.retry_delay);
                tokio::time::sleep(request.retry_delay).await;
            }
        }

        log::error!(
            "Block {} not available on {} after {} attempts",
            request.block_number,
            request.endpoint,
            request.max_retries
        );
        Ok(ProbeOutcome::exhausted(request.max_retries, last_failure))
    }
}

fn check_endpoint(endpoint: &str) -> Result<(), ProbeError> {
    let invalid = |reason: &str| ProbeError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}
