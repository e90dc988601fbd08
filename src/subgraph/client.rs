use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubgraphError {
    #[error("failed to create HTTP client: {0}")]
    Client(String),
    #[error("subgraph request failed: {0}")]
    Request(String),
    #[error("query failed with status code {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse subgraph response: {0}")]
    Decode(String),
}

#[derive(Debug, Serialize)]
struct QueryPayload<'a> {
    query: &'a str,
}

#[derive(Debug, Clone)]
pub struct SubgraphClient {
    client: Client,
}

impl SubgraphClient {
    pub fn new(timeout: Duration) -> Result<Self, SubgraphError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubgraphError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// POST a GraphQL query and return the raw JSON body, `errors` included.
    pub async fn query(&self, url: &str, query: &str) -> Result<serde_json::Value, SubgraphError> {
        let response = self
            .client
            .post(url)
            .json(&QueryPayload { query })
            .send()
            .await
            .map_err(|e| SubgraphError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubgraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SubgraphError::Decode(e.to_string()))
    }
}
