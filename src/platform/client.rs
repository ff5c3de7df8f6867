use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use crate::constants::{PLATFORM_CONNECT_TIMEOUT_SECS, PLATFORM_REQUEST_TIMEOUT_SECS};
use crate::error::{AppError, Result};

/// Thin GraphQL transport: one bearer-authenticated POST per call.
/// Retries belong to callers that need them (the confirmation poller);
/// this layer reports exactly one attempt.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: Url,
    token: String,
    client: Client,
}

impl GraphqlClient {
    pub fn new(endpoint: &str, token: String) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| anyhow::anyhow!("Invalid platform URL: {e}"))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(PLATFORM_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(PLATFORM_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            endpoint,
            token,
            client,
        })
    }

    /// Executes a named operation and returns its `data` payload.
    /// Transport failures and GraphQL-level errors map to
    /// `AppError::Remote`; a 2xx response with no data is schema drift
    /// and maps to `UpstreamProtocol`.
    pub async fn execute(
        &self,
        operation: &str,
        document: &str,
        variables: Value,
    ) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await
            .map_err(|e| AppError::Remote {
                messages: vec![format!("{operation}: {e}")],
                network: true,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Remote {
                messages: vec![format!("{operation}: HTTP {status}: {body}")],
                network: false,
            });
        }

        let body: Value = response.json().await.map_err(|e| AppError::Remote {
            messages: vec![format!("{operation}: invalid response body: {e}")],
            network: true,
        })?;

        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let messages = errors
                    .iter()
                    .map(|err| {
                        err.get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown GraphQL error")
                            .to_string()
                    })
                    .collect();
                return Err(AppError::Remote {
                    messages,
                    network: false,
                });
            }
        }

        match body.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Err(AppError::UpstreamProtocol(format!(
                "{operation}: response carries no data"
            ))),
        }
    }
}
