//! reqwest-backed transport implementation

use crate::{
    config::ClientConfig,
    error::TransportError,
    transport::{HttpTransport, RawResponse},
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::collections::HashMap;

/// Transport that issues real requests through a shared reqwest client
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a new transport from client settings
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TransportError::failed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_builder() {
        return TransportError::InvalidUrl(error.to_string());
    }

    let message = if error.is_timeout() {
        format!("timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    TransportError::Failed {
        status: error.status().map(|s| s.as_u16()),
        message,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
        tracing::trace!(url = %url, "Sending GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.bytes().await.map_err(classify)?;

        Ok(RawResponse {
            status: Some(status),
            headers,
            body: body.to_vec(),
        })
    }

    fn transport_name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_client_from_config() {
        let transport = ReqwestTransport::new(&ClientConfig::default()).unwrap();
        assert_eq!(transport.transport_name(), "reqwest");
    }

    #[tokio::test]
    async fn test_unreachable_host_reports_failure_without_status() {
        let config = ClientConfig {
            timeout_secs: 2,
            ..ClientConfig::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        // Nothing listens on the loopback discard port.
        let url = Url::parse("http://127.0.0.1:9/tickers").unwrap();

        match transport.get(&url).await {
            Err(TransportError::Failed { status, .. }) => assert_eq!(status, None),
            other => panic!("expected transport failure, got {:?}", other),
        }
    }
}
