//! Transport abstraction for issuing HTTP requests

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;

/// Raw bytes and status metadata for one response
///
/// Owned by the fetch pipeline and consumed by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status, or `None` when the response was not HTTP
    pub status: Option<u16>,

    /// Response headers, lower-cased names
    pub headers: HashMap<String, String>,

    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response with an HTTP status and no headers
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Some(status),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Creates a response with no HTTP status
    pub fn without_status(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: None,
            headers: HashMap::new(),
            body: body.into(),
        }
    }
}

/// Trait for HTTP transports
///
/// Implementations perform a single GET and report exactly what came back.
/// They never retry and never interpret the status code.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues one GET request
    ///
    /// # Arguments
    /// * `url` - Absolute request URL
    ///
    /// # Returns
    /// The raw response, or an error if no response was received
    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError>;

    /// Returns the name of this transport
    fn transport_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock transport for testing
    ///
    /// Replays a scripted result per URL and counts every call.
    #[derive(Clone)]
    pub struct MockTransport {
        responses: Arc<Mutex<HashMap<String, Result<RawResponse, TransportError>>>>,
        calls: Arc<Mutex<Vec<String>>>,
        delay: Option<Duration>,
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                responses: Arc::new(Mutex::new(HashMap::new())),
                calls: Arc::new(Mutex::new(Vec::new())),
                delay: None,
            }
        }

        /// Delays every response, so completion lands on a worker thread
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn set_response(&self, url: &str, status: u16, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Ok(RawResponse::new(status, body)));
        }

        pub fn set_raw(&self, url: &str, response: RawResponse) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Ok(response));
        }

        pub fn set_error(&self, url: &str, error: TransportError) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Err(error));
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
            self.calls.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let scripted = self.responses.lock().unwrap().get(url.as_str()).cloned();
            scripted.unwrap_or_else(|| Ok(RawResponse::new(404, "")))
        }

        fn transport_name(&self) -> &'static str {
            "mock"
        }
    }
}
