//! Market data service
//!
//! The single entry point for fetching exchange data: give it an endpoint and
//! a model type, get back either the decoded model or a [`CryptoApiError`].
//!
//! ```text
//! fetch(endpoint)
//!     ↓
//! build_url      (fails closed → UrlError, no request)
//!     ↓
//! HttpTransport  (one GET, no retry)
//!     ↓
//! validate       (non-2xx → ResponseError)
//!     ↓
//! PayloadDecoder (→ DecodingError)
//!     ↓
//! PendingFetch   (await it, or on_primary → handler on the primary context)
//! ```
//!
//! Each call issues its own request. Nothing is cached or deduplicated, and
//! there is no cancellation: a fetch runs until it succeeds or fails.

use crate::{
    config::ClientConfig,
    context::PrimaryContext,
    decode::{decode_with, JsonDecoder, PayloadDecoder},
    endpoint::{build_url, compose, Endpoint},
    error::{CryptoApiError, SetupError},
    inflight::InFlightRegistry,
    metrics::{FetchMetrics, FetchTimer, MetricsCollector},
    pending::{Delivery, PendingFetch, Undelivered},
    transport::HttpTransport,
    transports::ReqwestTransport,
    types::{OrderBook, Ticker},
    validate::validate_response,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Fetch-and-decode facade over an injected transport
///
/// Network I/O and decoding run on the worker runtime; completion handlers
/// run on the primary context. Cloning shares the same transport, registry
/// and metrics.
///
/// # Example
/// ```no_run
/// use crypto_market_data::{ClientConfig, MarketDataService, PrimaryContext, Ticker};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let primary = PrimaryContext::spawn("ui")?;
/// let service = MarketDataService::connect(&ClientConfig::default(), primary)?;
///
/// let queued = service.fetch_with::<Ticker, _>("tickers/BTC-USD", |result| match result {
///     Ok(ticker) => println!("{}: {}", ticker.symbol, ticker.price_string()),
///     Err(e) => eprintln!("Error: {}", e),
/// });
/// if queued.is_err() {
///     eprintln!("UI loop has stopped");
/// }
/// # Ok(())
/// # }
/// ```
pub struct MarketDataService<D: PayloadDecoder = JsonDecoder> {
    pipeline: Arc<Pipeline<D>>,
    primary: PrimaryContext,
    runtime: Handle,
}

impl<D: PayloadDecoder> Clone for MarketDataService<D> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            primary: self.primary.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

struct Pipeline<D> {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    decoder: D,
    in_flight: InFlightRegistry,
    metrics: Arc<MetricsCollector>,
}

impl MarketDataService<JsonDecoder> {
    /// Creates a service with the default JSON decoder
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
        primary: PrimaryContext,
        runtime: Handle,
    ) -> Self {
        Self::with_decoder(config, transport, JsonDecoder, primary, runtime)
    }

    /// Creates a service backed by reqwest on the current tokio runtime
    pub fn connect(config: &ClientConfig, primary: PrimaryContext) -> Result<Self, SetupError> {
        let runtime = Handle::try_current()?;
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(config, Arc::new(transport), primary, runtime))
    }
}

impl<D: PayloadDecoder> MarketDataService<D> {
    /// Creates a service with a custom decoder
    pub fn with_decoder(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
        decoder: D,
        primary: PrimaryContext,
        runtime: Handle,
    ) -> Self {
        tracing::debug!(
            base_url = %config.base_url,
            transport = transport.transport_name(),
            primary = primary.name(),
            "Market data service created"
        );

        Self {
            pipeline: Arc::new(Pipeline {
                base_url: config.base_url.clone(),
                transport,
                decoder,
                in_flight: InFlightRegistry::new(),
                metrics: Arc::new(MetricsCollector::new()),
            }),
            primary,
            runtime,
        }
    }

    /// Starts fetching `endpoint` and decoding it as `T`
    ///
    /// The request is issued immediately on the worker runtime, whether or
    /// not the returned handle is ever awaited.
    pub fn fetch<T>(&self, endpoint: impl Into<Endpoint>) -> PendingFetch<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let endpoint = endpoint.into();
        let guard = self.pipeline.in_flight.register(endpoint.clone());
        let id = guard.id();
        let (tx, rx) = oneshot::channel();
        let pipeline = self.pipeline.clone();

        let task = self.runtime.spawn(async move {
            let result = pipeline.run::<T>(id, &endpoint).await;
            // An unread result is dropped here, guard included.
            let _ = tx.send(Delivery { result, guard });
        });

        PendingFetch::new(id, rx, Some(task), self.primary.clone())
    }

    /// Fetches `endpoint` and hands the result to `handler` on the primary context
    ///
    /// Returns the request id once the handler is queued. If the primary
    /// context has stopped, the fetch and the handler come back unrun in
    /// [`Undelivered`] so the caller can still consume the result.
    pub fn fetch_with<T, F>(
        &self,
        endpoint: impl Into<Endpoint>,
        handler: F,
    ) -> Result<Uuid, Undelivered<T, F>>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, CryptoApiError>) + Send + 'static,
    {
        let pending = self.fetch::<T>(endpoint);
        let id = pending.request_id();
        pending.on_primary(handler)?;
        Ok(id)
    }

    /// 24h ticker for one market, e.g. `BTC-USD`
    pub fn ticker(&self, symbol: &str) -> PendingFetch<Ticker> {
        self.fetch(Endpoint::ticker(symbol))
    }

    /// 24h tickers for every market
    pub fn tickers(&self) -> PendingFetch<Vec<Ticker>> {
        self.fetch(Endpoint::tickers())
    }

    /// Level 2 order book for one market
    pub fn order_book(&self, symbol: &str) -> PendingFetch<OrderBook> {
        self.fetch(Endpoint::l2(symbol))
    }

    /// Number of fetches started but not yet consumed
    pub fn in_flight(&self) -> usize {
        self.pipeline.in_flight.len()
    }

    pub fn in_flight_registry(&self) -> &InFlightRegistry {
        &self.pipeline.in_flight
    }

    pub fn metrics(&self) -> FetchMetrics {
        self.pipeline.metrics.snapshot()
    }

    pub fn primary(&self) -> &PrimaryContext {
        &self.primary
    }

    pub fn base_url(&self) -> &str {
        &self.pipeline.base_url
    }
}

impl<D: PayloadDecoder> Pipeline<D> {
    async fn run<T: DeserializeOwned>(
        &self,
        id: Uuid,
        endpoint: &Endpoint,
    ) -> Result<T, CryptoApiError> {
        let mut timer = FetchTimer::start(self.metrics.clone());
        let result = self.execute(id, endpoint).await;

        match &result {
            Ok(_) => {
                timer.succeed();
                tracing::debug!(
                    request_id = %id,
                    endpoint = %endpoint,
                    latency_ms = timer.elapsed_ms(),
                    "Fetch succeeded"
                );
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %id,
                    endpoint = %endpoint,
                    latency_ms = timer.elapsed_ms(),
                    error = %e,
                    "Fetch failed"
                );
            }
        }

        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        id: Uuid,
        endpoint: &Endpoint,
    ) -> Result<T, CryptoApiError> {
        let url = build_url(&self.base_url, endpoint.as_str())
            .ok_or_else(|| CryptoApiError::unsupported_url(compose(&self.base_url, endpoint.as_str())))?;

        tracing::debug!(request_id = %id, url = %url, "Fetching");

        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|e| CryptoApiError::from_transport(url.as_str(), e))?;

        let body = validate_response(response)?;
        decode_with(&self.decoder, &body)
    }
}
