//! # Crypto Market Data
//!
//! Typed fetch-and-decode client for cryptocurrency exchange market data
//! (tickers, order books) served over a REST API.
//!
//! Every fetch builds a URL, issues one GET, checks the status, decodes the
//! JSON body into the type you ask for, and resolves with exactly one value
//! or one [`CryptoApiError`]. Completion handlers run on a
//! [`PrimaryContext`], a single dedicated thread standing in for a UI loop.
//!
//! ## Usage
//!
//! ```no_run
//! use crypto_market_data::{ClientConfig, MarketDataService, PrimaryContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let primary = PrimaryContext::spawn("ui")?;
//! let service = MarketDataService::connect(&ClientConfig::default(), primary)?;
//!
//! // Await on the current task
//! let ticker = service.ticker("BTC-USD").await?;
//! println!("{}: {} ({})", ticker.symbol, ticker.price_string(), ticker.change_string());
//!
//! // Or deliver on the primary context
//! let queued = service.order_book("BTC-USD").on_primary(|result| {
//!     if let Ok(book) = result {
//!         println!("spread: {:?}", book.spread());
//!     }
//! });
//! if let Err(undelivered) = queued {
//!     // The primary context has stopped; consume the fetch here instead.
//!     (undelivered.handler)(undelivered.pending.await);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use crypto_market_data::{CryptoApiError, MarketDataService, Ticker};
//!
//! # async fn example(service: MarketDataService) {
//! match service.fetch::<Ticker>("tickers/BTC-USD").await {
//!     Ok(ticker) => println!("{}", ticker.price_string()),
//!     Err(CryptoApiError::UrlError(e)) => eprintln!("Bad endpoint: {}", e),
//!     Err(CryptoApiError::ResponseError(code)) => eprintln!("HTTP {}", code),
//!     Err(CryptoApiError::DecodingError(e)) => eprintln!("Unexpected payload: {}", e),
//!     Err(CryptoApiError::AnyError) => eprintln!("Something went wrong"),
//! }
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod inflight;
pub mod metrics;
pub mod pending;
pub mod service;
pub mod transport;
pub mod transports;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use config::ClientConfig;
pub use context::PrimaryContext;
pub use decode::{JsonDecoder, PayloadDecoder};
pub use endpoint::{build_url, Endpoint};
pub use error::{CryptoApiError, ErrorKindTag, RequestUrlError, SetupError, TransportError};
pub use metrics::FetchMetrics;
pub use pending::{PendingFetch, Undelivered};
pub use service::MarketDataService;
pub use transport::{HttpTransport, RawResponse};
pub use transports::ReqwestTransport;
pub use types::{Asset, OrderBook, PriceLevel, PriceType, Ticker, Trend};
