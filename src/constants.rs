//! Constants for the market data client
//!
//! Defaults for everything the client needs to talk to the exchange. A
//! composition root can override the network settings through
//! [`ClientConfig`](crate::config::ClientConfig); nothing is read from the
//! environment.

/// Exchange REST API base URL
pub const BASE_API_URL: &str = "https://api.blockchain.com/v3/exchange";

/// HTTP request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "crypto-market-data/0.1.0";

/// Status reported when a failure carries no HTTP status of its own
pub const FALLBACK_STATUS_CODE: u16 = 500;

/// Lowest status code accepted as success
pub const SUCCESS_STATUS_MIN: u16 = 200;

/// Highest status code accepted as success
pub const SUCCESS_STATUS_MAX: u16 = 299;

/// Number of latency samples kept for fetch metrics
pub const METRICS_WINDOW: usize = 100;

/// Name of the thread that runs the primary context
pub const PRIMARY_THREAD_NAME: &str = "market-data-primary";
