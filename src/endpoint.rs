//! Endpoints and request URL construction

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative API path identifying a market data resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// All tickers
    pub fn tickers() -> Self {
        Self::new("tickers")
    }

    /// Ticker for one market, e.g. `BTC-USD`
    pub fn ticker(symbol: &str) -> Self {
        Self(format!("tickers/{}", symbol))
    }

    /// Aggregated (level 2) order book for one market
    pub fn l2(symbol: &str) -> Self {
        Self(format!("l2/{}", symbol))
    }

    /// Per-order (level 3) order book for one market
    pub fn l3(symbol: &str) -> Self {
        Self(format!("l3/{}", symbol))
    }

    /// Market symbol catalogue
    pub fn symbols() -> Self {
        Self::new("symbols")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Endpoint {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&Endpoint> for Endpoint {
    fn from(endpoint: &Endpoint) -> Self {
        endpoint.clone()
    }
}

/// Joins base and endpoint with exactly one `/`
pub fn compose(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Builds the absolute request URL for an endpoint
///
/// The base is parsed first, so its scheme, host and port are compared in
/// normalized form (`HTTPS://API.example.com:443` is fine). The endpoint's
/// path must survive parsing unchanged. Returns `None` for characters outside
/// the URL-safe set, broken percent escapes, parse failures, an empty host,
/// and paths the parser would rewrite (dot segments).
pub fn build_url(base: &str, endpoint: &str) -> Option<Url> {
    if !is_url_safe(endpoint) {
        return None;
    }

    let base = Url::parse(base).ok()?;
    if base.host_str().map_or(true, str::is_empty) {
        return None;
    }

    let url = Url::parse(&compose(base.as_str(), endpoint)).ok()?;

    let endpoint_path = endpoint
        .trim_start_matches('/')
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let expected_path = format!("{}/{}", base.path().trim_end_matches('/'), endpoint_path);
    if url.path() != expected_path {
        return None;
    }

    Some(url)
}

fn is_url_safe(path: &str) -> bool {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escape = bytes.get(i + 1..i + 3);
                if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                    return false;
                }
                i += 3;
                continue;
            }
            b if b.is_ascii_alphanumeric() => {}
            b'-' | b'.' | b'_' | b'~' => {}
            b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => {}
            b':' | b'@' | b'/' | b'?' | b'#' => {}
            _ => return false,
        }
        i += 1;
    }
    true
}
