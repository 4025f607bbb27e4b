//! Market data models and display helpers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported cryptocurrency assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    /// Bitcoin
    BTC,
    /// Ethereum
    ETH,
    /// Solana
    SOL,
    /// Litecoin
    LTC,
    /// USD Coin
    USDC,
    /// Tether
    USDT,
}

impl Asset {
    /// Get the asset symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::BTC => "BTC",
            Asset::ETH => "ETH",
            Asset::SOL => "SOL",
            Asset::LTC => "LTC",
            Asset::USDC => "USDC",
            Asset::USDT => "USDT",
        }
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Asset::BTC => "Bitcoin",
            Asset::ETH => "Ethereum",
            Asset::SOL => "Solana",
            Asset::LTC => "Litecoin",
            Asset::USDC => "USD Coin",
            Asset::USDT => "Tether",
        }
    }

    /// Exchange market symbol against a quote currency, e.g. `BTC-USD`
    pub fn market_symbol(&self, quote: &str) -> String {
        format!("{}-{}", self.symbol(), quote)
    }

    /// Looks up an asset by its symbol, case-insensitively
    pub fn from_symbol(symbol: &str) -> Option<Asset> {
        Asset::all()
            .iter()
            .copied()
            .find(|a| a.symbol().eq_ignore_ascii_case(symbol))
    }

    /// Get all supported assets
    pub fn all() -> &'static [Asset] {
        &[
            Asset::BTC,
            Asset::ETH,
            Asset::SOL,
            Asset::LTC,
            Asset::USDC,
            Asset::USDT,
        ]
    }
}

/// 24h ticker for one market, as served by the exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Market symbol, e.g. `BTC-USD`
    pub symbol: String,

    /// Price 24 hours ago
    pub price_24h: f64,

    /// Traded volume over the last 24 hours
    pub volume_24h: f64,

    /// Price of the most recent trade
    pub last_trade_price: f64,
}

impl Ticker {
    /// Percentage change from 24h ago to the last trade
    ///
    /// `None` when there is no 24h reference price.
    pub fn percentage_change_24h(&self) -> Option<f64> {
        if self.price_24h == 0.0 {
            return None;
        }
        Some((self.last_trade_price - self.price_24h) / self.price_24h * 100.0)
    }

    /// Base asset of the market, if it is one we know
    pub fn asset(&self) -> Option<Asset> {
        self.symbol
            .split_once('-')
            .and_then(|(base, _)| Asset::from_symbol(base))
    }

    pub fn price_string(&self) -> String {
        format_price(self.last_trade_price)
    }

    pub fn change_string(&self) -> String {
        self.percentage_change_24h()
            .map(format_percentage_change)
            .unwrap_or_else(|| "--".to_string())
    }
}

/// One price level of an order book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price
    pub px: f64,
    /// Quantity at this price
    pub qty: f64,
    /// Number of orders at this price
    #[serde(default)]
    pub num: u64,
}

/// Side of an order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Bid,
    Ask,
}

impl PriceType {
    pub fn title(&self) -> &'static str {
        match self {
            PriceType::Bid => "BID",
            PriceType::Ask => "ASK",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Order book for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: String,
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    pub fn levels(&self, side: PriceType) -> &[PriceLevel] {
        match side {
            PriceType::Bid => &self.bids,
            PriceType::Ask => &self.asks,
        }
    }

    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.iter().max_by(|a, b| a.px.total_cmp(&b.px))
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.iter().min_by(|a, b| a.px.total_cmp(&b.px))
    }

    /// Best ask minus best bid
    pub fn spread(&self) -> Option<f64> {
        Some(self.best_ask()?.px - self.best_bid()?.px)
    }
}

/// Direction of a price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Reads the direction off a formatted change string
    pub fn from_change_str(change: &str) -> Self {
        if change.contains('-') {
            Trend::Down
        } else {
            Trend::Up
        }
    }
}

/// Formats a price as dollars with thousands separators, e.g. `$50,000.00`
pub fn format_price(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Formats a percentage change with an explicit sign, e.g. `+1.25%`
pub fn format_percentage_change(percent: f64) -> String {
    format!("{:+.2}%", percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_decodes_exchange_shape() {
        let json = r#"{"symbol":"BTC-USD","price_24h":40000.0,"volume_24h":12.5,"last_trade_price":50000.0}"#;
        let ticker: Ticker = serde_json::from_str(json).unwrap();

        assert_eq!(ticker.asset(), Some(Asset::BTC));
        assert_eq!(ticker.percentage_change_24h(), Some(25.0));
        assert_eq!(ticker.price_string(), "$50,000.00");
        assert_eq!(ticker.change_string(), "+25.00%");
    }

    #[test]
    fn test_ticker_without_reference_price() {
        let ticker = Ticker {
            symbol: "NEW-USD".into(),
            price_24h: 0.0,
            volume_24h: 0.0,
            last_trade_price: 1.0,
        };
        assert_eq!(ticker.percentage_change_24h(), None);
        assert_eq!(ticker.change_string(), "--");
        assert_eq!(ticker.asset(), None);
    }

    #[test]
    fn test_order_book_sides() {
        let json = r#"{"symbol":"ETH-USD","bids":[{"px":1999.5,"qty":2.0,"num":3},{"px":2000.0,"qty":1.0,"num":1}],"asks":[{"px":2001.0,"qty":0.5,"num":1}]}"#;
        let book: OrderBook = serde_json::from_str(json).unwrap();

        assert_eq!(book.levels(PriceType::Bid).len(), 2);
        assert_eq!(book.levels(PriceType::Ask).len(), 1);
        assert_eq!(book.best_bid().unwrap().px, 2000.0);
        assert_eq!(book.spread(), Some(1.0));
    }

    #[test]
    fn test_order_book_missing_side() {
        let book: OrderBook = serde_json::from_str(r#"{"symbol":"ETH-USD","asks":[]}"#).unwrap();
        assert!(book.bids.is_empty());
        assert_eq!(book.spread(), None);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.5), "$0.50");
        assert_eq!(format_price(999.999), "$1,000.00");
        assert_eq!(format_price(1234567.891), "$1,234,567.89");
        assert_eq!(format_price(-42.0), "-$42.00");
    }

    #[test]
    fn test_trend_follows_sign() {
        assert_eq!(Trend::from_change_str(&format_percentage_change(-0.42)), Trend::Down);
        assert_eq!(Trend::from_change_str(&format_percentage_change(3.1)), Trend::Up);
        assert_eq!(format_percentage_change(-0.42), "-0.42%");
    }

    #[test]
    fn test_asset_lookup() {
        assert_eq!(Asset::from_symbol("eth"), Some(Asset::ETH));
        assert_eq!(Asset::BTC.market_symbol("USD"), "BTC-USD");
        assert_eq!(Asset::from_symbol("DOGE"), None);
    }
}
