use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The category of a held security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Equities (AAPL, MSFT, ...)
    Stock,
    /// Cryptocurrencies (BTC, ETH, ...)
    Crypto,
    /// Exchange-traded funds
    Etf,
    /// Anything else (bonds, commodities, collectibles)
    Other,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::Stock => write!(f, "Stock"),
            AssetClass::Crypto => write!(f, "Crypto"),
            AssetClass::Etf => write!(f, "ETF"),
            AssetClass::Other => write!(f, "Other"),
        }
    }
}

/// A position in one security held by one member.
///
/// `quantity × avg_buy_price` is the position's cost basis;
/// `quantity × current_price` is its mark-to-market value.
///
/// Lifecycle: created on a buy (or member onboarding), mutated on price
/// refresh, and removed entirely on a sell; there is no partial-sell
/// support in this model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique identifier
    pub id: Uuid,

    /// The member who owns this position
    pub member_id: Uuid,

    /// Ticker symbol, uppercased and trimmed (e.g., "AAPL", "BTC")
    pub symbol: String,

    /// Human-readable name (e.g., "Apple Inc.")
    pub name: String,

    /// Security category
    pub asset_class: AssetClass,

    /// Units held (non-negative)
    pub quantity: f64,

    /// Average purchase price per unit (cost basis per unit)
    pub avg_buy_price: f64,

    /// Latest known market price per unit
    pub current_price: f64,

    /// When the price was last refreshed, if ever
    #[serde(default)]
    pub last_price_update: Option<DateTime<Utc>>,

    /// Optional lookup key for the external quote feed
    /// (when the feed's identifier differs from the display symbol)
    #[serde(default)]
    pub quote_key: Option<String>,
}

impl Holding {
    pub fn new(
        member_id: Uuid,
        symbol: impl Into<String>,
        name: impl Into<String>,
        asset_class: AssetClass,
        quantity: f64,
        avg_buy_price: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            symbol: symbol.into().trim().to_uppercase(),
            name: name.into(),
            asset_class,
            quantity,
            avg_buy_price,
            current_price: avg_buy_price,
            last_price_update: None,
            quote_key: None,
        }
    }

    /// Attach an external quote-feed key.
    #[must_use]
    pub fn with_quote_key(mut self, key: impl Into<String>) -> Self {
        self.quote_key = Some(key.into());
        self
    }
}
