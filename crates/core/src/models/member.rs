use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One investor within a group.
///
/// Mark-to-market value is always derived from current holdings; only
/// realized P&L is accumulated incrementally here, so past sale outcomes
/// never need recomputing while unrealized P&L still tracks live prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Color hint for UI rendering (hue, 0–360)
    pub color_hue: u16,

    /// Uninvested funds
    pub cash_balance: f64,

    /// Sum of realized gains/losses from all past sells
    pub total_realized_pnl: f64,

    /// Lifetime deposits minus withdrawals, the contribution baseline
    pub net_deposits: f64,

    /// Value fixed at join time: starting cash plus the cost basis of any
    /// seeded holdings. Preferred all-time baseline when present.
    #[serde(default)]
    pub initial_value: Option<f64>,

    /// Legacy baseline field kept for data imported from older groups.
    /// Consulted only when `initial_value` is absent.
    #[serde(default)]
    pub initial_capital: Option<f64>,

    /// When this member joined the group
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(name: impl Into<String>, color_hue: u16, starting_cash: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color_hue: color_hue % 361,
            cash_balance: starting_cash,
            total_realized_pnl: 0.0,
            net_deposits: starting_cash,
            initial_value: Some(starting_cash),
            initial_capital: None,
            created_at: Utc::now(),
        }
    }
}
