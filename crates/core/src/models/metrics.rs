use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which baseline a P&L figure is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricsMode {
    /// Against the member's all-time starting capital
    AllTime,
    /// Against the active season's starting values
    Season,
}

/// Valuation of a single position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionMetrics {
    /// quantity × current price
    pub current_value: f64,

    /// quantity × average buy price
    pub cost_basis: f64,

    /// current_value − cost_basis
    pub unrealized_pl: f64,

    /// unrealized_pl / cost_basis × 100, or 0 when cost basis is 0
    pub unrealized_pl_pct: f64,
}

/// Valuation of one member's whole portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberMetrics {
    /// Mark-to-market value of all positions
    pub invested_value: f64,

    /// Summed cost basis of all positions
    pub total_cost_basis: f64,

    /// Uninvested cash
    pub cash_balance: f64,

    /// cash_balance + invested_value
    pub portfolio_value: f64,

    /// invested_value − total_cost_basis
    pub unrealized_pl: f64,

    /// Guarded percentage (0 when cost basis is 0)
    pub unrealized_pl_pct: f64,
}

/// Group-wide valuation totals, summed across members.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupTotals {
    /// Sum of member portfolio values (cash + invested)
    pub portfolio_value: f64,

    /// Sum of member cost bases
    pub total_cost_basis: f64,

    /// Sum of member cash balances
    pub total_cash: f64,

    /// Sum of member invested values
    pub invested_value: f64,
}

/// The unified mode-aware P&L contract for one member.
///
/// Every UI surface (dashboard, leaderboard, member card) renders from this
/// record, so all of them agree on the same number for the same mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberModeMetrics {
    /// The member this record describes
    pub member_id: Uuid,

    /// Baseline mode the P&L is measured against
    pub mode: MetricsMode,

    /// Current portfolio value (cash + holdings)
    pub portfolio_value: f64,

    /// The resolved comparison baseline
    pub baseline: f64,

    /// portfolio_value − baseline
    pub pl_abs: f64,

    /// pl_abs / baseline × 100 when baseline > 0, else 0
    pub pl_pct: f64,
}

/// Group-scope analog of [`MemberModeMetrics`].
///
/// Values and baselines are summed per member before the P&L is derived;
/// never an average of per-member percentages, whose denominators differ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupModeMetrics {
    /// Baseline mode the P&L is measured against
    pub mode: MetricsMode,

    /// Sum of member portfolio values
    pub portfolio_value: f64,

    /// Sum of member baselines
    pub baseline: f64,

    /// portfolio_value − baseline
    pub pl_abs: f64,

    /// pl_abs / baseline × 100 when baseline > 0, else 0
    pub pl_pct: f64,

    /// How many members were aggregated
    pub member_count: usize,

    /// Sum of member cash balances
    pub total_cash: f64,
}
