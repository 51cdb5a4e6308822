//! The valuation engine: pure, stateless mark-to-market computation.
//!
//! No I/O and no failure modes: malformed numeric input (NaN, infinities,
//! negative quantities or prices) is sanitized to zero rather than rejected,
//! so a valuation can always be produced from whatever state exists.

use crate::models::group::Group;
use crate::models::holding::Holding;
use crate::models::member::Member;
use crate::models::metrics::{GroupTotals, MemberMetrics, PositionMetrics};

/// Clamp a raw stored number to something valuation math can trust.
fn sanitized(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Value a single position at its current market price.
#[must_use]
pub fn position_metrics(holding: &Holding) -> PositionMetrics {
    let quantity = sanitized(holding.quantity);
    let current_value = quantity * sanitized(holding.current_price);
    let cost_basis = quantity * sanitized(holding.avg_buy_price);
    let unrealized_pl = current_value - cost_basis;
    let unrealized_pl_pct = if cost_basis == 0.0 {
        0.0
    } else {
        unrealized_pl / cost_basis * 100.0
    };

    PositionMetrics {
        current_value,
        cost_basis,
        unrealized_pl,
        unrealized_pl_pct,
    }
}

/// Value one member's whole portfolio: cash plus every position they own.
///
/// `all_holdings` may be the group's full holding list; positions owned by
/// other members are filtered out here.
#[must_use]
pub fn member_metrics(member: &Member, all_holdings: &[Holding]) -> MemberMetrics {
    let mut invested_value = 0.0;
    let mut total_cost_basis = 0.0;

    for holding in all_holdings.iter().filter(|h| h.member_id == member.id) {
        let position = position_metrics(holding);
        invested_value += position.current_value;
        total_cost_basis += position.cost_basis;
    }

    let cash_balance = if member.cash_balance.is_finite() {
        member.cash_balance
    } else {
        0.0
    };
    let unrealized_pl = invested_value - total_cost_basis;
    let unrealized_pl_pct = if total_cost_basis == 0.0 {
        0.0
    } else {
        unrealized_pl / total_cost_basis * 100.0
    };

    MemberMetrics {
        invested_value,
        total_cost_basis,
        cash_balance,
        portfolio_value: cash_balance + invested_value,
        unrealized_pl,
        unrealized_pl_pct,
    }
}

/// Aggregate valuation across all members of a group.
#[must_use]
pub fn group_metrics(group: &Group) -> GroupTotals {
    let mut totals = GroupTotals {
        portfolio_value: 0.0,
        total_cost_basis: 0.0,
        total_cash: 0.0,
        invested_value: 0.0,
    };

    for member in &group.members {
        let metrics = member_metrics(member, &group.holdings);
        totals.portfolio_value += metrics.portfolio_value;
        totals.total_cost_basis += metrics.total_cost_basis;
        totals.total_cash += metrics.cash_balance;
        totals.invested_value += metrics.invested_value;
    }

    totals
}
