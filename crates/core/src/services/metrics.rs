//! The baseline & metrics resolver.
//!
//! Produces the single mode-aware P&L record every UI surface renders from,
//! so the dashboard, leaderboard, and member cards always agree on the same
//! number for the same mode.
//!
//! Baselines resolve through explicit prioritized fallback chains. Each tier
//! is its own small pure function evaluated top to bottom, which keeps the
//! tie-break order auditable and testable in isolation. Older data may lack
//! an explicit baseline field; the resolver must always degrade to the best
//! available reconstruction and never fail to produce a number.

use chrono::{DateTime, Utc};

use crate::models::group::Group;
use crate::models::holding::Holding;
use crate::models::member::Member;
use crate::models::metrics::{GroupModeMetrics, MemberModeMetrics, MetricsMode};
use crate::models::season::Season;
use crate::models::snapshot::{PortfolioSnapshot, SnapshotScope};
use crate::services::valuation;

// ── All-time baseline chain ─────────────────────────────────────────

/// Tier 1: the baseline fixed when the member joined.
fn explicit_initial_value(member: &Member) -> Option<f64> {
    member.initial_value.filter(|v| v.is_finite())
}

/// Tier 2: the legacy field written by older group files.
fn legacy_initial_capital(member: &Member) -> Option<f64> {
    member.initial_capital.filter(|v| v.is_finite())
}

/// Tier 3: the earliest recorded snapshot for this member.
fn earliest_snapshot_value(member: &Member, history: &[PortfolioSnapshot]) -> Option<f64> {
    history
        .iter()
        .filter(|s| s.scope == SnapshotScope::Member && s.entity_id == member.id)
        .min_by_key(|s| s.timestamp)
        .map(|s| s.total_value)
}

/// Tier 4: reconstruct from current state: cash plus summed cost basis.
fn reconstructed_baseline(member: &Member, holdings: &[Holding]) -> f64 {
    let metrics = valuation::member_metrics(member, holdings);
    metrics.cash_balance + metrics.total_cost_basis
}

/// Resolve the all-time comparison baseline for a member.
#[must_use]
pub fn all_time_baseline(
    member: &Member,
    holdings: &[Holding],
    history: &[PortfolioSnapshot],
) -> f64 {
    explicit_initial_value(member)
        .or_else(|| legacy_initial_capital(member))
        .or_else(|| earliest_snapshot_value(member, history))
        .unwrap_or_else(|| reconstructed_baseline(member, holdings))
}

// ── Season baseline chain ───────────────────────────────────────────

/// Tier 1: the value captured atomically at season start.
fn season_recorded_baseline(member: &Member, season: &Season) -> Option<f64> {
    season.baselines.get(member.id)
}

/// Tier 2: the member snapshot closest in time to the season's start.
/// Members who joined mid-season are absent from the recorded map, but
/// usually have history near the start to anchor against.
fn nearest_snapshot_to_start(
    member: &Member,
    season: &Season,
    history: &[PortfolioSnapshot],
) -> Option<f64> {
    history
        .iter()
        .filter(|s| s.scope == SnapshotScope::Member && s.entity_id == member.id)
        .min_by_key(|s| {
            (s.timestamp - season.started_at)
                .num_milliseconds()
                .abs()
        })
        .map(|s| s.total_value)
}

/// Resolve the season comparison baseline for a member.
///
/// Falls back to the member's current value when neither the recorded map
/// nor history can anchor the season start, the degenerate zero-P&L case.
#[must_use]
pub fn season_baseline(
    member: &Member,
    holdings: &[Holding],
    season: &Season,
    history: &[PortfolioSnapshot],
) -> f64 {
    season_recorded_baseline(member, season)
        .or_else(|| nearest_snapshot_to_start(member, season, history))
        .unwrap_or_else(|| valuation::member_metrics(member, holdings).portfolio_value)
}

// ── Unified metrics ─────────────────────────────────────────────────

fn guarded_pct(pl_abs: f64, baseline: f64) -> f64 {
    if baseline > 0.0 {
        pl_abs / baseline * 100.0
    } else {
        0.0
    }
}

/// The unified metrics contract: always returns a fully populated record,
/// never fails.
///
/// In season mode with no season available the baseline equals the current
/// value, yielding zero P&L.
#[must_use]
pub fn metrics_for_mode(
    member: &Member,
    holdings: &[Holding],
    season: Option<&Season>,
    mode: MetricsMode,
    history: &[PortfolioSnapshot],
) -> MemberModeMetrics {
    let portfolio_value = valuation::member_metrics(member, holdings).portfolio_value;

    let baseline = match mode {
        MetricsMode::AllTime => all_time_baseline(member, holdings, history),
        MetricsMode::Season => match season {
            Some(season) => season_baseline(member, holdings, season, history),
            None => portfolio_value,
        },
    };

    let pl_abs = portfolio_value - baseline;
    MemberModeMetrics {
        member_id: member.id,
        mode,
        portfolio_value,
        baseline,
        pl_abs,
        pl_pct: guarded_pct(pl_abs, baseline),
    }
}

/// Group-scope analog of [`metrics_for_mode`].
///
/// Each member's current value and baseline are summed independently and the
/// group P&L is derived from the summed figures. Averaging per-member
/// percentages would mix ratios with different denominators.
#[must_use]
pub fn group_metrics_for_mode(
    group: &Group,
    season: Option<&Season>,
    mode: MetricsMode,
) -> GroupModeMetrics {
    let mut portfolio_value = 0.0;
    let mut baseline = 0.0;
    let mut total_cash = 0.0;

    for member in &group.members {
        let metrics = metrics_for_mode(member, &group.holdings, season, mode, &group.history);
        portfolio_value += metrics.portfolio_value;
        baseline += metrics.baseline;
        total_cash += valuation::member_metrics(member, &group.holdings).cash_balance;
    }

    let pl_abs = portfolio_value - baseline;
    GroupModeMetrics {
        mode,
        portfolio_value,
        baseline,
        pl_abs,
        pl_pct: guarded_pct(pl_abs, baseline),
        member_count: group.members.len(),
        total_cash,
    }
}
