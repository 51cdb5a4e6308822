// ═══════════════════════════════════════════════════════════════════
// Valuation Engine Tests — position, member, and group metrics
// ═══════════════════════════════════════════════════════════════════

use uuid::Uuid;

use groupfolio_core::models::group::Group;
use groupfolio_core::models::holding::{AssetClass, Holding};
use groupfolio_core::models::member::Member;
use groupfolio_core::services::valuation::{group_metrics, member_metrics, position_metrics};

fn holding(owner: Uuid, symbol: &str, qty: f64, avg: f64, current: f64) -> Holding {
    let mut h = Holding::new(owner, symbol, symbol, AssetClass::Stock, qty, avg);
    h.current_price = current;
    h
}

// ── Position metrics ────────────────────────────────────────────────

#[test]
fn position_identity_value_minus_basis_is_pl() {
    let cases = [
        (5.0, 100.0, 120.0),
        (0.25, 40000.0, 38000.0),
        (10.0, 50.0, 50.0),
        (3.0, 0.0, 10.0),
    ];
    for (qty, avg, current) in cases {
        let p = position_metrics(&holding(Uuid::new_v4(), "X", qty, avg, current));
        assert_eq!(p.current_value - p.cost_basis, p.unrealized_pl);
        assert_eq!(p.current_value, qty * current);
        assert_eq!(p.cost_basis, qty * avg);
    }
}

#[test]
fn position_pct_zero_when_cost_basis_zero() {
    let p = position_metrics(&holding(Uuid::new_v4(), "FREE", 10.0, 0.0, 5.0));
    assert_eq!(p.cost_basis, 0.0);
    assert_eq!(p.unrealized_pl_pct, 0.0);
    assert_eq!(p.unrealized_pl, 50.0);
}

#[test]
fn position_pct_computed_when_basis_positive() {
    let p = position_metrics(&holding(Uuid::new_v4(), "UP", 5.0, 100.0, 120.0));
    assert!((p.unrealized_pl_pct - 20.0).abs() < 1e-9);
}

#[test]
fn position_sanitizes_malformed_input_to_zero() {
    let mut bad = holding(Uuid::new_v4(), "NAN", 5.0, 100.0, 120.0);
    bad.current_price = f64::NAN;
    let p = position_metrics(&bad);
    assert_eq!(p.current_value, 0.0);

    let mut neg = holding(Uuid::new_v4(), "NEG", -3.0, 100.0, 120.0);
    neg.quantity = -3.0;
    let p = position_metrics(&neg);
    assert_eq!(p.current_value, 0.0);
    assert_eq!(p.cost_basis, 0.0);
    assert_eq!(p.unrealized_pl_pct, 0.0);

    let mut inf = holding(Uuid::new_v4(), "INF", 1.0, f64::INFINITY, 10.0);
    inf.avg_buy_price = f64::INFINITY;
    let p = position_metrics(&inf);
    assert_eq!(p.cost_basis, 0.0);
}

// ── Member metrics ──────────────────────────────────────────────────

#[test]
fn member_metrics_filters_to_own_holdings() {
    let ala = Member::new("Ala", 0, 500.0);
    let bo = Member::new("Bo", 90, 500.0);
    let holdings = vec![
        holding(ala.id, "AAPL", 2.0, 100.0, 110.0),
        holding(bo.id, "MSFT", 1.0, 300.0, 310.0),
    ];

    let m = member_metrics(&ala, &holdings);
    assert_eq!(m.invested_value, 220.0);
    assert_eq!(m.total_cost_basis, 200.0);
    assert_eq!(m.portfolio_value, 720.0);
    assert_eq!(m.unrealized_pl, 20.0);
    assert!((m.unrealized_pl_pct - 10.0).abs() < 1e-9);
}

#[test]
fn member_with_no_holdings_has_zero_pct() {
    let cashed_out = Member::new("Idle", 0, 1234.0);
    let m = member_metrics(&cashed_out, &[]);
    assert_eq!(m.invested_value, 0.0);
    assert_eq!(m.total_cost_basis, 0.0);
    assert_eq!(m.portfolio_value, 1234.0);
    assert_eq!(m.unrealized_pl_pct, 0.0);
}

#[test]
fn member_negative_cash_is_preserved() {
    // Negative balances can appear transiently; valuation reports them as-is.
    let mut member = Member::new("Debt", 0, 100.0);
    member.cash_balance = -50.0;
    let m = member_metrics(&member, &[]);
    assert_eq!(m.portfolio_value, -50.0);
}

// ── Group metrics ───────────────────────────────────────────────────

#[test]
fn group_value_is_sum_of_member_values() {
    let mut group = Group::new("Crew");
    let ala = Member::new("Ala", 0, 1000.0);
    let bo = Member::new("Bo", 120, 250.0);
    let cy = Member::new("Cy", 240, 0.0);
    let ids = [ala.id, bo.id, cy.id];
    group.members.extend([ala, bo, cy]);
    group.holdings.push(holding(ids[0], "AAPL", 2.0, 100.0, 110.0));
    group.holdings.push(holding(ids[1], "BTC", 0.1, 30000.0, 40000.0));
    group.holdings.push(holding(ids[2], "VWCE", 5.0, 100.0, 90.0));

    let totals = group_metrics(&group);
    let summed: f64 = group
        .members
        .iter()
        .map(|m| member_metrics(m, &group.holdings).portfolio_value)
        .sum();
    assert_eq!(totals.portfolio_value, summed);
    assert_eq!(totals.total_cash, 1250.0);
    assert_eq!(totals.invested_value, 220.0 + 4000.0 + 450.0);
    assert_eq!(totals.total_cost_basis, 200.0 + 3000.0 + 500.0);
}

#[test]
fn empty_group_is_all_zero() {
    let totals = group_metrics(&Group::new("Empty"));
    assert_eq!(totals.portfolio_value, 0.0);
    assert_eq!(totals.total_cash, 0.0);
    assert_eq!(totals.invested_value, 0.0);
    assert_eq!(totals.total_cost_basis, 0.0);
}
