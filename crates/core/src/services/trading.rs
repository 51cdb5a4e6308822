//! The trading ledger: cash movements, buys, sells, price marks, and
//! member lifecycle.
//!
//! Every operation validates first and mutates second; a failed operation
//! leaves the group untouched. Each successful mutation appends activity
//! and records snapshots for the affected member plus the group rollup.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::activity::{ActivityEvent, ActivityKind};
use crate::models::group::Group;
use crate::models::holding::{AssetClass, Holding};
use crate::models::member::Member;
use crate::services::history::HistoryService;

/// How over-withdrawal is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawPolicy {
    /// Floor the balance at zero and report how much was actually taken.
    Clamp,
    /// Reject the withdrawal outright when funds are insufficient.
    Strict,
}

/// What a withdrawal actually did. Clamping is a deliberate policy, and the
/// caller gets to see it happened instead of losing the information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WithdrawOutcome {
    /// The full requested amount was withdrawn.
    Withdrawn(f64),
    /// The request exceeded the balance; only `withdrawn` was taken.
    Clamped { requested: f64, withdrawn: f64 },
}

impl WithdrawOutcome {
    /// The amount that actually left the balance.
    #[must_use]
    pub fn amount(&self) -> f64 {
        match self {
            WithdrawOutcome::Withdrawn(amount) => *amount,
            WithdrawOutcome::Clamped { withdrawn, .. } => *withdrawn,
        }
    }
}

/// A position seeded at onboarding time, before the owning member exists.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPosition {
    pub symbol: String,
    pub name: String,
    pub asset_class: AssetClass,
    pub quantity: f64,
    pub avg_buy_price: f64,
}

/// Applies ledger mutations to a group.
pub struct TradingService {
    history: HistoryService,
}

impl TradingService {
    pub fn new() -> Self {
        Self {
            history: HistoryService::new(),
        }
    }

    // ── Member lifecycle ────────────────────────────────────────────

    /// Create a member from a completed onboarding: starting cash plus any
    /// seeded positions. The all-time baseline (`initial_value`) is fixed
    /// here as starting cash + seeded cost basis.
    pub fn add_member(
        &self,
        group: &mut Group,
        name: impl Into<String>,
        color_hue: u16,
        starting_cash: f64,
        seeds: &[SeedPosition],
        at: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::ValidationError("Member name must not be empty".into()));
        }
        if !starting_cash.is_finite() || starting_cash < 0.0 {
            return Err(CoreError::ValidationError(
                "Starting cash must be a non-negative number".into(),
            ));
        }
        for seed in seeds {
            if seed.quantity <= 0.0 || !seed.quantity.is_finite() {
                return Err(CoreError::ValidationError(format!(
                    "Seeded quantity for {} must be positive",
                    seed.symbol
                )));
            }
            if seed.avg_buy_price < 0.0 || !seed.avg_buy_price.is_finite() {
                return Err(CoreError::ValidationError(format!(
                    "Seeded buy price for {} must be non-negative",
                    seed.symbol
                )));
            }
        }

        let mut member = Member::new(name.clone(), color_hue, starting_cash);
        member.created_at = at;
        let seeded_basis: f64 = seeds.iter().map(|s| s.quantity * s.avg_buy_price).sum();
        member.initial_value = Some(starting_cash + seeded_basis);
        let member_id = member.id;

        for seed in seeds {
            group.holdings.push(Holding::new(
                member_id,
                seed.symbol.clone(),
                seed.name.clone(),
                seed.asset_class,
                seed.quantity,
                seed.avg_buy_price,
            ));
        }
        group.members.push(member);

        group.activity.push(ActivityEvent::new(
            ActivityKind::Join,
            Some(member_id),
            format!("{name} joined"),
            format!("Started with ${starting_cash:.2} cash and {} seeded positions", seeds.len()),
            at,
        ));
        self.history.record_mutation_snapshot(group, &[member_id], at);

        Ok(member_id)
    }

    /// Remove a member and cascade-remove their holdings. Activity and
    /// snapshot history are retained.
    pub fn remove_member(&self, group: &mut Group, member_id: Uuid) -> Result<(), CoreError> {
        if group.member(member_id).is_none() {
            return Err(CoreError::MemberNotFound(member_id.to_string()));
        }
        group.holdings.retain(|h| h.member_id != member_id);
        group.members.retain(|m| m.id != member_id);
        if group.leader_id == Some(member_id) {
            // Leadership falls back to the first-member convention.
            group.leader_id = None;
        }
        Ok(())
    }

    // ── Cash movements ──────────────────────────────────────────────

    /// Deposit cash. Adds to both the balance and the net-deposit total.
    pub fn deposit(
        &self,
        group: &mut Group,
        member_id: Uuid,
        amount: f64,
        at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        Self::validate_amount(amount)?;
        let member = group
            .member_mut(member_id)
            .ok_or_else(|| CoreError::MemberNotFound(member_id.to_string()))?;
        member.cash_balance += amount;
        member.net_deposits += amount;
        let name = member.name.clone();

        group.activity.push(
            ActivityEvent::new(
                ActivityKind::Deposit,
                Some(member_id),
                format!("{name} deposited"),
                format!("Added ${amount:.2} in cash"),
                at,
            )
            .with_amount(amount),
        );
        self.history.record_mutation_snapshot(group, &[member_id], at);
        Ok(())
    }

    /// Withdraw cash under the given policy.
    ///
    /// `Clamp` floors the balance at zero and reports the shortfall through
    /// [`WithdrawOutcome::Clamped`]; `Strict` rejects over-withdrawal and
    /// leaves the state untouched. Net deposits decrease by the amount
    /// actually withdrawn.
    pub fn withdraw(
        &self,
        group: &mut Group,
        member_id: Uuid,
        amount: f64,
        policy: WithdrawPolicy,
        at: DateTime<Utc>,
    ) -> Result<WithdrawOutcome, CoreError> {
        Self::validate_amount(amount)?;
        let member = group
            .member(member_id)
            .ok_or_else(|| CoreError::MemberNotFound(member_id.to_string()))?;
        let available = member.cash_balance;

        let outcome = if amount > available {
            match policy {
                WithdrawPolicy::Strict => {
                    return Err(CoreError::InsufficientFunds {
                        needed: amount,
                        available,
                    });
                }
                WithdrawPolicy::Clamp => WithdrawOutcome::Clamped {
                    requested: amount,
                    withdrawn: available.max(0.0),
                },
            }
        } else {
            WithdrawOutcome::Withdrawn(amount)
        };

        let withdrawn = outcome.amount();
        let member = group
            .member_mut(member_id)
            .ok_or_else(|| CoreError::MemberNotFound(member_id.to_string()))?;
        member.cash_balance -= withdrawn;
        member.net_deposits -= withdrawn;
        let name = member.name.clone();

        group.activity.push(
            ActivityEvent::new(
                ActivityKind::Withdraw,
                Some(member_id),
                format!("{name} withdrew"),
                format!("Took out ${withdrawn:.2} in cash"),
                at,
            )
            .with_amount(-withdrawn),
        );
        self.history.record_mutation_snapshot(group, &[member_id], at);
        Ok(outcome)
    }

    // ── Trades ──────────────────────────────────────────────────────

    /// Buy a security. Rejected with `InsufficientFunds` when the cost
    /// exceeds the member's cash, with no state change.
    ///
    /// Buying a symbol the member already holds merges into the existing
    /// position, blending the average buy price.
    #[allow(clippy::too_many_arguments)]
    pub fn buy(
        &self,
        group: &mut Group,
        member_id: Uuid,
        symbol: &str,
        name: &str,
        asset_class: AssetClass,
        quantity: f64,
        unit_price: f64,
        at: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        if quantity <= 0.0 || !quantity.is_finite() {
            return Err(CoreError::ValidationError("Buy quantity must be positive".into()));
        }
        if unit_price <= 0.0 || !unit_price.is_finite() {
            return Err(CoreError::ValidationError("Buy price must be positive".into()));
        }
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::ValidationError("Symbol must not be empty".into()));
        }

        let cost = quantity * unit_price;
        let member = group
            .member(member_id)
            .ok_or_else(|| CoreError::MemberNotFound(member_id.to_string()))?;
        if cost > member.cash_balance {
            return Err(CoreError::InsufficientFunds {
                needed: cost,
                available: member.cash_balance,
            });
        }
        let member_name = member.name.clone();

        let holding_id = match group
            .holdings
            .iter_mut()
            .find(|h| h.member_id == member_id && h.symbol == symbol)
        {
            Some(existing) => {
                // Average-cost blend across the old and new lots.
                let old_basis = existing.quantity * existing.avg_buy_price;
                let new_quantity = existing.quantity + quantity;
                existing.avg_buy_price = (old_basis + cost) / new_quantity;
                existing.quantity = new_quantity;
                existing.current_price = unit_price;
                existing.last_price_update = Some(at);
                existing.id
            }
            None => {
                let mut holding =
                    Holding::new(member_id, symbol.clone(), name, asset_class, quantity, unit_price);
                holding.last_price_update = Some(at);
                let id = holding.id;
                group.holdings.push(holding);
                id
            }
        };

        if let Some(member) = group.member_mut(member_id) {
            member.cash_balance -= cost;
        }

        group.activity.push(
            ActivityEvent::new(
                ActivityKind::Buy,
                Some(member_id),
                format!("{member_name} bought {symbol}"),
                format!("{quantity} × ${unit_price:.2} = ${cost:.2}"),
                at,
            )
            .with_symbol(symbol),
        );
        self.history.record_mutation_snapshot(group, &[member_id], at);

        Ok(holding_id)
    }

    /// Sell a position in full at its current price.
    ///
    /// Proceeds are credited to cash, the realized P&L (proceeds − cost
    /// basis) accumulates on the member, and the holding is removed
    /// atomically. Returns the realized P&L.
    pub fn sell(
        &self,
        group: &mut Group,
        holding_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<f64, CoreError> {
        let holding = group
            .holding(holding_id)
            .ok_or_else(|| CoreError::HoldingNotFound(holding_id.to_string()))?
            .clone();
        let member_id = holding.member_id;
        if group.member(member_id).is_none() {
            return Err(CoreError::MemberNotFound(member_id.to_string()));
        }

        let proceeds = holding.quantity * holding.current_price;
        let cost_basis = holding.quantity * holding.avg_buy_price;
        let realized = proceeds - cost_basis;

        group.holdings.retain(|h| h.id != holding_id);
        let member_name = match group.member_mut(member_id) {
            Some(member) => {
                member.cash_balance += proceeds;
                member.total_realized_pnl += realized;
                member.name.clone()
            }
            None => String::new(),
        };

        group.activity.push(
            ActivityEvent::new(
                ActivityKind::Sell,
                Some(member_id),
                format!("{member_name} sold {}", holding.symbol),
                format!(
                    "{} × ${:.2} = ${proceeds:.2} ({}${:.2})",
                    holding.quantity,
                    holding.current_price,
                    if realized >= 0.0 { "+" } else { "-" },
                    realized.abs()
                ),
                at,
            )
            .with_symbol(holding.symbol.clone())
            .with_amount(realized),
        );
        self.history.record_mutation_snapshot(group, &[member_id], at);

        Ok(realized)
    }

    /// Mark a position to a new market price.
    pub fn update_price(
        &self,
        group: &mut Group,
        holding_id: Uuid,
        new_price: f64,
        at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if new_price < 0.0 || !new_price.is_finite() {
            return Err(CoreError::ValidationError("Price must be a non-negative number".into()));
        }
        let holding = group
            .holdings
            .iter_mut()
            .find(|h| h.id == holding_id)
            .ok_or_else(|| CoreError::HoldingNotFound(holding_id.to_string()))?;
        holding.current_price = new_price;
        holding.last_price_update = Some(at);
        let member_id = holding.member_id;
        let symbol = holding.symbol.clone();

        group.activity.push(
            ActivityEvent::new(
                ActivityKind::Update,
                Some(member_id),
                format!("{symbol} price updated"),
                format!("Marked to ${new_price:.2}"),
                at,
            )
            .with_symbol(symbol),
        );
        self.history.record_mutation_snapshot(group, &[member_id], at);
        Ok(())
    }

    // ── Notes & maintenance ─────────────────────────────────────────

    /// Append a free-form note to the activity log.
    pub fn add_note(
        &self,
        group: &mut Group,
        member_id: Option<Uuid>,
        text: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if let Some(id) = member_id {
            if group.member(id).is_none() {
                return Err(CoreError::MemberNotFound(id.to_string()));
            }
        }
        group.activity.push(ActivityEvent::new(
            ActivityKind::Note,
            member_id,
            "Note",
            text.into(),
            at,
        ));
        Ok(())
    }

    /// Explicit bulk clear, the only way activity entries ever go away.
    pub fn clear_activity(&self, group: &mut Group) -> usize {
        let cleared = group.activity.len();
        group.activity.clear();
        cleared
    }

    fn validate_amount(amount: f64) -> Result<(), CoreError> {
        if amount <= 0.0 || !amount.is_finite() {
            return Err(CoreError::ValidationError("Amount must be positive".into()));
        }
        Ok(())
    }
}

impl Default for TradingService {
    fn default() -> Self {
        Self::new()
    }
}
