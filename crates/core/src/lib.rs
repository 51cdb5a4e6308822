pub mod errors;
pub mod models;
pub mod quotes;
pub mod services;
pub mod storage;

use chrono::Utc;
use uuid::Uuid;

use errors::CoreError;
use models::{
    activity::{ActivityEvent, ActivityKind, ActivitySortOrder},
    group::Group,
    holding::{AssetClass, Holding},
    member::Member,
    metrics::{
        GroupModeMetrics, GroupTotals, MemberMetrics, MemberModeMetrics, MetricsMode,
        PositionMetrics,
    },
    season::Season,
    snapshot::{PortfolioSnapshot, SnapshotPolicy, SnapshotScope},
};
use quotes::QuoteFeed;
use services::{
    history::{ChartRange, HistoryService},
    metrics as metrics_resolver,
    season::SeasonService,
    trading::{SeedPosition, TradingService, WithdrawOutcome, WithdrawPolicy},
    valuation,
};
use storage::manager::StorageManager;
use storage::repository::GroupRepository;

/// Main entry point for the Groupfolio core library.
/// Holds one group's state and all services needed to operate on it.
#[must_use]
pub struct GroupTracker {
    group: Group,
    trading_service: TradingService,
    history_service: HistoryService,
    season_service: SeasonService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for GroupTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupTracker")
            .field("group", &self.group.name)
            .field("members", &self.group.members.len())
            .field("holdings", &self.group.holdings.len())
            .field("snapshots", &self.group.history.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl GroupTracker {
    /// Create a brand new group with default settings.
    pub fn create_new(name: impl Into<String>) -> Self {
        let mut group = Group::new(name);
        group.activity.push(ActivityEvent::new(
            ActivityKind::GroupCreated,
            None,
            format!("{} created", group.name),
            "A new group portfolio begins",
            group.created_at,
        ));
        Self::build(group)
    }

    /// Create a group with an explicit snapshot policy.
    pub fn create_with_policy(name: impl Into<String>, policy: SnapshotPolicy) -> Self {
        let mut tracker = Self::create_new(name);
        tracker.group.settings.snapshot_policy = policy;
        tracker
    }

    /// Load an existing group from encrypted bytes (password required).
    /// Use this for WASM / Tauri where the frontend handles file I/O.
    pub fn load_from_bytes(encrypted: &[u8], password: &str) -> Result<Self, CoreError> {
        let group = StorageManager::load_from_bytes(encrypted, password)?;
        Ok(Self::build(group))
    }

    /// Save the current group to encrypted bytes.
    /// Returns raw bytes that the frontend can write to a file.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.group, password)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load from an encrypted file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str, password: &str) -> Result<Self, CoreError> {
        let group = StorageManager::load_from_file(path, password)?;
        Ok(Self::build(group))
    }

    /// Save to an encrypted file on disk (native only, not WASM).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: &str, password: &str) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.group, path, password)?;
        self.dirty = false;
        Ok(())
    }

    /// Load through an injected repository.
    pub fn load_with(repo: &dyn GroupRepository, group_id: Uuid) -> Result<Self, CoreError> {
        Ok(Self::build(repo.load(group_id)?))
    }

    /// Save through an injected repository.
    /// Clears the unsaved-changes flag on success.
    pub fn save_with(&mut self, repo: &mut dyn GroupRepository) -> Result<(), CoreError> {
        repo.save(&self.group)?;
        self.dirty = false;
        Ok(())
    }

    // ── Group & Members ─────────────────────────────────────────────

    /// Read-only view of the whole group state.
    #[must_use]
    pub fn group(&self) -> &Group {
        &self.group
    }

    #[must_use]
    pub fn group_id(&self) -> Uuid {
        self.group.id
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.group.members
    }

    #[must_use]
    pub fn member(&self, member_id: Uuid) -> Option<&Member> {
        self.group.member(member_id)
    }

    /// Onboard a new member with starting cash and optional seeded
    /// positions. Fixes the member's all-time baseline, appends a Join
    /// activity, and records their first snapshot.
    pub fn add_member(
        &mut self,
        name: impl Into<String>,
        color_hue: u16,
        starting_cash: f64,
        seeds: &[SeedPosition],
    ) -> Result<Uuid, CoreError> {
        let id = self.trading_service.add_member(
            &mut self.group,
            name,
            color_hue,
            starting_cash,
            seeds,
            Utc::now(),
        )?;
        self.dirty = true;
        Ok(id)
    }

    /// Remove a member, cascading holding removal. History and activity
    /// entries are retained.
    pub fn remove_member(&mut self, member_id: Uuid) -> Result<(), CoreError> {
        self.trading_service.remove_member(&mut self.group, member_id)?;
        self.dirty = true;
        Ok(())
    }

    // ── Cash & Trades ───────────────────────────────────────────────

    /// Deposit cash for a member.
    pub fn deposit(&mut self, member_id: Uuid, amount: f64) -> Result<(), CoreError> {
        self.trading_service
            .deposit(&mut self.group, member_id, amount, Utc::now())?;
        self.dirty = true;
        Ok(())
    }

    /// Withdraw cash under the given policy.
    pub fn withdraw(
        &mut self,
        member_id: Uuid,
        amount: f64,
        policy: WithdrawPolicy,
    ) -> Result<WithdrawOutcome, CoreError> {
        let outcome =
            self.trading_service
                .withdraw(&mut self.group, member_id, amount, policy, Utc::now())?;
        self.dirty = true;
        Ok(outcome)
    }

    /// Buy a security for a member. Returns the holding id.
    pub fn buy(
        &mut self,
        member_id: Uuid,
        symbol: &str,
        name: &str,
        asset_class: AssetClass,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Uuid, CoreError> {
        let id = self.trading_service.buy(
            &mut self.group,
            member_id,
            symbol,
            name,
            asset_class,
            quantity,
            unit_price,
            Utc::now(),
        )?;
        self.dirty = true;
        Ok(id)
    }

    /// Sell a position in full. Returns the realized P&L.
    pub fn sell(&mut self, holding_id: Uuid) -> Result<f64, CoreError> {
        let realized = self
            .trading_service
            .sell(&mut self.group, holding_id, Utc::now())?;
        self.dirty = true;
        Ok(realized)
    }

    /// Mark one position to a new market price.
    pub fn update_price(&mut self, holding_id: Uuid, new_price: f64) -> Result<(), CoreError> {
        self.trading_service
            .update_price(&mut self.group, holding_id, new_price, Utc::now())?;
        self.dirty = true;
        Ok(())
    }

    /// Refresh every position's price from an injected quote feed.
    ///
    /// Positions whose quote fails are logged and skipped; one snapshot
    /// batch is recorded for the members whose positions changed.
    /// Returns the number of positions refreshed.
    pub async fn refresh_prices(&mut self, feed: &dyn QuoteFeed) -> Result<usize, CoreError> {
        let at = Utc::now();
        let targets: Vec<(Uuid, String, AssetClass, Option<String>)> = self
            .group
            .holdings
            .iter()
            .map(|h| (h.id, h.symbol.clone(), h.asset_class, h.quote_key.clone()))
            .collect();

        let mut affected: Vec<Uuid> = Vec::new();
        let mut refreshed = 0;
        for (holding_id, symbol, asset_class, quote_key) in targets {
            match feed
                .latest_price(&symbol, asset_class, quote_key.as_deref())
                .await
            {
                Ok(price) if price.is_finite() && price >= 0.0 => {
                    if let Some(holding) =
                        self.group.holdings.iter_mut().find(|h| h.id == holding_id)
                    {
                        holding.current_price = price;
                        holding.last_price_update = Some(at);
                        if !affected.contains(&holding.member_id) {
                            affected.push(holding.member_id);
                        }
                        refreshed += 1;
                    }
                }
                Ok(price) => {
                    log::warn!("{}: discarded bogus quote {price} for {symbol}", feed.name());
                }
                Err(e) => {
                    log::warn!("{}: quote for {symbol} failed: {e}", feed.name());
                }
            }
        }

        if refreshed > 0 {
            self.group.activity.push(ActivityEvent::new(
                ActivityKind::Update,
                None,
                "Prices refreshed",
                format!("{refreshed} positions marked to market via {}", feed.name()),
                at,
            ));
            self.history_service
                .record_mutation_snapshot(&mut self.group, &affected, at);
            self.dirty = true;
        }
        Ok(refreshed)
    }

    // ── Holdings & Valuation ────────────────────────────────────────

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.group.holdings
    }

    #[must_use]
    pub fn holdings_of(&self, member_id: Uuid) -> Vec<&Holding> {
        self.group.holdings_of(member_id)
    }

    /// Value one position at current prices.
    #[must_use]
    pub fn position_metrics(&self, holding_id: Uuid) -> Option<PositionMetrics> {
        self.group.holding(holding_id).map(valuation::position_metrics)
    }

    /// Value one member's portfolio at current prices.
    #[must_use]
    pub fn member_metrics(&self, member_id: Uuid) -> Option<MemberMetrics> {
        self.group
            .member(member_id)
            .map(|m| valuation::member_metrics(m, &self.group.holdings))
    }

    /// Aggregate valuation across the whole group.
    #[must_use]
    pub fn group_totals(&self) -> GroupTotals {
        valuation::group_metrics(&self.group)
    }

    // ── Unified Metrics ─────────────────────────────────────────────

    /// Mode-aware P&L for one member, against the active season when in
    /// season mode.
    #[must_use]
    pub fn metrics_for_mode(&self, member_id: Uuid, mode: MetricsMode) -> Option<MemberModeMetrics> {
        let member = self.group.member(member_id)?;
        Some(metrics_resolver::metrics_for_mode(
            member,
            &self.group.holdings,
            self.group.active_season(),
            mode,
            &self.group.history,
        ))
    }

    /// Mode-aware P&L for the whole group.
    #[must_use]
    pub fn group_metrics_for_mode(&self, mode: MetricsMode) -> GroupModeMetrics {
        metrics_resolver::group_metrics_for_mode(&self.group, self.group.active_season(), mode)
    }

    /// All members' mode-aware metrics, best percentage first: the
    /// competitive ranking for the given mode.
    #[must_use]
    pub fn leaderboard(&self, mode: MetricsMode) -> Vec<MemberModeMetrics> {
        let mut rows: Vec<MemberModeMetrics> = self
            .group
            .members
            .iter()
            .map(|m| {
                metrics_resolver::metrics_for_mode(
                    m,
                    &self.group.holdings,
                    self.group.active_season(),
                    mode,
                    &self.group.history,
                )
            })
            .collect();
        rows.sort_by(|a, b| {
            b.pl_pct
                .partial_cmp(&a.pl_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }

    // ── Charts ──────────────────────────────────────────────────────

    /// Bounded, downsampled value series for one member.
    #[must_use]
    pub fn chart_for_member(&self, member_id: Uuid, range: ChartRange) -> Vec<PortfolioSnapshot> {
        self.history_service.aggregate_for_chart(
            &self.group.history,
            range,
            Some((member_id, SnapshotScope::Member)),
            Utc::now(),
        )
    }

    /// Bounded, downsampled value series for the group rollup.
    #[must_use]
    pub fn chart_for_group(&self, range: ChartRange) -> Vec<PortfolioSnapshot> {
        self.history_service.aggregate_for_chart(
            &self.group.history,
            range,
            Some((self.group.id, SnapshotScope::Group)),
            Utc::now(),
        )
    }

    /// Raw snapshot history (all entities, unsampled).
    #[must_use]
    pub fn history(&self) -> &[PortfolioSnapshot] {
        &self.group.history
    }

    // ── Seasons ─────────────────────────────────────────────────────

    /// Whether a member may control seasons.
    #[must_use]
    pub fn is_group_leader(&self, member_id: Uuid) -> bool {
        self.season_service.is_group_leader(&self.group, member_id)
    }

    /// Start a new season (leader only). Returns the season id.
    pub fn start_season(
        &mut self,
        caller_id: Uuid,
        name: impl Into<String>,
    ) -> Result<Uuid, CoreError> {
        let id = self
            .season_service
            .start_season(&mut self.group, caller_id, name, Utc::now())?;
        self.dirty = true;
        Ok(id)
    }

    /// End the active season (leader only). Returns the season id.
    pub fn end_season(&mut self, caller_id: Uuid) -> Result<Uuid, CoreError> {
        let id = self
            .season_service
            .end_season(&mut self.group, caller_id, Utc::now())?;
        self.dirty = true;
        Ok(id)
    }

    #[must_use]
    pub fn active_season(&self) -> Option<&Season> {
        self.group.active_season()
    }

    #[must_use]
    pub fn seasons(&self) -> &[Season] {
        &self.group.seasons
    }

    // ── Activity Log ────────────────────────────────────────────────

    /// All activity, newest first.
    #[must_use]
    pub fn activity(&self) -> Vec<&ActivityEvent> {
        let mut entries: Vec<&ActivityEvent> = self.group.activity.iter().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    /// Activity filtered to one member, newest first.
    #[must_use]
    pub fn activity_for_member(&self, member_id: Uuid) -> Vec<&ActivityEvent> {
        let mut entries: Vec<&ActivityEvent> = self
            .group
            .activity
            .iter()
            .filter(|e| e.member_id == Some(member_id))
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    /// Activity filtered by kind, newest first.
    #[must_use]
    pub fn activity_of_kind(&self, kind: ActivityKind) -> Vec<&ActivityEvent> {
        let mut entries: Vec<&ActivityEvent> = self
            .group
            .activity
            .iter()
            .filter(|e| e.kind == kind)
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    /// Activity sorted by a specific order.
    #[must_use]
    pub fn activity_sorted(&self, order: &ActivitySortOrder) -> Vec<&ActivityEvent> {
        let mut entries: Vec<&ActivityEvent> = self.group.activity.iter().collect();
        match order {
            ActivitySortOrder::TimeDesc => entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            ActivitySortOrder::TimeAsc => entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            ActivitySortOrder::AmountDesc => entries.sort_by(|a, b| {
                let (x, y) = (a.amount.unwrap_or(0.0).abs(), b.amount.unwrap_or(0.0).abs());
                y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)
            }),
            ActivitySortOrder::AmountAsc => entries.sort_by(|a, b| {
                let (x, y) = (a.amount.unwrap_or(0.0).abs(), b.amount.unwrap_or(0.0).abs());
                x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
            }),
        }
        entries
    }

    /// Search activity by matching query against symbol, title, and
    /// description (case-insensitive).
    #[must_use]
    pub fn search_activity(&self, query: &str) -> Vec<&ActivityEvent> {
        let q = query.to_lowercase();
        self.group
            .activity
            .iter()
            .filter(|e| {
                e.title.to_lowercase().contains(&q)
                    || e.description.to_lowercase().contains(&q)
                    || e.symbol.as_deref().unwrap_or("").to_lowercase().contains(&q)
            })
            .collect()
    }

    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.group.activity.len()
    }

    /// Append a free-form note.
    pub fn add_note(
        &mut self,
        member_id: Option<Uuid>,
        text: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.trading_service
            .add_note(&mut self.group, member_id, text, Utc::now())?;
        self.dirty = true;
        Ok(())
    }

    /// Explicit bulk clear of the activity log. Returns how many entries
    /// were removed.
    pub fn clear_activity(&mut self) -> usize {
        let cleared = self.trading_service.clear_activity(&mut self.group);
        if cleared > 0 {
            self.dirty = true;
        }
        cleared
    }

    // ── Password & Dirty State ──────────────────────────────────────

    /// Re-encrypt the group with a new password.
    /// Returns the encrypted bytes. The caller should write them to storage.
    ///
    /// `last_saved_bytes` must be the most recently saved encrypted bytes
    /// for this group. The current password is verified by decrypting them.
    /// If verification fails, returns `CoreError::Decryption`.
    pub fn change_password(
        &mut self,
        last_saved_bytes: &[u8],
        current_password: &str,
        new_password: &str,
    ) -> Result<Vec<u8>, CoreError> {
        // Verify the current password against the actual saved data.
        StorageManager::load_from_bytes(last_saved_bytes, current_password)?;

        let new_bytes = StorageManager::save_to_bytes(&self.group, new_password)?;
        self.dirty = false;
        Ok(new_bytes)
    }

    /// Returns `true` if the group has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export the activity log as a JSON string.
    pub fn export_activity_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.group.activity)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize activity: {e}")))
    }

    /// Export the full group state as JSON (unencrypted snapshot for
    /// debugging/display).
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.group)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize group: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(group: Group) -> Self {
        Self {
            group,
            trading_service: TradingService::new(),
            history_service: HistoryService::new(),
            season_service: SeasonService::new(),
            dirty: false,
        }
    }
}
