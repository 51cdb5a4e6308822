//! The history ledger: snapshot recording, retention, and chart aggregation.
//!
//! Every mutating operation that can change a member's valuation records one
//! snapshot per affected member plus one group-level rollup in the same pass,
//! which keeps per-member and group charts consistent without a separate
//! recomputation step.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::group::Group;
use crate::models::snapshot::{PortfolioSnapshot, SnapshotPolicy, SnapshotScope};
use crate::services::valuation;

/// Maximum snapshots retained per entity (member or group rollup).
pub const SNAPSHOT_RETENTION: usize = 200;

/// Requested chart window. Each range carries its own point budget so the
/// frontend always receives a bounded series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartRange {
    #[serde(rename = "1D")]
    Day,
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "1Y")]
    Year,
    #[serde(rename = "ALL")]
    All,
}

impl ChartRange {
    /// How far back from "now" this range reaches. `None` means unbounded.
    #[must_use]
    pub fn window(self) -> Option<Duration> {
        match self {
            ChartRange::Day => Some(Duration::days(1)),
            ChartRange::Week => Some(Duration::weeks(1)),
            ChartRange::Month => Some(Duration::days(30)),
            ChartRange::Year => Some(Duration::days(365)),
            ChartRange::All => None,
        }
    }

    /// Maximum number of points returned for this range.
    #[must_use]
    pub fn max_points(self) -> usize {
        match self {
            ChartRange::Day => 96,
            ChartRange::Week => 42,
            ChartRange::Month => 30,
            ChartRange::Year => 52,
            ChartRange::All => 100,
        }
    }
}

impl std::fmt::Display for ChartRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChartRange::Day => "1D",
            ChartRange::Week => "1W",
            ChartRange::Month => "1M",
            ChartRange::Year => "1Y",
            ChartRange::All => "ALL",
        };
        write!(f, "{label}")
    }
}

/// Records valuations over time and serves bounded, downsampled series
/// for charting.
pub struct HistoryService;

impl HistoryService {
    pub fn new() -> Self {
        Self
    }

    /// Record the post-mutation valuation of the affected members plus the
    /// group rollup. Member ids not present in the group are skipped: the
    /// state may have shifted under the caller, and snapshot recording must
    /// never fail an otherwise-completed mutation.
    ///
    /// Applies the group's snapshot policy, then trims each touched entity
    /// to [`SNAPSHOT_RETENTION`].
    pub fn record_mutation_snapshot(
        &self,
        group: &mut Group,
        member_ids: &[Uuid],
        at: DateTime<Utc>,
    ) {
        let policy = group.settings.snapshot_policy;

        for &member_id in member_ids {
            let Some(member) = group.member(member_id) else {
                continue;
            };
            let metrics = valuation::member_metrics(member, &group.holdings);
            let snapshot = PortfolioSnapshot::new(
                member_id,
                SnapshotScope::Member,
                metrics.portfolio_value,
                metrics.total_cost_basis,
                at,
            );
            Self::push(&mut group.history, snapshot, policy);
        }

        let totals = valuation::group_metrics(group);
        let rollup = PortfolioSnapshot::new(
            group.id,
            SnapshotScope::Group,
            totals.portfolio_value,
            totals.total_cost_basis,
            at,
        );
        Self::push(&mut group.history, rollup, policy);
    }

    /// Append a snapshot, honoring same-day coalescing when configured.
    ///
    /// Coalescing replaces the entity's most recent entry when it falls on
    /// the same calendar day, so intraday churn never grows the log while
    /// day-level resolution is preserved.
    fn push(
        history: &mut Vec<PortfolioSnapshot>,
        snapshot: PortfolioSnapshot,
        policy: SnapshotPolicy,
    ) {
        let entity = (snapshot.entity_id, snapshot.scope);

        if policy == SnapshotPolicy::CoalesceSameDay {
            let latest = history
                .iter_mut()
                .filter(|s| s.entity_id == entity.0 && s.scope == entity.1)
                .max_by_key(|s| s.timestamp);
            if let Some(prior) = latest {
                if prior.timestamp.date_naive() == snapshot.timestamp.date_naive()
                    && prior.timestamp <= snapshot.timestamp
                {
                    *prior = snapshot;
                    return;
                }
            }
        }

        history.push(snapshot);
        Self::trim_entity(history, entity);
    }

    /// Drop the oldest entries of one entity until it fits the retention
    /// cap. Entries belonging to other entities are untouched, so a
    /// low-activity member is never crowded out by a high-activity one.
    fn trim_entity(history: &mut Vec<PortfolioSnapshot>, entity: (Uuid, SnapshotScope)) {
        let (entity_id, scope) = entity;
        loop {
            let count = history
                .iter()
                .filter(|s| s.entity_id == entity_id && s.scope == scope)
                .count();
            if count <= SNAPSHOT_RETENTION {
                return;
            }
            let oldest = history
                .iter()
                .enumerate()
                .filter(|(_, s)| s.entity_id == entity_id && s.scope == scope)
                .min_by_key(|(_, s)| s.timestamp)
                .map(|(idx, _)| idx);
            match oldest {
                Some(idx) => {
                    history.remove(idx);
                }
                None => return,
            }
        }
    }

    /// Produce an ordered, downsampled series for one entity and range.
    ///
    /// Pure: identical inputs always yield identical output. Filters to
    /// snapshots at or after `now − window`, sorts ascending, and when the
    /// result exceeds the range's point budget picks evenly spaced indices
    /// (`floor(i × count / max_points)`), always force-including the most
    /// recent point so the chart's rightmost value is current.
    #[must_use]
    pub fn aggregate_for_chart(
        &self,
        snapshots: &[PortfolioSnapshot],
        range: ChartRange,
        entity: Option<(Uuid, SnapshotScope)>,
        now: DateTime<Utc>,
    ) -> Vec<PortfolioSnapshot> {
        let cutoff = range.window().map(|w| now - w);

        let mut points: Vec<PortfolioSnapshot> = snapshots
            .iter()
            .filter(|s| match entity {
                Some((entity_id, scope)) => s.entity_id == entity_id && s.scope == scope,
                None => true,
            })
            .filter(|s| cutoff.map_or(true, |c| s.timestamp >= c))
            .cloned()
            .collect();
        points.sort_by_key(|s| s.timestamp);

        let count = points.len();
        let max_points = range.max_points();
        if count <= max_points {
            return points;
        }

        let mut sampled: Vec<PortfolioSnapshot> = (0..max_points)
            .map(|i| points[i * count / max_points].clone())
            .collect();

        // The stride can skip the newest point; the rightmost chart value
        // must always be current.
        let last = points[count - 1].clone();
        if sampled.last() != Some(&last) {
            let len = sampled.len();
            sampled[len - 1] = last;
        }

        sampled
    }
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new()
    }
}
