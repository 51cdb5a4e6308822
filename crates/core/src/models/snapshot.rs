use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a snapshot records one member's valuation or the group rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotScope {
    /// One member's portfolio
    #[serde(rename = "user")]
    Member,
    /// The whole group summed together
    #[serde(rename = "group")]
    Group,
}

/// How intraday snapshots are recorded for a group.
///
/// Exactly one policy applies per group; mixing both within one history
/// would produce inconsistent point density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SnapshotPolicy {
    /// Every mutation appends a fresh snapshot.
    AppendAlways,
    /// A mutation on the same calendar day as the entity's latest snapshot
    /// replaces that snapshot instead of appending. Bounds intraday growth
    /// at the price of sub-day resolution.
    #[default]
    CoalesceSameDay,
}

/// One point-in-time valuation record for a member or the whole group.
///
/// For a given (entity, scope) pair snapshots are ordered by timestamp and
/// capped by the retention policy (see the history service).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Present once persisted; `None` for freshly computed records
    #[serde(default)]
    pub id: Option<Uuid>,

    /// When the valuation was taken
    pub timestamp: DateTime<Utc>,

    /// The member this snapshot belongs to, or the group id for rollups
    pub entity_id: Uuid,

    /// Member-level or group-level record
    pub scope: SnapshotScope,

    /// Mark-to-market value (cash + holdings value) at `timestamp`
    pub total_value: f64,

    /// Cost basis of all holdings at `timestamp`
    pub cost_basis: f64,
}

impl PortfolioSnapshot {
    pub fn new(
        entity_id: Uuid,
        scope: SnapshotScope,
        total_value: f64,
        cost_basis: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            timestamp,
            entity_id,
            scope,
            total_value,
            cost_basis,
        }
    }
}
