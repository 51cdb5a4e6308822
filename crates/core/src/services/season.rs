//! Season lifecycle: a two-state machine (no active season ⇄ season active)
//! gated by the group leadership rule.
//!
//! Rejected transitions are warned via `log` and returned as typed errors;
//! the group state is never touched on failure.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::activity::{ActivityEvent, ActivityKind};
use crate::models::group::Group;
use crate::models::season::{Season, SeasonBaselines};
use crate::services::valuation;

/// Starts and ends competitive seasons, capturing per-member baselines
/// atomically at season start.
pub struct SeasonService;

impl SeasonService {
    pub fn new() -> Self {
        Self
    }

    /// Whether a member may control seasons.
    ///
    /// The leader is the member explicitly recorded as such; a group that
    /// never recorded one treats its first member as leader by convention.
    #[must_use]
    pub fn is_group_leader(&self, group: &Group, member_id: Uuid) -> bool {
        match group.leader_id {
            Some(leader_id) => leader_id == member_id,
            None => group.members.first().map(|m| m.id) == Some(member_id),
        }
    }

    /// Start a new season.
    ///
    /// Leader-only, and only while no season is active. On success every
    /// current member's portfolio value is captured into the season's
    /// baseline map, a `SeasonStarted` activity is appended, and — if the
    /// group never had an explicit leader — the caller is recorded as
    /// leader permanently.
    pub fn start_season(
        &self,
        group: &mut Group,
        caller_id: Uuid,
        name: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        if group.member(caller_id).is_none() {
            return Err(CoreError::MemberNotFound(caller_id.to_string()));
        }
        if !self.is_group_leader(group, caller_id) {
            log::warn!(
                "start_season rejected: member {caller_id} is not the leader of group {}",
                group.id
            );
            return Err(CoreError::NotGroupLeader);
        }
        if group.active_season().is_some() {
            log::warn!("start_season rejected: group {} already has an active season", group.id);
            return Err(CoreError::SeasonAlreadyActive);
        }

        let entries: Vec<(Uuid, f64)> = group
            .members
            .iter()
            .map(|m| {
                (
                    m.id,
                    valuation::member_metrics(m, &group.holdings).portfolio_value,
                )
            })
            .collect();
        let baselines = SeasonBaselines::new(entries, &group.members)?;

        // The first successful start fixes leadership for good.
        if group.leader_id.is_none() {
            group.leader_id = Some(caller_id);
        }

        let name = name.into();
        let season = Season::new(name.clone(), caller_id, baselines, at);
        let season_id = season.id;
        group.current_season_id = Some(season_id);
        group.seasons.push(season);

        group.activity.push(ActivityEvent::new(
            ActivityKind::SeasonStarted,
            Some(caller_id),
            "Season started",
            format!("\"{name}\" is on, baselines locked for {} members", group.members.len()),
            at,
        ));

        Ok(season_id)
    }

    /// End the active season.
    ///
    /// Leader-only; fails when no season is running. Stamps the end
    /// timestamp, clears the group's active-season pointer, and appends a
    /// `SeasonEnded` activity.
    pub fn end_season(
        &self,
        group: &mut Group,
        caller_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        if group.member(caller_id).is_none() {
            return Err(CoreError::MemberNotFound(caller_id.to_string()));
        }
        if !self.is_group_leader(group, caller_id) {
            log::warn!(
                "end_season rejected: member {caller_id} is not the leader of group {}",
                group.id
            );
            return Err(CoreError::NotGroupLeader);
        }
        let Some(season_id) = group.active_season().map(|s| s.id) else {
            log::warn!("end_season rejected: group {} has no active season", group.id);
            return Err(CoreError::NoActiveSeason);
        };

        let season = group
            .seasons
            .iter_mut()
            .find(|s| s.id == season_id)
            .ok_or_else(|| CoreError::SeasonNotFound(season_id.to_string()))?;
        season.ended_at = Some(at);
        let name = season.name.clone();
        group.current_season_id = None;

        group.activity.push(ActivityEvent::new(
            ActivityKind::SeasonEnded,
            Some(caller_id),
            "Season ended",
            format!("\"{name}\" is over, back to all-time standings"),
            at,
        ));

        Ok(season_id)
    }
}

impl Default for SeasonService {
    fn default() -> Self {
        Self::new()
    }
}
