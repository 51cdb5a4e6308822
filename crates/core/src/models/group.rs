use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::activity::ActivityEvent;
use super::holding::Holding;
use super::member::Member;
use super::season::Season;
use super::settings::GroupSettings;
use super::snapshot::PortfolioSnapshot;

/// The aggregate root. Everything in here gets serialized, encrypted,
/// and saved to the portable .gpfl file.
///
/// All member/holding/snapshot collections are owned exclusively by the
/// group; no cross-group references exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Investors, in join order (order matters for the leadership rule)
    pub members: Vec<Member>,

    /// All positions, each tagged with its owning member
    pub holdings: Vec<Holding>,

    /// Append-only activity log
    pub activity: Vec<ActivityEvent>,

    /// Valuation history for members and the group rollup
    pub history: Vec<PortfolioSnapshot>,

    /// Explicitly recorded leader; when unset, the first member leads
    /// by convention
    #[serde(default)]
    pub leader_id: Option<Uuid>,

    /// The currently active season, if any
    #[serde(default)]
    pub current_season_id: Option<Uuid>,

    /// All seasons, active and concluded
    pub seasons: Vec<Season>,

    /// Group configuration
    #[serde(default)]
    pub settings: GroupSettings,

    /// When the group was created
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members: Vec::new(),
            holdings: Vec::new(),
            activity: Vec::new(),
            history: Vec::new(),
            leader_id: None,
            current_season_id: None,
            seasons: Vec::new(),
            settings: GroupSettings::default(),
            created_at: Utc::now(),
        }
    }

    /// Find a member by id.
    #[must_use]
    pub fn member(&self, member_id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    pub(crate) fn member_mut(&mut self, member_id: Uuid) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == member_id)
    }

    /// Find a holding by id.
    #[must_use]
    pub fn holding(&self, holding_id: Uuid) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.id == holding_id)
    }

    /// All holdings owned by one member.
    #[must_use]
    pub fn holdings_of(&self, member_id: Uuid) -> Vec<&Holding> {
        self.holdings
            .iter()
            .filter(|h| h.member_id == member_id)
            .collect()
    }

    /// The currently active season, if one is running.
    #[must_use]
    pub fn active_season(&self) -> Option<&Season> {
        let id = self.current_season_id?;
        self.seasons.iter().find(|s| s.id == id && s.is_active())
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new("Untitled Group")
    }
}
