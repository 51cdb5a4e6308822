use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;

use super::member::Member;

/// Per-member starting values captured atomically when a season begins.
///
/// Construction validates membership: every key must reference a member
/// that exists at capture time, so the invariant is enforced up front
/// instead of being left implicit in a free-form map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeasonBaselines {
    values: HashMap<Uuid, f64>,
}

impl SeasonBaselines {
    /// Build a baseline map from explicit (member, value) pairs.
    /// Rejects any id that does not reference a current member.
    pub fn new(
        entries: impl IntoIterator<Item = (Uuid, f64)>,
        members: &[Member],
    ) -> Result<Self, CoreError> {
        let mut values = HashMap::new();
        for (member_id, value) in entries {
            if !members.iter().any(|m| m.id == member_id) {
                return Err(CoreError::ValidationError(format!(
                    "Season baseline references unknown member {member_id}"
                )));
            }
            values.insert(member_id, value);
        }
        Ok(Self { values })
    }

    /// The recorded starting value for a member, if captured.
    #[must_use]
    pub fn get(&self, member_id: Uuid) -> Option<f64> {
        self.values.get(&member_id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (member id, starting value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Uuid, f64)> + '_ {
        self.values.iter().map(|(id, v)| (*id, *v))
    }
}

/// A bounded competitive period with its own starting baseline per member.
///
/// At most one season per group is active (no `ended_at`) at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    /// Unique identifier
    pub id: Uuid,

    /// Display name (e.g., "Q3 Showdown")
    pub name: String,

    /// When the season began
    pub started_at: DateTime<Utc>,

    /// When the season ended; `None` while active
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,

    /// The member who started the season
    pub leader_id: Uuid,

    /// Each member's portfolio value at season start
    pub baselines: SeasonBaselines,
}

impl Season {
    pub fn new(
        name: impl Into<String>,
        leader_id: Uuid,
        baselines: SeasonBaselines,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            started_at,
            ended_at: None,
            leader_id,
            baselines,
        }
    }

    /// A season with no end timestamp is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}
