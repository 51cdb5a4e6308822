use serde::{Deserialize, Serialize};

use super::snapshot::SnapshotPolicy;

/// Group-level configuration, stored inside the encrypted group file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupSettings {
    /// How intraday snapshots are recorded (append vs same-day coalescing).
    /// Fixed per group so one history never mixes both behaviors.
    pub snapshot_policy: SnapshotPolicy,
}
