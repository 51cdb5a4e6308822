use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of activity-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    /// A member bought a security
    Buy,
    /// A member sold a position (entry amount carries the realized P&L)
    Sell,
    /// A holding's price was refreshed
    Update,
    /// Cash deposited
    Deposit,
    /// Cash withdrawn
    Withdraw,
    /// A member joined the group
    Join,
    /// The group itself was created
    GroupCreated,
    /// A competitive season began
    SeasonStarted,
    /// A competitive season ended
    SeasonEnded,
    /// Free-form note
    Note,
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActivityKind::Buy => "Buy",
            ActivityKind::Sell => "Sell",
            ActivityKind::Update => "Update",
            ActivityKind::Deposit => "Deposit",
            ActivityKind::Withdraw => "Withdraw",
            ActivityKind::Join => "Join",
            ActivityKind::GroupCreated => "GroupCreated",
            ActivityKind::SeasonStarted => "SeasonStarted",
            ActivityKind::SeasonEnded => "SeasonEnded",
            ActivityKind::Note => "Note",
        };
        write!(f, "{label}")
    }
}

/// Sort order for activity listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivitySortOrder {
    /// Newest first (default for display)
    TimeDesc,
    /// Oldest first
    TimeAsc,
    /// Largest absolute amount first
    AmountDesc,
    /// Smallest absolute amount first
    AmountAsc,
}

/// One immutable log entry describing a state change.
///
/// The log is append-only: entries are never mutated or deleted except by
/// an explicit bulk clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Unique identifier
    pub id: Uuid,

    /// When the change happened
    pub timestamp: DateTime<Utc>,

    /// The member involved, or `None` for group-wide events
    pub member_id: Option<Uuid>,

    /// What kind of change this was
    pub kind: ActivityKind,

    /// Ticker symbol for trade/price events
    #[serde(default)]
    pub symbol: Option<String>,

    /// Short human-readable headline
    pub title: String,

    /// Longer human-readable description
    pub description: String,

    /// Signed dollar amount: realized P&L for sells, signed flow for
    /// deposits/withdrawals, absent where it has no meaning
    #[serde(default)]
    pub amount: Option<f64>,
}

impl ActivityEvent {
    pub fn new(
        kind: ActivityKind,
        member_id: Option<Uuid>,
        title: impl Into<String>,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            member_id,
            kind,
            symbol: None,
            title: title.into(),
            description: description.into(),
            amount: None,
        }
    }

    /// Attach a ticker symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Attach a signed dollar amount.
    #[must_use]
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }
}
