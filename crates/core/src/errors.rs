use thiserror::Error;

/// Unified error type for the entire groupfolio-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// Every variant is recoverable: callers branch on the outcome instead of
/// unwinding, and a failed operation leaves the group state untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / File ──────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: wrong password or corrupted file")]
    Decryption,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Quotes ──────────────────────────────────────────────────────
    #[error("Quote not available for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Insufficient funds: need {needed:.2}, have {available:.2}")]
    InsufficientFunds { needed: f64, available: f64 },

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    #[error("Season not found: {0}")]
    SeasonNotFound(String),

    #[error("Only the group leader may perform this action")]
    NotGroupLeader,

    #[error("A season is already active")]
    SeasonAlreadyActive,

    #[error("No season is currently active")]
    NoActiveSeason,
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}
