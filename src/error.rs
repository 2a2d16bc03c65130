use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Failures reported by a [`crate::store::RecordStore`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Sprint {sprint_id} was modified concurrently")]
    Conflict { sprint_id: String },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid window: end {end} is not after start {start}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Query is missing an owner scope")]
    MissingOwnerScope,

    #[error("Record owned by '{found}' returned for owner '{expected}'")]
    OwnerScopeViolation { expected: String, found: String },

    #[error("Sprint {sprint_id} could not be updated after {attempts} attempts")]
    ConcurrentSprintUpdate { sprint_id: String, attempts: u32 },

    #[error("Sprint not found: {0}")]
    SprintNotFound(String),

    #[error("Sprint {0} is completed and can no longer change")]
    SprintCompleted(String),

    #[error("Owner already has an active sprint: {0}")]
    ActiveSprintExists(String),

    #[error("Invalid sprint goal {0}: must not be negative")]
    InvalidSprintGoal(Decimal),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnalyticsError {
    /// True when the caller may repeat the whole request and expect it to succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AnalyticsError::ConcurrentSprintUpdate { .. }
                | AnalyticsError::Store(StoreError::Conflict { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
