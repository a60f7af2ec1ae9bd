use crate::types::SnapshotKind;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while synchronizing with the SignalForge backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Fetch or connect failure
    #[error("Network error: {0}")]
    Network(String),

    /// No response inside the fetch window
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Response had an unexpected shape or a missing field
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Snapshot superseded by a newer one of the same kind
    #[error("Stale {kind} snapshot #{seq} (already applied #{last_applied})")]
    Stale {
        kind: SnapshotKind,
        seq: u64,
        last_applied: u64,
    },

    /// Backend answered a control action with an error field
    #[error("Rejected by backend: {0}")]
    CommandRejected(String),

    #[error("Another bot command is still in flight")]
    CommandInFlight,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    /// Stale snapshots are dropped silently, everything else reaches the user
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, SyncError::Stale { .. })
    }

    /// Map a transport failure from reqwest onto the taxonomy
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            SyncError::Timeout(timeout)
        } else if err.is_decode() {
            SyncError::Malformed(err.to_string())
        } else {
            SyncError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Malformed(err.to_string())
    }
}
