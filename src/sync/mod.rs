//! State synchronization: every snapshot, push event and timer tick funnels
//! through [`SyncMessage`] into the single owner of the canonical view model.

pub mod analytics;
pub mod control;
pub mod listener;
pub mod merger;
pub mod notifications;

pub use analytics::TradeAnalytics;
pub use control::{BotControl, ControlCommand, ControlPhase};
pub use listener::{Directive, EventListener};
pub use merger::{ConnectionState, Merger, SequenceTracker, ViewModel, PORTFOLIO_HISTORY_LEN};
pub use notifications::{Notification, NotificationQueue};

use crate::api::BackendCommand;
use crate::error::SyncError;
use crate::types::{BotState, BotStatus, Severity, Snapshot, SnapshotKind, Trade};

/// Incremental update delivered over the push channel
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Connected,
    Disconnected,
    /// Full bot state; the push payload carries no health flags
    StatusUpdate(BotState),
    BotStatus(BotStatus),
    Notification {
        title: Option<String>,
        message: String,
        severity: Severity,
    },
    TradeExecuted(Trade),
}

/// Everything that can mutate application state, in arrival order
#[derive(Debug)]
pub enum SyncMessage {
    Snapshot {
        kind: SnapshotKind,
        seq: u64,
        result: Result<Snapshot, SyncError>,
    },
    Push(PushEvent),
    CommandDone {
        command: BackendCommand,
        result: Result<String, SyncError>,
    },
    PollTick,
    Sweep,
}
