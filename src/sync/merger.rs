use super::PushEvent;
use crate::error::SyncError;
use crate::types::{BotState, History, Settings, Snapshot, SnapshotKind, WalletBalance};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// Maximum number of points kept for the portfolio value chart
pub const PORTFOLIO_HISTORY_LEN: usize = 120;

/// Push channel connectivity as seen by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    /// Displayed data may lag the backend
    pub fn is_stale(&self) -> bool {
        matches!(self, ConnectionState::Disconnected)
    }
}

/// The canonical state every render derives from.
///
/// Sub-trees stay `None` until their first snapshot lands. Derived figures such
/// as trade analytics are never stored here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewModel {
    pub bot: Option<BotState>,
    pub balance: Option<WalletBalance>,
    pub history: Option<History>,
    pub settings: Option<Settings>,
    pub connection: ConnectionState,
    portfolio: VecDeque<(u64, Decimal)>,
    portfolio_samples: u64,
    applied: HashMap<SnapshotKind, u64>,
}

impl ViewModel {
    /// Sequence number of the last snapshot applied for `kind`, 0 if none
    pub fn last_applied(&self, kind: SnapshotKind) -> u64 {
        self.applied.get(&kind).copied().unwrap_or(0)
    }

    /// Portfolio chart points `(sample index, total USD)`, oldest first
    pub fn portfolio_points(&self) -> impl Iterator<Item = &(u64, Decimal)> {
        self.portfolio.iter()
    }

    pub fn portfolio_len(&self) -> usize {
        self.portfolio.len()
    }

    /// Replace the snapshot's sub-tree, unless a newer one of the same kind was already applied
    pub fn apply_snapshot(&self, seq: u64, snapshot: Snapshot) -> Result<ViewModel, SyncError> {
        let kind = snapshot.kind();
        let last_applied = self.last_applied(kind);
        if seq <= last_applied {
            return Err(SyncError::Stale {
                kind,
                seq,
                last_applied,
            });
        }

        let mut next = self.clone();
        next.applied.insert(kind, seq);
        match snapshot {
            Snapshot::Status(state) => next.bot = Some(state),
            Snapshot::Balance(balance) => {
                next.record_portfolio(balance.total_value_usd);
                next.balance = Some(balance);
            }
            Snapshot::History(history) => next.history = Some(history),
            Snapshot::Settings(settings) => next.settings = Some(settings),
        }
        Ok(next)
    }

    /// Patch state with a push event; events never carry sequence numbers
    pub fn apply_event(&self, event: &PushEvent) -> ViewModel {
        let mut next = self.clone();
        match event {
            PushEvent::Connected => next.connection = ConnectionState::Connected,
            PushEvent::Disconnected => next.connection = ConnectionState::Disconnected,
            PushEvent::StatusUpdate(state) => {
                let mut state = state.clone();
                if let Some(prev) = &self.bot {
                    state.wallet_initialized = prev.wallet_initialized;
                    state.telegram_connected = prev.telegram_connected;
                }
                next.bot = Some(state);
            }
            PushEvent::BotStatus(status) => {
                next.bot.get_or_insert_with(BotState::default).status = *status;
            }
            PushEvent::TradeExecuted(trade) => {
                let history = next.history.get_or_insert_with(History::default);
                if !history.trades.iter().any(|t| t.key() == trade.key()) {
                    let pos = history
                        .trades
                        .partition_point(|t| t.timestamp <= trade.timestamp);
                    history.trades.insert(pos, trade.clone());
                }
            }
            PushEvent::Notification { .. } => {}
        }
        next
    }

    fn record_portfolio(&mut self, total: Decimal) {
        self.portfolio_samples += 1;
        self.portfolio.push_back((self.portfolio_samples, total));
        while self.portfolio.len() > PORTFOLIO_HISTORY_LEN {
            self.portfolio.pop_front();
        }
    }
}

/// Issues per-kind sequence numbers at request time
#[derive(Debug, Default)]
pub struct SequenceTracker {
    issued: HashMap<SnapshotKind, u64>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, kind: SnapshotKind) -> u64 {
        let seq = self.issued.entry(kind).or_insert(0);
        *seq += 1;
        *seq
    }
}

/// Sole writer of the canonical [`ViewModel`]
#[derive(Debug, Default)]
pub struct Merger {
    state: ViewModel,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewModel {
        &self.state
    }

    pub fn ingest_snapshot(&mut self, seq: u64, snapshot: Snapshot) -> Result<(), SyncError> {
        self.state = self.state.apply_snapshot(seq, snapshot)?;
        Ok(())
    }

    pub fn ingest_event(&mut self, event: &PushEvent) {
        self.state = self.state.apply_event(event);
    }

    /// A newer response of this kind already landed
    pub fn is_superseded(&self, kind: SnapshotKind, seq: u64) -> bool {
        seq <= self.state.last_applied(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BotStatus, Trade};
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn trade(date: &str, token: &str, amount: Decimal, ret: Option<Decimal>) -> Trade {
        Trade {
            timestamp: ts(date),
            token_address: token.to_string(),
            amount_invested: amount,
            amount_returned: ret,
        }
    }

    fn status(status: BotStatus, trades: u64) -> Snapshot {
        Snapshot::Status(BotState {
            status,
            trade_count: trades,
            ..BotState::default()
        })
    }

    fn balance(total: Decimal) -> Snapshot {
        Snapshot::Balance(WalletBalance {
            total_value_usd: total,
            ..WalletBalance::default()
        })
    }

    #[test]
    fn test_increasing_sequence_keeps_last_payload() {
        let mut vm = ViewModel::default();
        for (seq, count) in [(1, 10), (2, 11), (3, 12)] {
            vm = vm.apply_snapshot(seq, status(BotStatus::Running, count)).unwrap();
        }
        assert_eq!(vm.bot.as_ref().unwrap().trade_count, 12);
        assert_eq!(vm.last_applied(SnapshotKind::Status), 3);
    }

    #[test]
    fn test_out_of_order_snapshot_is_rejected() {
        let vm = ViewModel::default()
            .apply_snapshot(5, status(BotStatus::Running, 7))
            .unwrap();

        for seq in [1, 4, 5] {
            let result = vm.apply_snapshot(seq, status(BotStatus::Stopped, 0));
            assert_eq!(
                result,
                Err(SyncError::Stale {
                    kind: SnapshotKind::Status,
                    seq,
                    last_applied: 5
                })
            );
        }
        assert_eq!(vm.bot.as_ref().unwrap().status, BotStatus::Running);
    }

    #[test]
    fn test_sequences_are_per_kind() {
        let vm = ViewModel::default()
            .apply_snapshot(9, status(BotStatus::Running, 1))
            .unwrap()
            .apply_snapshot(1, balance(dec!(50)))
            .unwrap();
        assert_eq!(vm.balance.as_ref().unwrap().total_value_usd, dec!(50));
    }

    #[test]
    fn test_apply_is_pure() {
        let before = ViewModel::default();
        let after = before.apply_snapshot(1, balance(dec!(10))).unwrap();
        assert_eq!(before, ViewModel::default());
        assert_ne!(before, after);
    }

    #[test]
    fn test_trade_event_is_deduped_against_snapshot() {
        let t1 = trade("2026-01-02 10:00:00", "Mint1", dec!(1.0), Some(dec!(2.0)));
        let t2 = trade("2026-01-02 11:00:00", "Mint2", dec!(0.5), Some(dec!(0.4)));

        let vm = ViewModel::default()
            .apply_event(&PushEvent::TradeExecuted(t2.clone()))
            .apply_event(&PushEvent::TradeExecuted(t2.clone()));
        assert_eq!(vm.history.as_ref().unwrap().trades.len(), 1);

        let vm = vm
            .apply_snapshot(
                1,
                Snapshot::History(History {
                    trades: vec![t1.clone(), t2.clone()],
                    transactions: vec![],
                }),
            )
            .unwrap()
            .apply_event(&PushEvent::TradeExecuted(t2.clone()));
        assert_eq!(vm.history.unwrap().trades, vec![t1, t2]);
    }

    #[test]
    fn test_trade_event_keeps_timestamp_order() {
        let early = trade("2026-01-02 09:00:00", "A", dec!(1), None);
        let mid = trade("2026-01-02 10:00:00", "B", dec!(1), None);
        let late = trade("2026-01-02 11:00:00", "C", dec!(1), None);

        let vm = ViewModel::default()
            .apply_event(&PushEvent::TradeExecuted(late.clone()))
            .apply_event(&PushEvent::TradeExecuted(early.clone()))
            .apply_event(&PushEvent::TradeExecuted(mid.clone()));
        assert_eq!(vm.history.unwrap().trades, vec![early, mid, late]);
    }

    #[test]
    fn test_disconnect_keeps_state_and_flags_stale() {
        let vm = ViewModel::default()
            .apply_event(&PushEvent::Connected)
            .apply_snapshot(1, status(BotStatus::Running, 3))
            .unwrap()
            .apply_event(&PushEvent::Disconnected);
        assert!(vm.connection.is_stale());
        assert_eq!(vm.bot.as_ref().unwrap().status, BotStatus::Running);

        let vm = vm.apply_event(&PushEvent::Connected);
        assert!(!vm.connection.is_stale());
    }

    #[test]
    fn test_status_events() {
        let vm = ViewModel::default()
            .apply_snapshot(
                1,
                Snapshot::Status(BotState {
                    status: BotStatus::Stopped,
                    wallet_initialized: true,
                    telegram_connected: true,
                    ..BotState::default()
                }),
            )
            .unwrap()
            .apply_event(&PushEvent::BotStatus(BotStatus::Running));
        assert_eq!(vm.bot.as_ref().unwrap().status, BotStatus::Running);

        let vm = vm.apply_event(&PushEvent::StatusUpdate(BotState {
            status: BotStatus::Running,
            uptime_seconds: 120,
            trade_count: 4,
            ..BotState::default()
        }));
        let bot = vm.bot.unwrap();
        assert_eq!(bot.uptime_seconds, 120);
        assert!(bot.wallet_initialized);
        assert!(bot.telegram_connected);
    }

    #[test]
    fn test_portfolio_series_is_bounded() {
        let mut vm = ViewModel::default();
        for seq in 1..=(PORTFOLIO_HISTORY_LEN as u64 + 30) {
            vm = vm.apply_snapshot(seq, balance(Decimal::from(seq))).unwrap();
        }
        assert_eq!(vm.portfolio_len(), PORTFOLIO_HISTORY_LEN);
        assert_eq!(vm.portfolio_points().next().unwrap().0, 31);
    }

    #[test]
    fn test_merger_and_tracker() {
        let mut tracker = SequenceTracker::new();
        let first = tracker.next(SnapshotKind::History);
        let second = tracker.next(SnapshotKind::History);
        assert_eq!((first, second), (1, 2));
        assert_eq!(tracker.next(SnapshotKind::Status), 1);

        let mut merger = Merger::new();
        merger
            .ingest_snapshot(second, Snapshot::History(History::default()))
            .unwrap();
        assert!(merger.is_superseded(SnapshotKind::History, first));
        assert!(merger
            .ingest_snapshot(first, Snapshot::History(History::default()))
            .is_err());
    }
}
