use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rust_decimal_macros::dec;
use signalforge_dash::types::{
    BotState, BotStatus, History, Settings, Snapshot, SnapshotKind, Trade, WalletBalance,
};
use signalforge_dash::{
    ApiClient, App, BackendCommand, Config, DashboardBackend, PushEvent, SyncError, SyncMessage,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn trade(hour: u32, token: &str) -> Trade {
    Trade {
        timestamp: at(hour),
        token_address: token.to_string(),
        amount_invested: dec!(0.1),
        amount_returned: Some(dec!(0.15)),
    }
}

/// In-memory backend that records every call
#[derive(Default)]
struct MockBackend {
    status: Mutex<BotStatus>,
    trades: Mutex<Vec<Trade>>,
    fetches: Mutex<HashMap<SnapshotKind, usize>>,
    commands: Mutex<Vec<BackendCommand>>,
    /// Kinds whose fetch answers with a network error
    failing: Mutex<Vec<SnapshotKind>>,
}

impl MockBackend {
    fn fetches(&self, kind: SnapshotKind) -> usize {
        self.fetches.lock().unwrap().get(&kind).copied().unwrap_or(0)
    }

    fn reset(&self) {
        self.fetches.lock().unwrap().clear();
    }
}

#[async_trait]
impl DashboardBackend for MockBackend {
    async fn fetch_snapshot(&self, kind: SnapshotKind) -> Result<Snapshot, SyncError> {
        *self.fetches.lock().unwrap().entry(kind).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(&kind) {
            return Err(SyncError::Network("connection refused".to_string()));
        }
        Ok(match kind {
            SnapshotKind::Status => Snapshot::Status(BotState {
                status: *self.status.lock().unwrap(),
                ..BotState::default()
            }),
            SnapshotKind::Balance => Snapshot::Balance(WalletBalance {
                sol_balance: dec!(2),
                sol_value_usd: dec!(300),
                total_value_usd: dec!(300),
                wallet_address: Some("Wallet1111".to_string()),
                tokens: vec![],
            }),
            SnapshotKind::History => Snapshot::History(History {
                trades: self.trades.lock().unwrap().clone(),
                transactions: vec![],
            }),
            SnapshotKind::Settings => Snapshot::Settings(Settings {
                trade_amount: dec!(0.1),
                target_multiplier: dec!(2),
                channel: Some("@calls".to_string()),
            }),
        })
    }

    async fn send_command(&self, command: &BackendCommand) -> Result<String, SyncError> {
        self.commands.lock().unwrap().push(command.clone());
        match command {
            BackendCommand::Start => {
                *self.status.lock().unwrap() = BotStatus::Running;
                Ok("Bot started".to_string())
            }
            BackendCommand::Stop => Err(SyncError::CommandRejected("wallet locked".to_string())),
            _ => Ok("ok".to_string()),
        }
    }
}

fn setup() -> (App, Arc<MockBackend>, mpsc::UnboundedReceiver<SyncMessage>) {
    let backend = Arc::new(MockBackend::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let app = App::new(Config::default(), backend.clone(), tx);
    (app, backend, rx)
}

/// Apply every message produced by spawned fetches until the channel goes quiet
async fn settle(app: &mut App, rx: &mut mpsc::UnboundedReceiver<SyncMessage>) {
    while let Ok(Some(message)) = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {
        app.handle_message(message);
    }
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

#[tokio::test]
async fn test_initial_load_fills_every_panel() {
    let (mut app, backend, mut rx) = setup();
    app.load_all();
    settle(&mut app, &mut rx).await;

    for kind in SnapshotKind::ALL {
        assert_eq!(backend.fetches(kind), 1, "{}", kind);
    }
    let vm = app.merger.state();
    assert!(vm.bot.is_some());
    assert!(vm.balance.is_some());
    assert!(vm.history.is_some());
    assert!(vm.settings.is_some());
    assert!(!app.is_syncing());
}

#[tokio::test]
async fn test_reconnect_resyncs_each_kind_once() {
    let (mut app, backend, mut rx) = setup();
    app.load_all();
    settle(&mut app, &mut rx).await;
    backend.reset();

    // first connect is not a recovery
    app.handle_message(SyncMessage::Push(PushEvent::Connected));
    settle(&mut app, &mut rx).await;
    assert!(SnapshotKind::ALL.iter().all(|k| backend.fetches(*k) == 0));

    app.handle_message(SyncMessage::Push(PushEvent::Disconnected));
    app.handle_message(SyncMessage::Push(PushEvent::Disconnected));
    app.handle_message(SyncMessage::Push(PushEvent::Connected));
    settle(&mut app, &mut rx).await;

    for kind in SnapshotKind::ALL {
        assert_eq!(backend.fetches(kind), 1, "{}", kind);
    }
    assert!(!app.merger.state().connection.is_stale());
}

#[tokio::test]
async fn test_disconnect_keeps_data_and_flags_stale() {
    let (mut app, _backend, mut rx) = setup();
    app.load_all();
    settle(&mut app, &mut rx).await;
    app.handle_message(SyncMessage::Push(PushEvent::Connected));
    app.handle_message(SyncMessage::Push(PushEvent::BotStatus(BotStatus::Running)));

    app.handle_message(SyncMessage::Push(PushEvent::Disconnected));

    assert_eq!(app.bot_status(), Some(BotStatus::Running));
    assert!(app.merger.state().connection.is_stale());
    assert!(app
        .notifications
        .visible()
        .any(|n| n.title == "Connection Lost"));
}

#[tokio::test]
async fn test_older_snapshot_never_overwrites_newer() {
    let (mut app, _backend, _rx) = setup();
    app.request_refresh(&[SnapshotKind::Balance]);
    app.request_refresh(&[SnapshotKind::Balance]);
    assert_eq!(app.in_flight(SnapshotKind::Balance), 2);

    let balance = |total| {
        Ok(Snapshot::Balance(WalletBalance {
            total_value_usd: total,
            ..WalletBalance::default()
        }))
    };
    app.handle_message(SyncMessage::Snapshot {
        kind: SnapshotKind::Balance,
        seq: 2,
        result: balance(dec!(200)),
    });
    app.handle_message(SyncMessage::Snapshot {
        kind: SnapshotKind::Balance,
        seq: 1,
        result: balance(dec!(100)),
    });

    let vm = app.merger.state();
    assert_eq!(vm.balance.as_ref().unwrap().total_value_usd, dec!(200));
    assert_eq!(vm.portfolio_len(), 1);
    assert_eq!(app.in_flight(SnapshotKind::Balance), 0);
}

#[tokio::test]
async fn test_pushed_trade_is_not_duplicated_by_refresh() {
    let (mut app, backend, mut rx) = setup();
    backend.trades.lock().unwrap().push(trade(9, "TokA"));
    app.load_all();
    settle(&mut app, &mut rx).await;
    backend.reset();

    // the backend already knows the trade it pushes
    backend.trades.lock().unwrap().push(trade(10, "TokB"));
    app.handle_message(SyncMessage::Push(PushEvent::TradeExecuted(trade(10, "TokB"))));
    app.handle_message(SyncMessage::Push(PushEvent::TradeExecuted(trade(10, "TokB"))));
    settle(&mut app, &mut rx).await;

    let trades = &app.merger.state().history.as_ref().unwrap().trades;
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[1].token_address, "TokB");
    assert!(backend.fetches(SnapshotKind::History) >= 1);
    assert!(backend.fetches(SnapshotKind::Balance) >= 1);
}

#[tokio::test]
async fn test_start_round_trip() {
    let (mut app, backend, mut rx) = setup();
    app.load_all();
    settle(&mut app, &mut rx).await;
    assert_eq!(app.bot_status(), Some(BotStatus::Stopped));

    app.handle_key(key('g'));
    app.handle_key(key('y'));
    assert!(app.control.is_pending());
    settle(&mut app, &mut rx).await;

    assert_eq!(*backend.commands.lock().unwrap(), vec![BackendCommand::Start]);
    assert!(!app.control.is_pending());
    assert_eq!(app.bot_status(), Some(BotStatus::Running));
    assert!(app.notifications.visible().any(|n| n.title == "Bot Started"));
}

#[tokio::test]
async fn test_rejected_stop_faults_until_refresh() {
    let (mut app, backend, mut rx) = setup();
    *backend.status.lock().unwrap() = BotStatus::Running;
    app.load_all();
    settle(&mut app, &mut rx).await;

    app.handle_key(key('s'));
    app.handle_key(key('y'));
    settle(&mut app, &mut rx).await;

    assert_eq!(app.display_status(), Some(BotStatus::Error));
    assert!(app.alert.is_some());
    app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));

    app.handle_key(key('r'));
    settle(&mut app, &mut rx).await;
    assert_eq!(app.display_status(), Some(BotStatus::Running));
}

#[tokio::test]
async fn test_poll_tick_refreshes_status_and_balance() {
    let (mut app, backend, mut rx) = setup();
    app.handle_message(SyncMessage::PollTick);
    assert!(app.is_syncing());
    settle(&mut app, &mut rx).await;

    assert_eq!(backend.fetches(SnapshotKind::Status), 1);
    assert_eq!(backend.fetches(SnapshotKind::Balance), 1);
    assert_eq!(backend.fetches(SnapshotKind::History), 0);
    assert_eq!(backend.fetches(SnapshotKind::Settings), 0);
    assert!(!app.is_syncing());
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_data() {
    let (mut app, backend, mut rx) = setup();
    app.load_all();
    settle(&mut app, &mut rx).await;
    let before = app.merger.state().balance.clone();
    assert!(before.is_some());

    backend.failing.lock().unwrap().push(SnapshotKind::Balance);
    app.request_refresh(&[SnapshotKind::Balance]);
    settle(&mut app, &mut rx).await;

    assert_eq!(app.merger.state().balance, before);
    assert!(!app.is_syncing());
    assert!(app
        .notifications
        .visible()
        .any(|n| n.title == "Refresh Failed"));
}

#[tokio::test]
async fn test_superseded_failure_is_silent() {
    let (mut app, _backend, _rx) = setup();
    app.request_refresh(&[SnapshotKind::Balance]);
    app.request_refresh(&[SnapshotKind::Balance]);

    app.handle_message(SyncMessage::Snapshot {
        kind: SnapshotKind::Balance,
        seq: 2,
        result: Ok(Snapshot::Balance(WalletBalance {
            total_value_usd: dec!(200),
            ..WalletBalance::default()
        })),
    });
    app.handle_message(SyncMessage::Snapshot {
        kind: SnapshotKind::Balance,
        seq: 1,
        result: Err(SyncError::Timeout(Duration::from_secs(15))),
    });

    assert!(app.notifications.is_empty());
    assert_eq!(
        app.merger.state().balance.as_ref().unwrap().total_value_usd,
        dec!(200)
    );
    assert_eq!(app.in_flight(SnapshotKind::Balance), 0);
}

#[tokio::test]
async fn test_unanswered_fetch_times_out() {
    // Accepts the connection and never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let timeout = Duration::from_millis(200);
    let client = ApiClient::new(&format!("http://{}", addr), timeout).unwrap();
    let started = std::time::Instant::now();
    let result = client.fetch_snapshot(SnapshotKind::Status).await;

    assert_eq!(result, Err(SyncError::Timeout(timeout)));
    assert!(started.elapsed() < Duration::from_secs(5));
    server.abort();
}
