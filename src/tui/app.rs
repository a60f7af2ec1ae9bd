use crate::api::{BackendCommand, DashboardBackend};
use crate::config::Config;
use crate::export::export_history;
use crate::sync::{
    BotControl, ControlCommand, Directive, EventListener, Merger, NotificationQueue, PushEvent,
    SequenceTracker, SyncMessage,
};
use crate::types::{BotStatus, Severity, SnapshotKind};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Available tabs in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Wallet,
    Trades,
    Transactions,
    Analytics,
    Settings,
    Logs,
}

impl Tab {
    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Wallet,
            Tab::Wallet => Tab::Trades,
            Tab::Trades => Tab::Transactions,
            Tab::Transactions => Tab::Analytics,
            Tab::Analytics => Tab::Settings,
            Tab::Settings => Tab::Logs,
            Tab::Logs => Tab::Dashboard,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Logs,
            Tab::Wallet => Tab::Dashboard,
            Tab::Trades => Tab::Wallet,
            Tab::Transactions => Tab::Trades,
            Tab::Analytics => Tab::Transactions,
            Tab::Settings => Tab::Analytics,
            Tab::Logs => Tab::Settings,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Wallet => "Wallet",
            Tab::Trades => "Trades",
            Tab::Transactions => "Transactions",
            Tab::Analytics => "Analytics",
            Tab::Settings => "Settings",
            Tab::Logs => "Logs",
        }
    }

    /// Snapshots re-fetched when the tab is opened
    pub fn refresh_kinds(&self) -> &'static [SnapshotKind] {
        match self {
            Tab::Wallet => &[SnapshotKind::Balance],
            Tab::Trades | Tab::Transactions | Tab::Analytics => &[SnapshotKind::History],
            Tab::Settings => &[SnapshotKind::Settings],
            Tab::Dashboard | Tab::Logs => &[],
        }
    }

    pub fn all() -> [Tab; 7] {
        [
            Tab::Dashboard,
            Tab::Wallet,
            Tab::Trades,
            Tab::Transactions,
            Tab::Analytics,
            Tab::Settings,
            Tab::Logs,
        ]
    }
}

/// Action waiting on a Yes/No confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Quit,
    Control(ControlCommand),
    Send(BackendCommand),
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::Quit => "Are you sure you want to quit?".to_string(),
            PendingAction::Control(ControlCommand::Start) => {
                "Are you sure you want to start the bot?".to_string()
            }
            PendingAction::Control(ControlCommand::Stop) => {
                "Are you sure you want to stop the bot?".to_string()
            }
            PendingAction::Send(BackendCommand::SendFunds {
                receiver,
                amount,
                asset,
            }) => format!("Send {} {} to {}?", amount.normalize(), asset, receiver),
            PendingAction::Send(cmd) => format!("{}?", cmd.label()),
        }
    }
}

/// Input mode for command entry
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Command,
    Confirm(PendingAction),
    /// Blocking alert, dismissed with Enter or Esc
    Alert,
}

/// Confirmation selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmSelection {
    No, // Default
    Yes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Log entry for the logs tab
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl From<Severity> for LogLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => LogLevel::Info,
            Severity::Success => LogLevel::Success,
            Severity::Warning => LogLevel::Warning,
            Severity::Error => LogLevel::Error,
        }
    }
}

/// Main application state. Every mutation goes through `handle_message` or `handle_key`.
pub struct App {
    pub config: Config,
    backend: Arc<dyn DashboardBackend>,
    tx: mpsc::UnboundedSender<SyncMessage>,

    pub merger: Merger,
    sequences: SequenceTracker,
    listener: EventListener,
    pub control: BotControl,
    pub notifications: NotificationQueue,
    in_flight: HashMap<SnapshotKind, usize>,

    pub current_tab: Tab,
    pub should_quit: bool,
    pub logs: Vec<LogEntry>,

    // Command input
    pub input_mode: InputMode,
    pub command_input: String,
    pub confirm_selection: ConfirmSelection,
    pub alert: Option<Alert>,

    clipboard: Option<String>,
}

impl App {
    pub fn new(
        config: Config,
        backend: Arc<dyn DashboardBackend>,
        tx: mpsc::UnboundedSender<SyncMessage>,
    ) -> Self {
        let notifications =
            NotificationQueue::new(config.notification_capacity, config.notification_ttl());
        let mut app = Self {
            config,
            backend,
            tx,
            merger: Merger::new(),
            sequences: SequenceTracker::new(),
            listener: EventListener::new(),
            control: BotControl::new(),
            notifications,
            in_flight: HashMap::new(),
            current_tab: Tab::Dashboard,
            should_quit: false,
            logs: Vec::new(),
            input_mode: InputMode::Normal,
            command_input: String::new(),
            confirm_selection: ConfirmSelection::No,
            alert: None,
            clipboard: None,
        };

        app.add_log(LogLevel::Info, "Dashboard initialized");
        app.add_log(LogLevel::Info, "Press ':' to enter command mode, 'h' for help");
        app
    }

    pub fn add_log(&mut self, level: LogLevel, message: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        self.logs.push(LogEntry {
            timestamp,
            level,
            message: message.to_string(),
        });

        // Keep only last 100 logs
        if self.logs.len() > 100 {
            self.logs.remove(0);
        }
    }

    pub fn notify(&mut self, title: &str, message: &str, severity: Severity) {
        self.notifications
            .enqueue(title, message, severity, Instant::now());
        self.add_log(severity.into(), &format!("{}: {}", title, message));
    }

    /// Bot status as last reported by the backend
    pub fn bot_status(&self) -> Option<BotStatus> {
        self.merger.state().bot.as_ref().map(|b| b.status)
    }

    /// Status shown in the header badge, local faults included
    pub fn display_status(&self) -> Option<BotStatus> {
        self.control.display_status(self.bot_status())
    }

    pub fn is_syncing(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight(&self, kind: SnapshotKind) -> usize {
        self.in_flight.get(&kind).copied().unwrap_or(0)
    }

    /// Clipboard payload requested by the last copy action, if any
    pub fn take_clipboard(&mut self) -> Option<String> {
        self.clipboard.take()
    }

    /// Initial load of every snapshot kind
    pub fn load_all(&mut self) {
        self.request_refresh(&SnapshotKind::ALL);
    }

    /// Issue one fetch per kind, each stamped with a fresh sequence number
    pub fn request_refresh(&mut self, kinds: &[SnapshotKind]) {
        for &kind in kinds {
            let seq = self.sequences.next(kind);
            *self.in_flight.entry(kind).or_insert(0) += 1;
            tracing::debug!("Fetching {} snapshot #{}", kind, seq);

            let backend = Arc::clone(&self.backend);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let result = backend.fetch_snapshot(kind).await;
                let _ = tx.send(SyncMessage::Snapshot { kind, seq, result });
            });
        }
    }

    fn dispatch_command(&mut self, command: BackendCommand) {
        self.add_log(LogLevel::Info, &format!("{}...", command.label()));
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.send_command(&command).await;
            let _ = tx.send(SyncMessage::CommandDone { command, result });
        });
    }

    pub fn handle_message(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::Snapshot { kind, seq, result } => self.on_snapshot(kind, seq, result),
            SyncMessage::Push(event) => self.on_push(event),
            SyncMessage::CommandDone { command, result } => self.on_command_done(command, result),
            SyncMessage::PollTick => {
                self.request_refresh(&[SnapshotKind::Status, SnapshotKind::Balance]);
            }
            SyncMessage::Sweep => {
                let expired = self.notifications.sweep(Instant::now());
                if expired > 0 {
                    tracing::trace!("Expired {} notifications", expired);
                }
            }
        }
    }

    fn on_snapshot(
        &mut self,
        kind: SnapshotKind,
        seq: u64,
        result: Result<crate::types::Snapshot, crate::error::SyncError>,
    ) {
        if let Some(count) = self.in_flight.get_mut(&kind) {
            *count -= 1;
            if *count == 0 {
                self.in_flight.remove(&kind);
            }
        }

        match result {
            Ok(snapshot) => match self.merger.ingest_snapshot(seq, snapshot) {
                Ok(()) => tracing::debug!("Applied {} snapshot #{}", kind, seq),
                Err(e) if !e.is_user_visible() => tracing::debug!("{}", e),
                Err(e) => tracing::warn!("Could not apply {} snapshot: {}", kind, e),
            },
            Err(e) => {
                if self.merger.is_superseded(kind, seq) {
                    tracing::debug!(
                        "Ignoring failure of superseded {} fetch #{}: {}",
                        kind,
                        seq,
                        e
                    );
                    return;
                }
                tracing::warn!("Failed to load {}: {}", kind, e);
                self.notify(
                    "Refresh Failed",
                    &format!("Failed to load {}: {}", kind, e),
                    Severity::Warning,
                );
            }
        }
    }

    fn on_push(&mut self, event: PushEvent) {
        match &event {
            PushEvent::Connected => tracing::info!("Push channel live"),
            PushEvent::Disconnected => tracing::debug!("Push channel down"),
            _ => tracing::debug!("Push event: {:?}", event),
        }

        self.merger.ingest_event(&event);
        for directive in self.listener.on_event(&event) {
            match directive {
                Directive::Resync => {
                    self.add_log(LogLevel::Info, "Reconnected, resynchronizing all data");
                    self.request_refresh(&SnapshotKind::ALL);
                }
                Directive::Refresh(kinds) => self.request_refresh(&kinds),
                Directive::Notify {
                    title,
                    message,
                    severity,
                } => self.notify(&title, &message, severity),
            }
        }
    }

    fn on_command_done(
        &mut self,
        command: BackendCommand,
        result: Result<String, crate::error::SyncError>,
    ) {
        match command {
            BackendCommand::Start | BackendCommand::Stop => {
                self.control.complete(&result);
                match result {
                    Ok(message) => {
                        let (title, severity) = if command == BackendCommand::Start {
                            ("Bot Started", Severity::Success)
                        } else {
                            ("Bot Stopped", Severity::Warning)
                        };
                        self.notify(title, &message, severity);
                        self.request_refresh(&[SnapshotKind::Status]);
                    }
                    Err(e) => {
                        tracing::error!("{} failed: {}", command.label(), e);
                        self.add_log(
                            LogLevel::Error,
                            &format!("{} failed: {}", command.label(), e),
                        );
                        self.raise_alert(
                            &format!("{} Failed", command.label()),
                            &format!("{}\n\nPress 'a' to acknowledge and refresh status.", e),
                        );
                    }
                }
            }
            BackendCommand::UpdateSettings { .. } => match result {
                Ok(message) => {
                    self.notify("Settings Saved", &message, Severity::Success);
                    self.request_refresh(&[SnapshotKind::Settings]);
                }
                Err(e) => {
                    tracing::warn!("Settings update failed: {}", e);
                    self.add_log(LogLevel::Error, &format!("Failed to save settings: {}", e));
                    self.raise_alert("Settings Not Saved", &e.to_string());
                }
            },
            BackendCommand::SendFunds { .. } => match result {
                Ok(message) => {
                    self.notify("Success", &message, Severity::Success);
                    self.request_refresh(&[SnapshotKind::Balance, SnapshotKind::History]);
                }
                Err(e) => {
                    tracing::warn!("Send failed: {}", e);
                    self.add_log(LogLevel::Error, &format!("Failed to send funds: {}", e));
                    self.raise_alert("Send Failed", &e.to_string());
                }
            },
        }
    }

    fn raise_alert(&mut self, title: &str, message: &str) {
        self.alert = Some(Alert {
            title: title.to_string(),
            message: message.to_string(),
        });
        self.command_input.clear();
        self.input_mode = InputMode::Alert;
    }

    pub fn handle_key(&mut self, event: KeyEvent) {
        match self.input_mode.clone() {
            InputMode::Command => self.handle_command_input(event),
            InputMode::Confirm(action) => self.handle_confirmation(event, action),
            InputMode::Alert => self.handle_alert(event),
            InputMode::Normal => self.handle_normal_input(event),
        }
    }

    fn handle_alert(&mut self, event: KeyEvent) {
        if matches!(event.code, KeyCode::Enter | KeyCode::Esc) {
            self.alert = None;
            self.input_mode = InputMode::Normal;
        }
    }

    fn handle_command_input(&mut self, event: KeyEvent) {
        match event.code {
            KeyCode::Enter => {
                let command = self.command_input.clone();
                self.command_input.clear();
                self.input_mode = InputMode::Normal;
                self.execute_command(&command);
            }
            KeyCode::Esc => {
                self.command_input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.command_input.pop();
            }
            KeyCode::Char(c) => {
                self.command_input.push(c);
            }
            _ => {}
        }
    }

    pub fn execute_command(&mut self, command: &str) {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return;
        }

        let cmd = parts[0].to_lowercase();
        let args: Vec<&str> = parts[1..].to_vec();

        match cmd.as_str() {
            "/set" | "set" => match args.as_slice() {
                ["amount", value] => self.update_settings(Some(*value), None),
                ["multiplier", value] => self.update_settings(None, Some(*value)),
                _ => self.add_log(
                    LogLevel::Warning,
                    "Usage: /set amount <sol> | /set multiplier <x>",
                ),
            },
            "/send" | "send" => match args.as_slice() {
                [receiver, amount] => self.prepare_send(receiver, amount, "SOL"),
                [receiver, amount, asset] => self.prepare_send(receiver, amount, asset),
                _ => self.add_log(LogLevel::Warning, "Usage: /send <receiver> <amount> [asset]"),
            },
            "/refresh" | "refresh" | "/r" => self.manual_refresh(),
            "/export" | "export" => self.export(),
            "/help" | "help" | "/h" | "?" => self.show_command_help(),
            _ => {
                self.add_log(LogLevel::Warning, &format!("Unknown command: {}", cmd));
                self.add_log(LogLevel::Info, "Type /help for available commands");
            }
        }
    }

    fn update_settings(&mut self, amount: Option<&str>, multiplier: Option<&str>) {
        let Some(current) = self.merger.state().settings.clone() else {
            self.notify("Error", "Settings not loaded yet", Severity::Error);
            return;
        };

        let trade_amount = match amount.map(str::parse::<Decimal>) {
            None => current.trade_amount,
            Some(Ok(v)) if v > Decimal::ZERO => v,
            Some(_) => {
                self.notify(
                    "Error",
                    "Trade amount must be a number greater than 0",
                    Severity::Error,
                );
                return;
            }
        };
        let target_multiplier = match multiplier.map(str::parse::<Decimal>) {
            None => current.target_multiplier,
            Some(Ok(v)) if v > Decimal::ONE => v,
            Some(_) => {
                self.notify("Error", "Target multiplier must be greater than 1", Severity::Error);
                return;
            }
        };

        self.dispatch_command(BackendCommand::UpdateSettings {
            trade_amount,
            target_multiplier,
        });
    }

    fn prepare_send(&mut self, receiver: &str, amount: &str, asset: &str) {
        let amount = match amount.parse::<Decimal>() {
            Ok(v) if v > Decimal::ZERO => v,
            _ => {
                self.notify("Error", "Amount must be a number greater than 0", Severity::Error);
                return;
            }
        };
        let action = PendingAction::Send(BackendCommand::SendFunds {
            receiver: receiver.to_string(),
            amount,
            asset: asset.to_uppercase(),
        });
        self.ask_confirmation(action);
    }

    fn ask_confirmation(&mut self, action: PendingAction) {
        self.confirm_selection = ConfirmSelection::No;
        self.input_mode = InputMode::Confirm(action);
    }

    fn request_control(&mut self, command: ControlCommand) {
        let status = self.bot_status();
        let allowed = match command {
            ControlCommand::Start => self.control.can_start(status),
            ControlCommand::Stop => self.control.can_stop(status),
        };
        if allowed {
            self.ask_confirmation(PendingAction::Control(command));
        } else if self.control.is_pending() {
            self.add_log(LogLevel::Warning, "A bot command is already in flight");
        } else {
            self.add_log(
                LogLevel::Warning,
                &format!("Cannot {} the bot right now", command.label()),
            );
        }
    }

    fn manual_refresh(&mut self) {
        if self.control.acknowledge() {
            self.add_log(LogLevel::Info, "Bot error acknowledged");
        }
        self.notify("Info", "Refreshing data...", Severity::Info);
        self.request_refresh(&SnapshotKind::ALL);
    }

    fn acknowledge(&mut self) {
        if self.control.acknowledge() {
            self.add_log(LogLevel::Info, "Bot error acknowledged");
            self.request_refresh(&[SnapshotKind::Status]);
        }
    }

    fn export(&mut self) {
        let Some(history) = self.merger.state().history.as_ref() else {
            self.notify("Export", "Trade history not loaded yet", Severity::Warning);
            return;
        };

        match export_history(&history.trades, &self.config.export_dir, chrono::Local::now()) {
            Ok(path) => self.notify(
                "Export",
                &format!("History exported to {}", path.display()),
                Severity::Success,
            ),
            Err(e) => {
                tracing::error!("Export failed: {:#}", e);
                self.notify("Error", &format!("Export failed: {}", e), Severity::Error);
            }
        }
    }

    fn copy_wallet_address(&mut self) {
        let address = self
            .merger
            .state()
            .balance
            .as_ref()
            .and_then(|b| b.wallet_address.clone());
        match address {
            Some(address) => {
                self.clipboard = Some(address);
                self.notify("Success", "Wallet address copied to clipboard", Severity::Success);
            }
            None => self.notify("Error", "No wallet address to copy", Severity::Error),
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        if self.current_tab != tab {
            self.current_tab = tab;
            self.request_refresh(tab.refresh_kinds());
        }
    }

    fn show_command_help(&mut self) {
        self.add_log(LogLevel::Info, "─── Available Commands ───");
        self.add_log(LogLevel::Info, "/set amount <sol>              - Set trade amount");
        self.add_log(LogLevel::Info, "/set multiplier <x>            - Set target multiplier");
        self.add_log(LogLevel::Info, "/send <receiver> <amt> [asset] - Send funds");
        self.add_log(LogLevel::Info, "/refresh                       - Reload all data");
        self.add_log(LogLevel::Info, "/export                        - Export trade history");
        self.add_log(LogLevel::Info, "/help                          - Show this help");
    }

    fn show_key_help(&mut self) {
        self.add_log(LogLevel::Info, "─── Keyboard Shortcuts ───");
        self.add_log(LogLevel::Info, ":        : Enter command mode");
        self.add_log(LogLevel::Info, "Tab/←/→  : Navigate tabs (1-7 to jump)");
        self.add_log(LogLevel::Info, "G        : Start bot");
        self.add_log(LogLevel::Info, "S        : Stop bot");
        self.add_log(LogLevel::Info, "R        : Refresh all data");
        self.add_log(LogLevel::Info, "A        : Acknowledge bot error");
        self.add_log(LogLevel::Info, "E        : Export trade history");
        self.add_log(LogLevel::Info, "Y        : Copy wallet address");
        self.add_log(LogLevel::Info, "X        : Dismiss notifications");
        self.add_log(LogLevel::Info, "Q        : Quit");
    }

    fn handle_normal_input(&mut self, event: KeyEvent) {
        match event.code {
            // Ctrl+C
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }

            // Enter command mode
            KeyCode::Char(':') | KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input = "/".to_string();
            }

            // Quit - show confirmation modal
            KeyCode::Char('q') | KeyCode::Char('Q') => self.ask_confirmation(PendingAction::Quit),

            // Tab navigation
            KeyCode::Tab | KeyCode::Right => self.select_tab(self.current_tab.next()),
            KeyCode::BackTab | KeyCode::Left => self.select_tab(self.current_tab.prev()),
            KeyCode::Char(c @ '1'..='7') => {
                let index = c as usize - '1' as usize;
                self.select_tab(Tab::all()[index]);
            }

            // Bot control
            KeyCode::Char('g') | KeyCode::Char('G') => self.request_control(ControlCommand::Start),
            KeyCode::Char('s') | KeyCode::Char('S') => self.request_control(ControlCommand::Stop),
            KeyCode::Char('a') | KeyCode::Char('A') => self.acknowledge(),

            KeyCode::Char('r') | KeyCode::Char('R') => self.manual_refresh(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
            KeyCode::Char('y') | KeyCode::Char('Y') => self.copy_wallet_address(),
            KeyCode::Char('x') | KeyCode::Char('X') => self.notifications.dismiss_all(),
            KeyCode::Char('h') | KeyCode::Char('H') => self.show_key_help(),

            _ => {}
        }
    }

    fn handle_confirmation(&mut self, event: KeyEvent, action: PendingAction) {
        match event.code {
            // Toggle selection with Left/Right or Tab
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.confirm_selection = match self.confirm_selection {
                    ConfirmSelection::No => ConfirmSelection::Yes,
                    ConfirmSelection::Yes => ConfirmSelection::No,
                };
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.input_mode = InputMode::Normal;
                self.confirm(action);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            // Confirm selection with Enter
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                if self.confirm_selection == ConfirmSelection::Yes {
                    self.confirm(action);
                }
            }
            _ => {}
        }
    }

    fn confirm(&mut self, action: PendingAction) {
        match action {
            PendingAction::Quit => self.should_quit = true,
            PendingAction::Control(command) => {
                match self.control.begin(command, self.bot_status()) {
                    Ok(()) => self.dispatch_command(command.into()),
                    Err(e) => self.add_log(LogLevel::Warning, &e.to_string()),
                }
            }
            PendingAction::Send(command) => self.dispatch_command(command),
        }
    }
}
