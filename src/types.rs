use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;

/// The four snapshot kinds the backend serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SnapshotKind {
    Status,
    Balance,
    History,
    Settings,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 4] = [
        SnapshotKind::Status,
        SnapshotKind::Balance,
        SnapshotKind::History,
        SnapshotKind::Settings,
    ];

    /// REST path serving this snapshot
    pub fn path(&self) -> &'static str {
        match self {
            SnapshotKind::Status => "/api/status",
            SnapshotKind::Balance => "/api/balance",
            SnapshotKind::History => "/api/history",
            SnapshotKind::Settings => "/api/settings",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SnapshotKind::Status => "status",
            SnapshotKind::Balance => "balance",
            SnapshotKind::History => "history",
            SnapshotKind::Settings => "settings",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bot run status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotStatus {
    #[default]
    Stopped,
    Running,
    Error,
}

impl BotStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stopped" => Some(BotStatus::Stopped),
            "running" => Some(BotStatus::Running),
            "error" => Some(BotStatus::Error),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BotStatus::Stopped => "STOPPED",
            BotStatus::Running => "RUNNING",
            BotStatus::Error => "ERROR",
        }
    }
}

/// Profit and loss summary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pnl {
    pub amount: Decimal,
    pub percentage: Decimal,
    pub usd_value: Decimal,
}

/// Current state of the trading bot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BotState {
    pub status: BotStatus,
    pub uptime_seconds: u64,
    pub trade_count: u64,
    pub pnl: Pnl,
    pub wallet_initialized: bool,
    pub telegram_connected: bool,
}

/// A single SPL token held by the bot wallet
#[derive(Debug, Clone, PartialEq)]
pub struct TokenHolding {
    pub symbol: String,
    pub address: String,
    pub balance: Decimal,
    pub price_usd: Decimal,
    pub value_usd: Decimal,
}

/// Wallet balance, always replaced wholesale
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WalletBalance {
    pub sol_balance: Decimal,
    pub sol_value_usd: Decimal,
    pub total_value_usd: Decimal,
    pub wallet_address: Option<String>,
    pub tokens: Vec<TokenHolding>,
}

impl WalletBalance {
    /// Summed USD value of every non-SOL holding
    pub fn token_value_usd(&self) -> Decimal {
        self.tokens.iter().map(|t| t.value_usd).sum()
    }

    /// Allocation split `[SOL, other tokens]` in USD
    pub fn allocation(&self) -> [Decimal; 2] {
        [self.sol_value_usd, self.token_value_usd()]
    }
}

/// Trade record. A missing return means the position is still open.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub timestamp: NaiveDateTime,
    pub token_address: String,
    pub amount_invested: Decimal,
    pub amount_returned: Option<Decimal>,
}

impl Trade {
    pub fn derived_profit(&self) -> Option<Decimal> {
        self.amount_returned.map(|r| r - self.amount_invested)
    }

    pub fn is_pending(&self) -> bool {
        self.amount_returned.is_none()
    }

    /// Identity used to dedupe pushed trades against history snapshots
    pub fn key(&self) -> (NaiveDateTime, &str) {
        (self.timestamp, self.token_address.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Send,
    Receive,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Send => "send",
            TransactionKind::Receive => "receive",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub timestamp: NaiveDateTime,
    pub kind: TransactionKind,
    pub asset: String,
    pub amount: Decimal,
}

/// Trade and transaction history, replaced together
#[derive(Debug, Clone, PartialEq, Default)]
pub struct History {
    pub trades: Vec<Trade>,
    pub transactions: Vec<Transaction>,
}

/// Trading parameters configured on the backend
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub trade_amount: Decimal,
    pub target_multiplier: Decimal,
    pub channel: Option<String>,
}

/// A fully decoded snapshot payload
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Status(BotState),
    Balance(WalletBalance),
    History(History),
    Settings(Settings),
}

impl Snapshot {
    pub fn kind(&self) -> SnapshotKind {
        match self {
            Snapshot::Status(_) => SnapshotKind::Status,
            Snapshot::Balance(_) => SnapshotKind::Balance,
            Snapshot::History(_) => SnapshotKind::History,
            Snapshot::Settings(_) => SnapshotKind::Settings,
        }
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Accepts the backend's `type` field, including the `danger` alias
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Severity::Success,
            "warning" => Severity::Warning,
            "error" | "danger" => Severity::Error,
            _ => Severity::Info,
        }
    }
}
