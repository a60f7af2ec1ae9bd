use crate::error::SyncError;
use crate::types::{
    BotState, BotStatus, History, Pnl, Settings, Snapshot, SnapshotKind, TokenHolding, Trade,
    Transaction, TransactionKind, WalletBalance,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Custom deserializer that accepts either plain seconds or the backend's `"1h 2m 3s"` string
fn deserialize_uptime<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SecondsOrText {
        Seconds(u64),
        Text(String),
    }

    match SecondsOrText::deserialize(deserializer)? {
        SecondsOrText::Seconds(s) => Ok(s),
        SecondsOrText::Text(s) => {
            parse_uptime(&s).ok_or_else(|| D::Error::custom(format!("bad uptime '{}'", s)))
        }
    }
}

/// Parse `"3h 25m 7s"` (any subset of units, any order) into seconds.
/// Overflowing values are rejected rather than wrapped.
pub fn parse_uptime(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<u64>() {
        return Some(secs);
    }

    let mut total = 0u64;
    let mut seen = false;
    for part in text.split_whitespace() {
        let (digits, unit) = part.split_at(part.find(|c: char| !c.is_ascii_digit())?);
        let value: u64 = digits.parse().ok()?;
        let factor = match unit {
            "d" => 86_400,
            "h" => 3_600,
            "m" => 60,
            "s" => 1,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(factor)?)?;
        seen = true;
    }
    seen.then_some(total)
}

/// Backend timestamps are naive local `%Y-%m-%d %H:%M:%S`; ISO-8601 is accepted too
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, SyncError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_local()))
        .map_err(|_| SyncError::Malformed(format!("unparseable timestamp '{}'", raw)))
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PnlWire {
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub percentage: Decimal,
    #[serde(default)]
    pub usd: Decimal,
}

/// `/api/status` body, also the `status_update` push payload
#[derive(Debug, Clone, Deserialize)]
pub struct StatusWire {
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_uptime")]
    pub uptime: u64,
    #[serde(default)]
    pub trades: u64,
    #[serde(default)]
    pub pnl: PnlWire,
    #[serde(default)]
    pub wallet_initialized: bool,
    #[serde(default)]
    pub telegram_connected: bool,
}

impl TryFrom<StatusWire> for BotState {
    type Error = SyncError;

    fn try_from(w: StatusWire) -> Result<Self, Self::Error> {
        let status = BotStatus::parse(&w.status)
            .ok_or_else(|| SyncError::Malformed(format!("unknown bot status '{}'", w.status)))?;
        Ok(BotState {
            status,
            uptime_seconds: w.uptime,
            trade_count: w.trades,
            pnl: Pnl {
                amount: w.pnl.amount,
                percentage: w.pnl.percentage,
                usd_value: w.pnl.usd,
            },
            wallet_initialized: w.wallet_initialized,
            telegram_connected: w.telegram_connected,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolWire {
    pub balance: Decimal,
    pub value: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenWire {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub balance: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub value: Option<Decimal>,
}

impl TryFrom<TokenWire> for TokenHolding {
    type Error = SyncError;

    fn try_from(t: TokenWire) -> Result<Self, Self::Error> {
        let symbol = t.symbol.unwrap_or_else(|| "Unknown".to_string());
        // Backend-provided value wins; only derive it when absent
        let value_usd = match t.value {
            Some(value) => value,
            None => t.balance.checked_mul(t.price).ok_or_else(|| {
                SyncError::Malformed(format!("value of {} overflows", symbol))
            })?,
        };
        Ok(Self {
            symbol,
            address: t.address.unwrap_or_default(),
            balance: t.balance,
            price_usd: t.price,
            value_usd,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceWire {
    pub sol: SolWire,
    pub total_value: Decimal,
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(default)]
    pub tokens: Vec<TokenWire>,
}

impl TryFrom<BalanceWire> for WalletBalance {
    type Error = SyncError;

    fn try_from(b: BalanceWire) -> Result<Self, Self::Error> {
        let tokens = b
            .tokens
            .into_iter()
            .map(TokenHolding::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        // The allocation chart sums these on every frame
        tokens
            .iter()
            .try_fold(b.sol.value, |acc, t| acc.checked_add(t.value_usd))
            .ok_or_else(|| SyncError::Malformed("wallet value overflows".to_string()))?;

        Ok(Self {
            sol_balance: b.sol.balance,
            sol_value_usd: b.sol.value,
            total_value_usd: b.total_value,
            wallet_address: b.wallet,
            tokens,
        })
    }
}

/// Trade as found in `/api/history` and in `trade_executed` pushes
#[derive(Debug, Clone, Deserialize)]
pub struct TradeWire {
    pub date: String,
    #[serde(default)]
    pub token: Option<String>,
    pub amount: Decimal,
    #[serde(rename = "return", default)]
    pub returned: Option<Decimal>,
}

impl TryFrom<TradeWire> for Trade {
    type Error = SyncError;

    fn try_from(w: TradeWire) -> Result<Self, Self::Error> {
        Ok(Trade {
            timestamp: parse_timestamp(&w.date)?,
            token_address: w.token.unwrap_or_else(|| "unknown".to_string()),
            amount_invested: w.amount,
            amount_returned: w.returned,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionWire {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub asset: String,
    pub amount: Decimal,
}

impl TryFrom<TransactionWire> for Transaction {
    type Error = SyncError;

    fn try_from(w: TransactionWire) -> Result<Self, Self::Error> {
        let kind = match w.kind.to_ascii_lowercase().as_str() {
            "send" => TransactionKind::Send,
            "receive" => TransactionKind::Receive,
            other => {
                return Err(SyncError::Malformed(format!(
                    "unknown transaction type '{}'",
                    other
                )))
            }
        };
        Ok(Transaction {
            timestamp: parse_timestamp(&w.date)?,
            kind,
            asset: w.asset,
            amount: w.amount,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryWire {
    #[serde(default)]
    pub trades: Vec<TradeWire>,
    #[serde(default)]
    pub transactions: Vec<TransactionWire>,
}

impl TryFrom<HistoryWire> for History {
    type Error = SyncError;

    fn try_from(w: HistoryWire) -> Result<Self, Self::Error> {
        Ok(History {
            trades: w
                .trades
                .into_iter()
                .map(Trade::try_from)
                .collect::<Result<_, _>>()?,
            transactions: w
                .transactions
                .into_iter()
                .map(Transaction::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsWire {
    pub trade_amount: Decimal,
    pub target_multiplier: Decimal,
    #[serde(default)]
    pub channel: Option<String>,
}

impl From<SettingsWire> for Settings {
    fn from(w: SettingsWire) -> Self {
        let channel = w
            .channel
            .filter(|c| !c.is_empty() && c != "Not configured");
        Self {
            trade_amount: w.trade_amount,
            target_multiplier: w.target_multiplier,
            channel,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CommandResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn backend_error(value: &serde_json::Value) -> Option<String> {
    value
        .get("error")
        .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
}

/// Decode a snapshot body of the given kind
pub fn decode_snapshot(kind: SnapshotKind, body: &str) -> Result<Snapshot, SyncError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if let Some(error) = backend_error(&value) {
        return Err(SyncError::Malformed(format!(
            "{} endpoint returned error: {}",
            kind, error
        )));
    }

    let snapshot = match kind {
        SnapshotKind::Status => {
            Snapshot::Status(serde_json::from_value::<StatusWire>(value)?.try_into()?)
        }
        SnapshotKind::Balance => {
            Snapshot::Balance(serde_json::from_value::<BalanceWire>(value)?.try_into()?)
        }
        SnapshotKind::History => {
            Snapshot::History(serde_json::from_value::<HistoryWire>(value)?.try_into()?)
        }
        SnapshotKind::Settings => {
            Snapshot::Settings(serde_json::from_value::<SettingsWire>(value)?.into())
        }
    };
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Mutating requests the dashboard can send
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    Start,
    Stop,
    UpdateSettings {
        trade_amount: Decimal,
        target_multiplier: Decimal,
    },
    SendFunds {
        receiver: String,
        amount: Decimal,
        asset: String,
    },
}

impl BackendCommand {
    pub fn path(&self) -> &'static str {
        match self {
            BackendCommand::Start => "/api/start",
            BackendCommand::Stop => "/api/stop",
            BackendCommand::UpdateSettings { .. } => "/api/settings",
            BackendCommand::SendFunds { .. } => "/api/send",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BackendCommand::Start => "Start bot",
            BackendCommand::Stop => "Stop bot",
            BackendCommand::UpdateSettings { .. } => "Update settings",
            BackendCommand::SendFunds { .. } => "Send funds",
        }
    }

    fn body(&self) -> Option<serde_json::Value> {
        let num = |d: &Decimal| d.to_f64().unwrap_or_default();
        match self {
            BackendCommand::Start | BackendCommand::Stop => None,
            BackendCommand::UpdateSettings {
                trade_amount,
                target_multiplier,
            } => Some(serde_json::json!({
                "trade_amount": num(trade_amount),
                "target_multiplier": num(target_multiplier),
            })),
            BackendCommand::SendFunds {
                receiver,
                amount,
                asset,
            } => Some(serde_json::json!({
                "receiver": receiver,
                "amount": num(amount),
                "asset": asset,
            })),
        }
    }
}

/// Interpret a command reply; any `error` field means the backend refused
pub fn decode_command_reply(success: bool, status: u16, body: &str) -> Result<String, SyncError> {
    let reply: CommandResponse = serde_json::from_str(body).unwrap_or_default();
    if let Some(error) = reply.error {
        return Err(SyncError::CommandRejected(error));
    }
    if !success {
        return Err(SyncError::CommandRejected(format!("HTTP {}", status)));
    }
    Ok(reply.message.unwrap_or_else(|| "OK".to_string()))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Everything the dashboard needs from the backend
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    async fn fetch_snapshot(&self, kind: SnapshotKind) -> Result<Snapshot, SyncError>;

    /// Returns the backend's confirmation message
    async fn send_command(&self, command: &BackendCommand) -> Result<String, SyncError>;
}

/// REST client for the SignalForge backend
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    async fn get_snapshot(&self, kind: SnapshotKind) -> Result<Snapshot, SyncError> {
        let url = format!("{}{}", self.base_url, kind.path());
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SyncError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::from_reqwest(e, self.timeout))?;

        if !status.is_success() {
            let error = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| backend_error(&v));
            return Err(match error {
                Some(msg) => {
                    SyncError::Malformed(format!("{} endpoint returned error: {}", kind, msg))
                }
                None => SyncError::Network(format!("HTTP {} from {}", status, kind.path())),
            });
        }

        decode_snapshot(kind, &body)
    }

    async fn post_command(&self, command: &BackendCommand) -> Result<String, SyncError> {
        let url = format!("{}{}", self.base_url, command.path());
        let mut request = self.http.post(&url);
        if let Some(body) = command.body() {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::from_reqwest(e, self.timeout))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::from_reqwest(e, self.timeout))?;

        decode_command_reply(status.is_success(), status.as_u16(), &body)
    }
}

#[async_trait]
impl DashboardBackend for ApiClient {
    async fn fetch_snapshot(&self, kind: SnapshotKind) -> Result<Snapshot, SyncError> {
        match tokio::time::timeout(self.timeout, self.get_snapshot(kind)).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(self.timeout)),
        }
    }

    async fn send_command(&self, command: &BackendCommand) -> Result<String, SyncError> {
        tracing::info!("Sending {} to {}", command.label(), command.path());
        match tokio::time::timeout(self.timeout, self.post_command(command)).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(self.timeout)),
        }
    }
}
