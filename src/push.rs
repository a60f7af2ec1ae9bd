//! Live push channel: a minimal Socket.IO (Engine.IO v4) client over WebSocket.

use crate::api::{StatusWire, TradeWire};
use crate::error::SyncError;
use crate::sync::{PushEvent, SyncMessage};
use crate::types::{BotState, BotStatus, Severity, Trade};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// One decoded Engine.IO / Socket.IO text frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Engine.IO handshake (`0{...}`)
    Open,
    Close,
    Ping,
    Pong,
    Noop,
    /// Namespace connected (`40`)
    Connect,
    /// Namespace disconnected by the server (`41`)
    Disconnect,
    /// `42["name", payload]`
    Event { name: String, payload: Value },
    /// `44{"message": ...}`
    ConnectError(String),
}

/// Decode a raw text frame; `None` for anything this client does not speak
pub fn decode_frame(text: &str) -> Option<Frame> {
    let mut chars = text.chars();
    match chars.next()? {
        '0' => Some(Frame::Open),
        '1' => Some(Frame::Close),
        '2' => Some(Frame::Ping),
        '3' => Some(Frame::Pong),
        '6' => Some(Frame::Noop),
        '4' => decode_packet(chars.as_str()),
        _ => None,
    }
}

fn decode_packet(packet: &str) -> Option<Frame> {
    let mut chars = packet.chars();
    let kind = chars.next()?;
    // Optional "/namespace," and ack id precede the data
    let rest = chars.as_str();
    let data = match rest.find(|c: char| c == '[' || c == '{') {
        Some(i) => &rest[i..],
        None => "",
    };

    match kind {
        '0' => Some(Frame::Connect),
        '1' => Some(Frame::Disconnect),
        '2' => {
            let mut items = match serde_json::from_str::<Value>(data).ok()? {
                Value::Array(items) if !items.is_empty() => items,
                _ => return None,
            };
            let name = items.remove(0).as_str()?.to_string();
            let payload = if items.is_empty() {
                Value::Null
            } else {
                items.remove(0)
            };
            Some(Frame::Event { name, payload })
        }
        '4' => {
            let message = serde_json::from_str::<Value>(data)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "connection refused".to_string());
            Some(Frame::ConnectError(message))
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct NotificationWire {
    #[serde(default)]
    title: Option<String>,
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BotStatusWire {
    Object { status: String },
    Bare(String),
}

/// Map a named event onto a [`PushEvent`]. Unknown event names yield `Ok(None)`.
pub fn event_from_frame(name: &str, payload: Value) -> Result<Option<PushEvent>, SyncError> {
    let event = match name {
        "status_update" => {
            let wire: StatusWire = serde_json::from_value(payload)?;
            PushEvent::StatusUpdate(BotState::try_from(wire)?)
        }
        "bot_status" => {
            let raw = match serde_json::from_value::<BotStatusWire>(payload)? {
                BotStatusWire::Object { status } => status,
                BotStatusWire::Bare(status) => status,
            };
            let status = BotStatus::parse(&raw)
                .ok_or_else(|| SyncError::Malformed(format!("unknown bot status '{}'", raw)))?;
            PushEvent::BotStatus(status)
        }
        "notification" => {
            let wire: NotificationWire = serde_json::from_value(payload)?;
            PushEvent::Notification {
                title: wire.title.filter(|t| !t.is_empty()),
                message: wire.message,
                severity: wire.kind.as_deref().map(Severity::parse).unwrap_or_default(),
            }
        }
        "trade_executed" => {
            let wire: TradeWire = serde_json::from_value(payload)?;
            PushEvent::TradeExecuted(Trade::try_from(wire)?)
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

/// Keeps a push connection alive and forwards events into the app channel
pub struct PushClient {
    url: String,
    reconnect_delay: Duration,
    tx: mpsc::UnboundedSender<SyncMessage>,
}

impl PushClient {
    pub fn new(
        url: &str,
        reconnect_delay: Duration,
        tx: mpsc::UnboundedSender<SyncMessage>,
    ) -> Self {
        Self {
            url: url.to_string(),
            reconnect_delay,
            tx,
        }
    }

    /// Connect, pump events, reconnect after a fixed delay. Returns once the app hangs up.
    pub async fn run(self) {
        loop {
            match self.session().await {
                Ok(()) => tracing::info!("Push channel closed by server"),
                Err(e) => tracing::warn!("Push channel error: {}", e),
            }

            if self.tx.send(SyncMessage::Push(PushEvent::Disconnected)).is_err() {
                return;
            }
            tokio::time::sleep(self.reconnect_delay).await;
            if self.tx.is_closed() {
                return;
            }
            tracing::debug!("Reconnecting push channel to {}", self.url);
        }
    }

    async fn session(&self) -> Result<(), SyncError> {
        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| SyncError::Network(format!("WebSocket connect failed: {}", e)))?;
        tracing::info!("Push channel connected to {}", self.url);

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        while let Some(message) = ws_receiver.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text,
                Ok(Message::Ping(data)) => {
                    ws_sender
                        .send(Message::Pong(data))
                        .await
                        .map_err(|e| SyncError::Network(e.to_string()))?;
                    continue;
                }
                Ok(Message::Close(_)) => return Ok(()),
                Ok(_) => continue,
                Err(e) => return Err(SyncError::Network(e.to_string())),
            };

            let reply = match decode_frame(&text) {
                Some(Frame::Open) => Some("40"),
                Some(Frame::Ping) => Some("3"),
                Some(Frame::Close) | Some(Frame::Disconnect) => return Ok(()),
                Some(Frame::ConnectError(msg)) => return Err(SyncError::Network(msg)),
                Some(Frame::Connect) => {
                    self.forward(PushEvent::Connected)?;
                    None
                }
                Some(Frame::Event { name, payload }) => {
                    match event_from_frame(&name, payload) {
                        Ok(Some(event)) => self.forward(event)?,
                        Ok(None) => tracing::debug!("Ignoring push event '{}'", name),
                        Err(e) => tracing::debug!("Skipping undecodable '{}' event: {}", name, e),
                    }
                    None
                }
                Some(Frame::Pong) | Some(Frame::Noop) => None,
                None => {
                    tracing::debug!("Skipping unknown frame: {}", text);
                    None
                }
            };

            if let Some(reply) = reply {
                ws_sender
                    .send(Message::Text(reply.to_string()))
                    .await
                    .map_err(|e| SyncError::Network(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn forward(&self, event: PushEvent) -> Result<(), SyncError> {
        self.tx
            .send(SyncMessage::Push(event))
            .map_err(|_| SyncError::Network("dashboard closed".to_string()))
    }
}
