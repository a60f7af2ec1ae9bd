use super::PushEvent;
use crate::types::{Severity, SnapshotKind};

/// What the app should do in response to a push event, besides merging it
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Re-fetch every snapshot kind once
    Resync,
    Refresh(Vec<SnapshotKind>),
    Notify {
        title: String,
        message: String,
        severity: Severity,
    },
}

/// Tracks push connectivity and turns events into follow-up work
#[derive(Debug, Default)]
pub struct EventListener {
    connected: bool,
    /// At least one disconnect has been observed since the last connect
    lost: bool,
}

impl EventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn on_event(&mut self, event: &PushEvent) -> Vec<Directive> {
        match event {
            PushEvent::Connected => {
                let was_lost = self.lost;
                let was_connected = self.connected;
                self.connected = true;
                self.lost = false;

                // duplicate connect acks must not double the resync
                if was_lost && !was_connected {
                    vec![
                        Directive::Resync,
                        Directive::Notify {
                            title: "Reconnected".to_string(),
                            message: "Connected to server".to_string(),
                            severity: Severity::Success,
                        },
                    ]
                } else {
                    Vec::new()
                }
            }
            PushEvent::Disconnected => {
                let was_connected = self.connected;
                self.connected = false;
                self.lost = true;
                if was_connected {
                    vec![Directive::Notify {
                        title: "Connection Lost".to_string(),
                        message: "Disconnected from server".to_string(),
                        severity: Severity::Warning,
                    }]
                } else {
                    Vec::new()
                }
            }
            PushEvent::TradeExecuted(trade) => vec![
                Directive::Refresh(vec![SnapshotKind::History, SnapshotKind::Balance]),
                Directive::Notify {
                    title: "Trade".to_string(),
                    message: format!("Trade executed: {}", trade.token_address),
                    severity: Severity::Success,
                },
            ],
            PushEvent::Notification {
                title,
                message,
                severity,
            } => vec![Directive::Notify {
                title: title.clone().unwrap_or_else(|| default_title(*severity).to_string()),
                message: message.clone(),
                severity: *severity,
            }],
            PushEvent::StatusUpdate(_) | PushEvent::BotStatus(_) => Vec::new(),
        }
    }
}

fn default_title(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "Info",
        Severity::Success => "Success",
        Severity::Warning => "Warning",
        Severity::Error => "Error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BotStatus, Trade};
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;

    fn resyncs(directives: &[Directive]) -> usize {
        directives.iter().filter(|d| **d == Directive::Resync).count()
    }

    #[test]
    fn test_first_connect_does_not_resync() {
        let mut listener = EventListener::new();
        assert!(listener.on_event(&PushEvent::Connected).is_empty());
        assert!(listener.is_connected());
    }

    #[test]
    fn test_reconnect_resyncs_once() {
        let mut listener = EventListener::new();
        listener.on_event(&PushEvent::Connected);

        let lost = listener.on_event(&PushEvent::Disconnected);
        assert!(matches!(
            lost.as_slice(),
            [Directive::Notify { severity: Severity::Warning, .. }]
        ));

        // repeated failed attempts report nothing new
        assert!(listener.on_event(&PushEvent::Disconnected).is_empty());
        assert!(listener.on_event(&PushEvent::Disconnected).is_empty());

        let back = listener.on_event(&PushEvent::Connected);
        assert_eq!(resyncs(&back), 1);
        assert_eq!(resyncs(&listener.on_event(&PushEvent::Connected)), 0);
    }

    #[test]
    fn test_connect_failure_before_first_connect() {
        let mut listener = EventListener::new();
        assert!(listener.on_event(&PushEvent::Disconnected).is_empty());
        assert_eq!(resyncs(&listener.on_event(&PushEvent::Connected)), 1);
    }

    #[test]
    fn test_trade_executed_refreshes_history_and_balance() {
        let mut listener = EventListener::new();
        let trade = Trade {
            timestamp: NaiveDateTime::parse_from_str("2026-01-02 10:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            token_address: "Mint1".to_string(),
            amount_invested: Decimal::ONE,
            amount_returned: None,
        };
        let out = listener.on_event(&PushEvent::TradeExecuted(trade));
        assert_eq!(
            out[0],
            Directive::Refresh(vec![SnapshotKind::History, SnapshotKind::Balance])
        );
        assert!(matches!(
            &out[1],
            Directive::Notify { message, .. } if message == "Trade executed: Mint1"
        ));
    }

    #[test]
    fn test_notification_passthrough() {
        let mut listener = EventListener::new();
        let out = listener.on_event(&PushEvent::Notification {
            title: None,
            message: "Low balance".to_string(),
            severity: Severity::Error,
        });
        assert_eq!(
            out,
            vec![Directive::Notify {
                title: "Error".to_string(),
                message: "Low balance".to_string(),
                severity: Severity::Error,
            }]
        );
        assert!(listener
            .on_event(&PushEvent::BotStatus(BotStatus::Running))
            .is_empty());
    }
}
