//! Declarative mapping from view model fields to stat panels.

use crate::format::{
    format_percent, format_quantity, format_signed_quantity, format_uptime, format_usd,
    truncate_address, AddressStyle, MISSING,
};
use crate::sync::ViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Status,
    Pnl,
    Balance,
    System,
    Settings,
}

impl Panel {
    pub fn title(&self) -> &'static str {
        match self {
            Panel::Status => "Bot",
            Panel::Pnl => "Profit & Loss",
            Panel::Balance => "Wallet",
            Panel::System => "System",
            Panel::Settings => "Trading Settings",
        }
    }

    /// The sub-tree this panel reads from has been loaded at least once
    pub fn is_loaded(&self, vm: &ViewModel) -> bool {
        match self {
            Panel::Status | Panel::Pnl | Panel::System => vm.bot.is_some(),
            Panel::Balance => vm.balance.is_some(),
            Panel::Settings => vm.settings.is_some(),
        }
    }
}

pub type Formatter = fn(&ViewModel, AddressStyle) -> Option<String>;

pub struct Binding {
    pub panel: Panel,
    pub label: &'static str,
    pub value: Formatter,
    /// Colour by sign (profit figures)
    pub signed: bool,
}

/// A binding evaluated against the current state
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    pub label: &'static str,
    pub value: String,
    pub signed: bool,
}

impl BoundValue {
    pub fn is_negative(&self) -> bool {
        self.value.starts_with('-')
    }
}

fn status(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.bot.as_ref().map(|b| b.status.label().to_string())
}

fn uptime(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.bot.as_ref().map(|b| format_uptime(b.uptime_seconds))
}

fn trade_count(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.bot.as_ref().map(|b| b.trade_count.to_string())
}

fn pnl_amount(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.bot.as_ref().map(|b| format_signed_quantity(b.pnl.amount, "SOL"))
}

fn pnl_percentage(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.bot.as_ref().map(|b| format_percent(b.pnl.percentage))
}

fn pnl_usd(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.bot.as_ref().map(|b| format_usd(b.pnl.usd_value))
}

fn sol_balance(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.balance.as_ref().map(|b| format_quantity(b.sol_balance, "SOL"))
}

fn sol_value(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.balance.as_ref().map(|b| format_usd(b.sol_value_usd))
}

fn token_value(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.balance.as_ref().map(|b| format_usd(b.token_value_usd()))
}

fn total_value(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.balance.as_ref().map(|b| format_usd(b.total_value_usd))
}

fn wallet_address(vm: &ViewModel, style: AddressStyle) -> Option<String> {
    vm.balance
        .as_ref()
        .and_then(|b| b.wallet_address.as_deref())
        .map(|addr| truncate_address(addr, style))
}

fn wallet_health(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.bot.as_ref().map(|b| {
        if b.wallet_initialized {
            "Initialized".to_string()
        } else {
            "Not initialized".to_string()
        }
    })
}

fn telegram_health(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.bot.as_ref().map(|b| {
        if b.telegram_connected {
            "Connected".to_string()
        } else {
            "Disconnected".to_string()
        }
    })
}

fn trade_amount(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.settings.as_ref().map(|s| format_quantity(s.trade_amount, "SOL"))
}

fn target_multiplier(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.settings
        .as_ref()
        .map(|s| format!("{}x", s.target_multiplier.normalize()))
}

fn channel(vm: &ViewModel, _: AddressStyle) -> Option<String> {
    vm.settings.as_ref().and_then(|s| s.channel.clone())
}

pub const BINDINGS: &[Binding] = &[
    Binding {
        panel: Panel::Status,
        label: "Status",
        value: status,
        signed: false,
    },
    Binding {
        panel: Panel::Status,
        label: "Uptime",
        value: uptime,
        signed: false,
    },
    Binding {
        panel: Panel::Status,
        label: "Trades",
        value: trade_count,
        signed: false,
    },
    Binding {
        panel: Panel::Pnl,
        label: "PnL",
        value: pnl_amount,
        signed: true,
    },
    Binding {
        panel: Panel::Pnl,
        label: "PnL %",
        value: pnl_percentage,
        signed: true,
    },
    Binding {
        panel: Panel::Pnl,
        label: "PnL (USD)",
        value: pnl_usd,
        signed: true,
    },
    Binding {
        panel: Panel::Balance,
        label: "SOL Balance",
        value: sol_balance,
        signed: false,
    },
    Binding {
        panel: Panel::Balance,
        label: "SOL Value",
        value: sol_value,
        signed: false,
    },
    Binding {
        panel: Panel::Balance,
        label: "Token Value",
        value: token_value,
        signed: false,
    },
    Binding {
        panel: Panel::Balance,
        label: "Total Value",
        value: total_value,
        signed: false,
    },
    Binding {
        panel: Panel::Balance,
        label: "Address",
        value: wallet_address,
        signed: false,
    },
    Binding {
        panel: Panel::System,
        label: "Wallet",
        value: wallet_health,
        signed: false,
    },
    Binding {
        panel: Panel::System,
        label: "Telegram",
        value: telegram_health,
        signed: false,
    },
    Binding {
        panel: Panel::Settings,
        label: "Trade Amount",
        value: trade_amount,
        signed: false,
    },
    Binding {
        panel: Panel::Settings,
        label: "Target Multiplier",
        value: target_multiplier,
        signed: false,
    },
    Binding {
        panel: Panel::Settings,
        label: "Channel",
        value: channel,
        signed: false,
    },
];

/// Evaluate every binding of `panel`; `None` while the panel's data has not loaded
pub fn resolve(panel: Panel, vm: &ViewModel, style: AddressStyle) -> Option<Vec<BoundValue>> {
    if !panel.is_loaded(vm) {
        return None;
    }
    Some(
        BINDINGS
            .iter()
            .filter(|b| b.panel == panel)
            .map(|b| BoundValue {
                label: b.label,
                value: (b.value)(vm, style).unwrap_or_else(|| MISSING.to_string()),
                signed: b.signed,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BotState, Pnl, Settings, Snapshot, WalletBalance};
    use rust_decimal_macros::dec;

    #[test]
    fn test_unloaded_panel_resolves_to_none() {
        let vm = ViewModel::default();
        for panel in [Panel::Status, Panel::Pnl, Panel::Balance, Panel::System, Panel::Settings] {
            assert!(resolve(panel, &vm, AddressStyle::default()).is_none());
        }
    }

    #[test]
    fn test_absent_field_renders_placeholder() {
        let vm = ViewModel::default()
            .apply_snapshot(
                1,
                Snapshot::Settings(Settings {
                    trade_amount: dec!(0.1),
                    target_multiplier: dec!(2.50),
                    channel: None,
                }),
            )
            .unwrap();
        let values = resolve(Panel::Settings, &vm, AddressStyle::default()).unwrap();
        let by_label = |l: &str| values.iter().find(|v| v.label == l).unwrap().value.clone();
        assert_eq!(by_label("Trade Amount"), "0.1000 SOL");
        assert_eq!(by_label("Target Multiplier"), "2.5x");
        assert_eq!(by_label("Channel"), MISSING);
    }

    #[test]
    fn test_balance_panel() {
        let vm = ViewModel::default()
            .apply_snapshot(
                1,
                Snapshot::Balance(WalletBalance {
                    sol_balance: dec!(10),
                    sol_value_usd: dec!(1000),
                    total_value_usd: dec!(1200),
                    wallet_address: Some(
                        "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_string(),
                    ),
                    tokens: vec![],
                }),
            )
            .unwrap();
        let values = resolve(Panel::Balance, &vm, AddressStyle::default()).unwrap();
        let labels: Vec<_> = values.iter().map(|v| v.label).collect();
        assert_eq!(
            labels,
            vec!["SOL Balance", "SOL Value", "Token Value", "Total Value", "Address"]
        );
        assert_eq!(values[0].value, "10.0000 SOL");
        assert_eq!(values[3].value, "$1,200.00");
        assert_eq!(values[4].value, "9xQeWvG8...9PusVFin");
    }

    #[test]
    fn test_signed_values() {
        let vm = ViewModel::default()
            .apply_snapshot(
                1,
                Snapshot::Status(BotState {
                    pnl: Pnl {
                        amount: dec!(-0.25),
                        percentage: dec!(-12.5),
                        usd_value: dec!(-37.5),
                    },
                    ..BotState::default()
                }),
            )
            .unwrap();
        let values = resolve(Panel::Pnl, &vm, AddressStyle::default()).unwrap();
        assert!(values.iter().all(|v| v.signed && v.is_negative()));
        assert_eq!(values[0].value, "-0.2500 SOL");
        assert_eq!(values[2].value, "-$37.50");
    }
}
