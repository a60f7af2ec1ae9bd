//! Display formatting shared by every panel.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

/// Placeholder for a bound value that is not available yet
pub const MISSING: &str = "—";

/// Prefix/suffix lengths used when shortening addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressStyle {
    pub prefix: usize,
    pub suffix: usize,
}

impl Default for AddressStyle {
    fn default() -> Self {
        Self {
            prefix: 8,
            suffix: 8,
        }
    }
}

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `$1,234.56`, negatives as `-$12.00`
pub fn format_usd(value: Decimal) -> String {
    let rounded = round(value, 2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(whole), frac)
}

/// Token or SOL quantity: 4 decimals plus unit suffix
pub fn format_quantity(value: Decimal, unit: &str) -> String {
    format!("{:.4} {}", round(value, 4), unit)
}

/// Like [`format_quantity`] but always carries a sign, used for profit columns
pub fn format_signed_quantity(value: Decimal, unit: &str) -> String {
    let rounded = round(value, 4);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{:.4} {}", rounded, unit)
    } else {
        format!("+{:.4} {}", rounded.abs(), unit)
    }
}

pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", round(value, 2))
}

/// Shorten an address to `prefix...suffix`; short values pass through whole
pub fn truncate_address(address: &str, style: AddressStyle) -> String {
    let count = address.chars().count();
    if count <= style.prefix + style.suffix {
        return address.to_string();
    }
    let head: String = address.chars().take(style.prefix).collect();
    let tail: String = address.chars().skip(count - style.suffix).collect();
    format!("{}...{}", head, tail)
}

/// `3h 25m 7s`, matching what the backend itself prints
pub fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{}h {}m {}s", hours, minutes, secs)
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(dec!(1200)), "$1,200.00");
        assert_eq!(format_usd(dec!(0)), "$0.00");
        assert_eq!(format_usd(dec!(999.994)), "$999.99");
        assert_eq!(format_usd(dec!(999.995)), "$1,000.00");
        assert_eq!(format_usd(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_usd(dec!(-12.5)), "-$12.50");
        assert_eq!(format_usd(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(dec!(10), "SOL"), "10.0000 SOL");
        assert_eq!(format_quantity(dec!(0.02154), "SOL"), "0.0215 SOL");
        assert_eq!(format_signed_quantity(dec!(1.0), "SOL"), "+1.0000 SOL");
        assert_eq!(format_signed_quantity(dec!(-0.1), "SOL"), "-0.1000 SOL");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(60)), "60.00%");
        assert_eq!(format_percent(dec!(-6.666)), "-6.67%");
    }

    #[test]
    fn test_truncate_address() {
        let style = AddressStyle::default();
        let addr = "So11111111111111111111111111111111111111112";
        assert_eq!(truncate_address(addr, style), "So111111...11111112");
        assert_eq!(truncate_address("short", style), "short");

        let tight = AddressStyle {
            prefix: 4,
            suffix: 2,
        };
        assert_eq!(truncate_address("ABCDEFGHIJ", tight), "ABCD...IJ");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0h 0m 0s");
        assert_eq!(format_uptime(3725), "1h 2m 5s");
    }
}
