use crate::types::Trade;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Trade row as written to the export file
#[derive(Debug, Serialize)]
pub struct ExportedTrade {
    pub date: String,
    pub token: String,
    pub amount: f64,
    #[serde(rename = "return")]
    pub returned: Option<f64>,
    pub profit: Option<f64>,
}

impl From<&Trade> for ExportedTrade {
    fn from(trade: &Trade) -> Self {
        let num = |d: rust_decimal::Decimal| d.to_f64().unwrap_or_default();
        Self {
            date: trade.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            token: trade.token_address.clone(),
            amount: num(trade.amount_invested),
            returned: trade.amount_returned.map(num),
            profit: trade.derived_profit().map(num),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExport {
    pub trades: Vec<ExportedTrade>,
    pub export_date: String,
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("signalforge-history-{}.json", date.format("%Y-%m-%d"))
}

/// Write the trade list as pretty JSON into `dir`, returning the file path
pub fn export_history(trades: &[Trade], dir: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    let export = HistoryExport {
        trades: trades.iter().map(ExportedTrade::from).collect(),
        export_date: now.to_rfc3339(),
    };
    let json = serde_json::to_string_pretty(&export).context("Failed to serialize history")?;

    let path = dir.join(export_file_name(now.date_naive()));
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Exported {} trades to {}", trades.len(), path.display());
    Ok(path)
}
