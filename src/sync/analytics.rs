use crate::types::Trade;
use rust_decimal::Decimal;

/// Figures derived from a trade list. Recomputed on demand, never cached.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeAnalytics {
    pub total: usize,
    /// Settled with a return above the amount invested
    pub successful: usize,
    /// Everything else, open positions included
    pub failed: usize,
    pub pending: usize,
    pub total_invested: Decimal,
    pub total_returned: Decimal,
    pub pnl_amount: Decimal,
    pub pnl_percentage: Decimal,
    pub success_rate: Decimal,
    /// Everything returned against everything invested, in percent
    pub average_return: Decimal,
}

impl TradeAnalytics {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let hundred = Decimal::ONE_HUNDRED;
        let total = trades.len();

        let successful = trades
            .iter()
            .filter(|t| matches!(t.amount_returned, Some(r) if r > t.amount_invested))
            .count();
        let pending = trades.iter().filter(|t| t.is_pending()).count();

        let total_invested: Decimal = trades.iter().map(|t| t.amount_invested).sum();
        let total_returned: Decimal = trades.iter().filter_map(|t| t.amount_returned).sum();
        let pnl_amount = total_returned - total_invested;

        let pnl_percentage = if total_invested > Decimal::ZERO {
            pnl_amount / total_invested * hundred
        } else {
            Decimal::ZERO
        };

        let success_rate = if total > 0 {
            Decimal::from(successful as u64) / Decimal::from(total as u64) * hundred
        } else {
            Decimal::ZERO
        };

        let average_return = if total_invested > Decimal::ZERO {
            total_returned / total_invested * hundred - hundred
        } else {
            Decimal::ZERO
        };

        Self {
            total,
            successful,
            failed: total - successful,
            pending,
            total_invested,
            total_returned,
            pnl_amount,
            pnl_percentage,
            success_rate,
            average_return,
        }
    }

    pub fn failure_rate(&self) -> Decimal {
        if self.total == 0 {
            Decimal::ZERO
        } else {
            Decimal::ONE_HUNDRED - self.success_rate
        }
    }
}
