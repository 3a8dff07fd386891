use super::slippage::SlippageBounds;
use super::trade::{Trade, TradeType};
use crate::utils::amount::{AmountError, CurrencyAmount};
use crate::utils::constants::{BIPS_BASE, PAIR_FEE_BIPS};
use crate::utils::percent::{Percent, narrow, widen};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Display figures for a selected trade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeBreakdown {
    /// Share of the input paid to liquidity providers across all hops
    pub realized_lp_fee: Percent,
    pub realized_lp_fee_amount: CurrencyAmount,
    /// Source-reported price impact with the LP fee taken out
    pub price_impact_without_fee: Option<Percent>,
    pub slippage: Percent,
    pub trade_type: TradeType,
    /// Minimum received for exact input, maximum sold for exact output
    pub bound: CurrencyAmount,
}

/// `1 - (1 - fee)^hops`, exact.
pub fn realized_lp_fee(hops: usize) -> Result<Percent, AmountError> {
    let exp = U256::from(hops);
    let denominator = U256::from(BIPS_BASE).checked_pow(exp).ok_or(AmountError::Overflow)?;
    let kept = U256::from(BIPS_BASE - PAIR_FEE_BIPS).checked_pow(exp).ok_or(AmountError::Overflow)?;
    Percent::new(denominator - kept, denominator)
}

impl TradeBreakdown {
    pub fn compute(trade: &Trade, slippage: &Percent) -> Result<Self, AmountError> {
        let realized_lp_fee = realized_lp_fee(trade.hops())?;

        let fee_raw = narrow(trade.input_amount.wide() * widen(realized_lp_fee.numerator()) / widen(realized_lp_fee.denominator()))
            .ok_or(AmountError::Overflow)?;
        let realized_lp_fee_amount = CurrencyAmount::from_raw(trade.input_amount.currency().clone(), fee_raw);

        let price_impact_without_fee = match &trade.price_impact {
            Some(impact) => Some(impact.saturating_sub(&realized_lp_fee)?),
            None => None,
        };

        let bounds = SlippageBounds::compute(trade, slippage)?;
        let bound = match trade.trade_type {
            TradeType::ExactInput => bounds.minimum_amount_out,
            TradeType::ExactOutput => bounds.maximum_amount_in,
        };

        Ok(Self { realized_lp_fee, realized_lp_fee_amount, price_impact_without_fee, slippage: *slippage, trade_type: trade.trade_type, bound })
    }

    pub fn bound_label(&self) -> &'static str {
        match self.trade_type {
            TradeType::ExactInput => "Minimum received",
            TradeType::ExactOutput => "Maximum sold",
        }
    }

    pub fn bound_line(&self) -> String {
        format!("{} {} {}", self.bound_label(), self.bound.to_significant(6), self.bound.currency().symbol())
    }

    pub fn lp_fee_line(&self) -> String {
        format!("{} {}", self.realized_lp_fee_amount.to_significant(4), self.realized_lp_fee_amount.currency().symbol())
    }

    /// Slippage with two decimals, e.g. `0.50%`.
    pub fn slippage_line(&self) -> String {
        self.slippage.to_string()
    }
}
