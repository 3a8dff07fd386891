use crate::logic::trade::{Trade, TradeType};
use crate::utils::amount::{AmountError, CurrencyAmount};
use crate::utils::percent::{Percent, div_ceil, narrow, widen};
use serde::{Deserialize, Serialize};

/// Worst-case amounts the user accepts at a given slippage tolerance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageBounds {
    pub maximum_amount_in: CurrencyAmount,
    pub minimum_amount_out: CurrencyAmount,
}

impl SlippageBounds {
    pub fn compute(trade: &Trade, tolerance: &Percent) -> Result<Self, AmountError> {
        match trade.trade_type {
            TradeType::ExactInput => Ok(Self {
                maximum_amount_in: trade.input_amount.clone(),
                minimum_amount_out: minimum_amount_out(&trade.output_amount, tolerance)?,
            }),
            TradeType::ExactOutput => Ok(Self {
                maximum_amount_in: maximum_amount_in(&trade.input_amount, tolerance)?,
                minimum_amount_out: trade.output_amount.clone(),
            }),
        }
    }
}

/// `floor(output / (1 + tolerance))`
pub fn minimum_amount_out(output: &CurrencyAmount, tolerance: &Percent) -> Result<CurrencyAmount, AmountError> {
    let (num, den) = (widen(tolerance.numerator()), widen(tolerance.denominator()));
    let raw = narrow(output.wide() * den / (den + num)).ok_or(AmountError::Overflow)?;
    Ok(CurrencyAmount::from_raw(output.currency().clone(), raw))
}

/// `ceil(input * (1 + tolerance))`
pub fn maximum_amount_in(input: &CurrencyAmount, tolerance: &Percent) -> Result<CurrencyAmount, AmountError> {
    let (num, den) = (widen(tolerance.numerator()), widen(tolerance.denominator()));
    let raw = narrow(div_ceil(input.wide() * (den + num), den)).ok_or(AmountError::Overflow)?;
    Ok(CurrencyAmount::from_raw(input.currency().clone(), raw))
}
