use crate::logic::graph::Route;
use crate::logic::pools::Exchange;
use crate::utils::amount::{AmountError, CurrencyAmount};
use crate::utils::percent::Percent;
use crate::utils::price::Price;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strum_macros::{Display as StrumDisplay, EnumString};

/// Which side of the trade the user fixed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, StrumDisplay, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeError {
    #[error("input amount is in {found}, route starts at {expected}")]
    InputCurrencyMismatch { expected: String, found: String },
    #[error("output amount is in {found}, route ends at {expected}")]
    OutputCurrencyMismatch { expected: String, found: String },
    #[error("trade amounts must be non-zero")]
    ZeroAmount,
    #[error("miner bribe must be paid in the native currency, got {0}")]
    BribeNotNative(String),
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// A quoted swap along one route from one liquidity source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub route: Route,
    pub trade_type: TradeType,
    pub input_amount: CurrencyAmount,
    pub output_amount: CurrencyAmount,
    pub exchange: Exchange,
    /// Native-currency incentive offered for inclusion.
    pub miner_bribe: Option<CurrencyAmount>,
    /// Price impact reported by the source, if any.
    pub price_impact: Option<Percent>,
}

impl Trade {
    pub fn new(
        route: Route,
        trade_type: TradeType,
        input_amount: CurrencyAmount,
        output_amount: CurrencyAmount,
        exchange: Exchange,
    ) -> Result<Self, TradeError> {
        if *input_amount.currency() != route.input {
            return Err(TradeError::InputCurrencyMismatch { expected: route.input.symbol(), found: input_amount.currency().symbol() });
        }
        if *output_amount.currency() != route.output {
            return Err(TradeError::OutputCurrencyMismatch { expected: route.output.symbol(), found: output_amount.currency().symbol() });
        }
        if input_amount.is_zero() || output_amount.is_zero() {
            return Err(TradeError::ZeroAmount);
        }
        Ok(Self { route, trade_type, input_amount, output_amount, exchange, miner_bribe: None, price_impact: None })
    }

    pub fn with_miner_bribe(mut self, miner_bribe: CurrencyAmount) -> Result<Self, TradeError> {
        if !miner_bribe.currency().is_native() {
            return Err(TradeError::BribeNotNative(miner_bribe.currency().symbol()));
        }
        self.miner_bribe = Some(miner_bribe);
        Ok(self)
    }

    pub fn with_price_impact(mut self, price_impact: Percent) -> Self {
        self.price_impact = Some(price_impact);
        self
    }

    /// Output received per unit of input spent.
    pub fn execution_price(&self) -> Result<Price, AmountError> {
        Price::from_amounts(&self.input_amount, &self.output_amount)
    }

    /// The amount the user typed: input for `ExactInput`, output for `ExactOutput`.
    pub fn specified_amount(&self) -> &CurrencyAmount {
        match self.trade_type {
            TradeType::ExactInput => &self.input_amount,
            TradeType::ExactOutput => &self.output_amount,
        }
    }

    pub fn hops(&self) -> usize {
        self.route.hops()
    }
}

impl Display for Trade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({} {} -> {}, hops={})", self.exchange, self.trade_type, self.input_amount, self.output_amount, self.hops())
    }
}
