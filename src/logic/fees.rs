use crate::logic::pools::Exchange;
use crate::logic::trade::{Trade, TradeType};
use crate::utils::amount::{AmountError, CurrencyAmount};
use crate::utils::percent::{U768, div_ceil, narrow, widen};
use crate::utils::token::Currency;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Native cost of the base fee for one swap: `gas_limit * base_fee_per_gas`.
pub fn base_fee_in_eth(base_fee_per_gas: U256, gas_limit: u64, chain_id: u64) -> Result<CurrencyAmount, AmountError> {
    let raw = base_fee_per_gas.checked_mul(U256::from(gas_limit)).ok_or(AmountError::Overflow)?;
    Ok(CurrencyAmount::from_raw(Currency::ether(chain_id), raw))
}

/// Smallest native value worth trading at the current gas price to beat.
///
/// `ceil(gas_price * gas_limit * (100 + bribe_margin)/100 * (100 + min_trade_margin)/100)`
pub fn min_native_trade_amount(
    gas_price_to_beat: U256,
    gas_limit: u64,
    bribe_margin: u64,
    min_trade_margin: u64,
    chain_id: u64,
) -> Result<CurrencyAmount, AmountError> {
    let hundred = U768::from(100u64);
    let numerator = widen(gas_price_to_beat)
        * U768::from(gas_limit)
        * (hundred + U768::from(bribe_margin))
        * (hundred + U768::from(min_trade_margin));
    let raw = narrow(div_ceil(numerator, hundred * hundred)).ok_or(AmountError::Overflow)?;
    Ok(CurrencyAmount::from_raw(Currency::ether(chain_id), raw))
}

/// Per-direction thresholds of one source, expressed in the specified currency.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinTradeAmounts {
    pub exact_input: Option<CurrencyAmount>,
    pub exact_output: Option<CurrencyAmount>,
}

impl MinTradeAmounts {
    pub fn get(&self, trade_type: TradeType) -> Option<&CurrencyAmount> {
        match trade_type {
            TradeType::ExactInput => self.exact_input.as_ref(),
            TradeType::ExactOutput => self.exact_output.as_ref(),
        }
    }

    pub fn set(&mut self, trade_type: TradeType, amount: Option<CurrencyAmount>) {
        match trade_type {
            TradeType::ExactInput => self.exact_input = amount,
            TradeType::ExactOutput => self.exact_output = amount,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinTradeEstimates {
    estimates: BTreeMap<Exchange, MinTradeAmounts>,
}

impl MinTradeEstimates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, exchange: Exchange, amounts: MinTradeAmounts) {
        self.estimates.insert(exchange, amounts);
    }

    pub fn get(&self, exchange: Exchange) -> Option<&MinTradeAmounts> {
        self.estimates.get(&exchange)
    }

    pub fn threshold(&self, exchange: Exchange, trade_type: TradeType) -> Option<&CurrencyAmount> {
        self.get(exchange).and_then(|amounts| amounts.get(trade_type))
    }

    /// Every known threshold for `trade_type`, across sources.
    pub fn thresholds(&self, trade_type: TradeType) -> impl Iterator<Item = &CurrencyAmount> {
        self.estimates.values().filter_map(move |amounts| amounts.get(trade_type))
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }
}

/// Native balance the wallet must hold on top of the swap itself.
///
/// Token to token trades pay the base fee, native-output trades pay it only after EIP-1559.
/// The incentive is added on top, a missing incentive counts as zero. Trades paid in the
/// native currency return `None`, the input balance check already covers them.
pub fn required_native_balance(trade: &Trade, base_fee_in_eth: &CurrencyAmount, eip1559: bool) -> Result<Option<CurrencyAmount>, AmountError> {
    if trade.input_amount.currency().is_native() {
        return Ok(None);
    }

    let base_component = if !trade.output_amount.currency().is_native() || eip1559 {
        base_fee_in_eth.clone()
    } else {
        CurrencyAmount::zero(base_fee_in_eth.currency().clone())
    };

    let required = match &trade.miner_bribe {
        Some(bribe) => base_component.checked_add(bribe)?,
        None => base_component,
    };
    Ok(Some(required))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::graph::Route;
    use crate::logic::pools::Pair;
    use crate::utils::token::{Token, TokenWrapper};
    use alloy_primitives::Address;
    use alloy_primitives::utils::Unit;
    use std::sync::Arc;

    fn gwei(value: u64) -> U256 {
        U256::from(value) * Unit::GWEI.wei()
    }

    fn dai() -> TokenWrapper {
        Arc::new(Token::new_with_data(1, Address::repeat_byte(1), Some("DAI".to_string()), None, Some(18)))
    }

    fn usdc() -> TokenWrapper {
        Arc::new(Token::new_with_data(1, Address::repeat_byte(2), Some("USDC".to_string()), None, Some(6)))
    }

    fn trade_between(input: Currency, output: Currency) -> Trade {
        let pair = Pair::new(input.wrapped(), output.wrapped(), Address::repeat_byte(30));
        let route = Route::new(vec![pair], input.clone(), output.clone()).unwrap();
        Trade::new(
            route,
            TradeType::ExactInput,
            CurrencyAmount::from_raw(input, U256::from(1000)),
            CurrencyAmount::from_raw(output, U256::from(1000)),
            Exchange::Uniswap,
        )
        .unwrap()
    }

    #[test]
    fn test_base_fee_in_eth() {
        let fee = base_fee_in_eth(gwei(100), 250_000, 1).unwrap();
        assert!(fee.currency().is_native());
        assert_eq!(fee.to_exact(), "0.025");
        assert_eq!(base_fee_in_eth(U256::MAX, 2, 1), Err(AmountError::Overflow));
    }

    #[test]
    fn test_min_native_trade_amount() {
        // 100 gwei * 250k gas = 0.025 ETH, * 1.05 * 1.2 = 0.0315 ETH
        let min = min_native_trade_amount(gwei(100), 250_000, 5, 20, 1).unwrap();
        assert_eq!(min.to_exact(), "0.0315");

        // rounds up
        let min = min_native_trade_amount(U256::from(1), 1, 1, 1, 1).unwrap();
        assert_eq!(min.raw(), U256::from(2));
    }

    #[test]
    fn test_estimates_lookup() {
        let mut estimates = MinTradeEstimates::new();
        let mut uni = MinTradeAmounts::default();
        uni.set(TradeType::ExactInput, Some(CurrencyAmount::from_raw(dai().into(), U256::from(5))));
        estimates.insert(Exchange::Uniswap, uni);
        estimates.insert(Exchange::Sushiswap, MinTradeAmounts::default());

        assert_eq!(estimates.threshold(Exchange::Uniswap, TradeType::ExactInput).unwrap().raw(), U256::from(5));
        assert!(estimates.threshold(Exchange::Uniswap, TradeType::ExactOutput).is_none());
        assert!(estimates.threshold(Exchange::Undefined, TradeType::ExactInput).is_none());
        assert_eq!(estimates.thresholds(TradeType::ExactInput).count(), 1);
        assert_eq!(estimates.len(), 2);
    }

    #[test]
    fn test_required_native_balance() {
        let base_fee = base_fee_in_eth(gwei(10), 100_000, 1).unwrap();
        let bribe = CurrencyAmount::from_raw(Currency::ether(1), U256::from(7));

        let token_to_token = trade_between(dai().into(), usdc().into());
        assert_eq!(required_native_balance(&token_to_token, &base_fee, false).unwrap(), Some(base_fee.clone()));

        let bribed = token_to_token.with_miner_bribe(bribe.clone()).unwrap();
        let required = required_native_balance(&bribed, &base_fee, false).unwrap().unwrap();
        assert_eq!(required.raw(), base_fee.raw() + U256::from(7));

        let to_native = trade_between(dai().into(), Currency::ether(1)).with_miner_bribe(bribe).unwrap();
        assert_eq!(required_native_balance(&to_native, &base_fee, false).unwrap().unwrap().raw(), U256::from(7));
        assert_eq!(required_native_balance(&to_native, &base_fee, true).unwrap().unwrap().raw(), base_fee.raw() + U256::from(7));

        let from_native = trade_between(Currency::ether(1), dai().into());
        assert_eq!(required_native_balance(&from_native, &base_fee, true).unwrap(), None);
    }
}
