use super::comparator::best_trade;
use super::fees::{MinTradeEstimates, base_fee_in_eth, required_native_balance};
use super::slippage::SlippageBounds;
use super::trade::{Trade, TradeType};
use super::types::{EvaluationInputs, Field, SwapInputError, SwapVerdict};
use crate::utils::address::{is_ens_name, parse_address};
use crate::utils::amount::{CurrencyAmount, try_parse_amount};
use crate::utils::token::Currency;
use alloy_primitives::Address;
use tracing::{debug, warn};

/// Derives the selected trade and the single highest-precedence input error.
///
/// Precedence, first match wins:
/// 1. wallet not connected
/// 2. amount or currency missing
/// 3. base fee unknown
/// 4. recipient missing, malformed, denylisted or part of the route
/// 5. input balance below the slippage-adjusted input (plus base fee for native input)
/// 6. amount below the source's minimum
/// 7. native balance below the fee requirement
pub fn evaluate(inputs: &EvaluationInputs) -> SwapVerdict {
    let trade_type = inputs.independent_field.trade_type();
    let specified_currency = match inputs.independent_field {
        Field::Input => inputs.input_currency.as_ref(),
        Field::Output => inputs.output_currency.as_ref(),
    };
    let parsed_amount = try_parse_amount(Some(inputs.typed_value.as_str()), specified_currency);

    let trade = match (&parsed_amount, &inputs.input_currency, &inputs.output_currency) {
        (Some(amount), Some(input), Some(output)) => {
            let fresh = inputs.candidates.iter().map(|candidate| fresh_candidate(candidate.as_ref(), trade_type, input, output, amount));
            best_trade(fresh, &inputs.hop_threshold)
        }
        _ => None,
    };

    let base_fee = inputs.base_fee_per_gas.and_then(|base_fee_per_gas| match base_fee_in_eth(base_fee_per_gas, inputs.gas_limit, inputs.chain_id) {
        Ok(fee) => Some(fee),
        Err(e) => {
            warn!("Cannot compute base fee in eth: {}", e);
            None
        }
    });

    let slippage_bounds = trade.as_ref().and_then(|trade| match SlippageBounds::compute(trade, &inputs.slippage) {
        Ok(bounds) => Some(bounds),
        Err(e) => {
            warn!("Cannot compute slippage bounds for {}: {}", trade, e);
            None
        }
    });

    let recipient = resolve_recipient(inputs);
    let min_amount_error = below_min_trade_amount(parsed_amount.as_ref(), trade.as_ref(), &inputs.min_trade_estimates, trade_type);

    let error = first_error(inputs, &parsed_amount, trade.as_ref(), base_fee.as_ref(), slippage_bounds.as_ref(), &recipient, min_amount_error);
    debug!(
        "Evaluated swap: trade={} error={:?} min_amount_error={}",
        trade.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        error,
        min_amount_error
    );

    SwapVerdict {
        trade,
        error,
        min_amount_error,
        parsed_amount,
        slippage_bounds,
        base_fee_in_eth: base_fee,
        recipient: recipient.ok(),
    }
}

/// Drops candidates quoted for a different request than the current one.
fn fresh_candidate(candidate: Option<&Trade>, trade_type: TradeType, input: &Currency, output: &Currency, amount: &CurrencyAmount) -> Option<Trade> {
    let trade = candidate?;
    let fresh = trade.trade_type == trade_type
        && trade.input_amount.currency() == input
        && trade.output_amount.currency() == output
        && trade.specified_amount() == amount;
    if !fresh {
        debug!("Discarding stale candidate {}", trade);
        return None;
    }
    Some(trade.clone())
}

fn resolve_recipient(inputs: &EvaluationInputs) -> Result<Address, SwapInputError> {
    let Some(raw) = inputs.recipient.raw.as_deref() else {
        return inputs.account.ok_or(SwapInputError::EnterRecipient);
    };
    let raw = raw.trim();
    if let Some(address) = parse_address(raw) {
        return Ok(address);
    }
    if is_ens_name(raw) {
        return inputs.recipient.resolved.ok_or(SwapInputError::EnterRecipient);
    }
    Err(SwapInputError::EnterRecipient)
}

fn exceeds(threshold: &CurrencyAmount, amount: &CurrencyAmount) -> bool {
    match threshold.greater_than(amount) {
        Ok(exceeds) => exceeds,
        Err(e) => {
            debug!("Ignoring min trade threshold {}: {}", threshold, e);
            false
        }
    }
}

/// With a trade, only its source's threshold counts. Without one, the amount must be below
/// every known threshold.
fn below_min_trade_amount(parsed_amount: Option<&CurrencyAmount>, trade: Option<&Trade>, estimates: &MinTradeEstimates, trade_type: TradeType) -> bool {
    let Some(amount) = parsed_amount else {
        return false;
    };
    match trade {
        Some(trade) => estimates.threshold(trade.exchange, trade_type).is_some_and(|threshold| exceeds(threshold, amount)),
        None => {
            let mut thresholds = estimates.thresholds(trade_type).peekable();
            thresholds.peek().is_some() && thresholds.all(|threshold| exceeds(threshold, amount))
        }
    }
}

fn first_error(
    inputs: &EvaluationInputs,
    parsed_amount: &Option<CurrencyAmount>,
    trade: Option<&Trade>,
    base_fee: Option<&CurrencyAmount>,
    slippage_bounds: Option<&SlippageBounds>,
    recipient: &Result<Address, SwapInputError>,
    min_amount_error: bool,
) -> Option<SwapInputError> {
    if inputs.account.is_none() {
        return Some(SwapInputError::ConnectWallet);
    }

    if parsed_amount.is_none() || inputs.input_currency.is_none() || inputs.output_currency.is_none() {
        return Some(SwapInputError::EnterDetails);
    }

    let Some(base_fee) = base_fee else {
        return Some(SwapInputError::BaseFeeUnavailable);
    };

    match recipient {
        Err(e) => return Some(e.clone()),
        Ok(address) => {
            if inputs.bad_recipients.contains(address) || trade.is_some_and(|trade| trade.route.involves_address(*address)) {
                return Some(SwapInputError::InvalidRecipient);
            }
        }
    }

    if let (Some(bounds), Some(balance)) = (slippage_bounds, inputs.input_balance.as_ref()) {
        let mut required = bounds.maximum_amount_in.clone();
        if required.currency().is_native() {
            match required.checked_add(base_fee) {
                Ok(with_fee) => required = with_fee,
                Err(e) => warn!("Cannot add base fee to required input: {}", e),
            }
        }
        match balance.less_than(&required) {
            Ok(true) => return Some(SwapInputError::InsufficientBalance { symbol: required.currency().symbol() }),
            Ok(false) => {}
            Err(e) => debug!("Skipping input balance check: {}", e),
        }
    }

    if min_amount_error {
        return Some(SwapInputError::MinTradeAmountNotMet);
    }

    if let (Some(trade), Some(native_balance)) = (trade, inputs.native_balance.as_ref()) {
        match required_native_balance(trade, base_fee, inputs.eip1559) {
            Ok(Some(required)) => match native_balance.less_than(&required) {
                Ok(true) => return Some(SwapInputError::InsufficientFeeBalance { symbol: native_balance.currency().symbol() }),
                Ok(false) => {}
                Err(e) => debug!("Skipping native balance check: {}", e),
            },
            Ok(None) => {}
            Err(e) => warn!("Cannot compute required native balance: {}", e),
        }
    }

    None
}
