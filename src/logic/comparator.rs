use crate::logic::trade::Trade;
use crate::utils::amount::AmountError;
use crate::utils::percent::Percent;
use crate::utils::price::Price;
use std::cmp::Ordering;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    #[error("trades have different trade types")]
    TradeTypeMismatch,
    #[error("trades have different input currencies")]
    InputCurrencyMismatch,
    #[error("trades have different output currencies")]
    OutputCurrencyMismatch,
    #[error(transparent)]
    Amount(#[from] AmountError),
}

fn ensure_comparable(a: &Trade, b: &Trade) -> Result<(), ComparisonError> {
    if a.trade_type != b.trade_type {
        return Err(ComparisonError::TradeTypeMismatch);
    }
    if a.input_amount.currency() != b.input_amount.currency() {
        return Err(ComparisonError::InputCurrencyMismatch);
    }
    if a.output_amount.currency() != b.output_amount.currency() {
        return Err(ComparisonError::OutputCurrencyMismatch);
    }
    Ok(())
}

/// Returns true when `a` should be preferred over `b`.
///
/// A present trade beats a missing one. A price better by more than `hop_threshold` wins
/// outright. Inside the threshold the trade with fewer hops wins, and with equal hops the
/// strictly higher price wins.
pub fn is_trade_better(a: Option<&Trade>, b: Option<&Trade>, hop_threshold: &Percent) -> Result<bool, ComparisonError> {
    let (a, b) = match (a, b) {
        (None, _) => return Ok(false),
        (Some(_), None) => return Ok(true),
        (Some(a), Some(b)) => (a, b),
    };
    ensure_comparable(a, b)?;

    let price_a = a.execution_price()?;
    let price_b = b.execution_price()?;

    if price_a.exceeds_by_more_than(&price_b, hop_threshold)? {
        return Ok(true);
    }
    if price_b.exceeds_by_more_than(&price_a, hop_threshold)? {
        return Ok(false);
    }

    match a.hops().cmp(&b.hops()) {
        Ordering::Less => Ok(true),
        Ordering::Greater => Ok(false),
        Ordering::Equal => Ok(price_a.compare(&price_b)? == Ordering::Greater),
    }
}

/// Picks the better of two candidates. Ties and incomparable pairs keep `left`.
pub fn select_better(left: Option<Trade>, right: Option<Trade>, hop_threshold: &Percent) -> Option<Trade> {
    match is_trade_better(right.as_ref(), left.as_ref(), hop_threshold) {
        Ok(true) => right,
        Ok(false) => left,
        Err(e) => {
            warn!("Cannot compare trades, keeping the first one: {}", e);
            left
        }
    }
}

/// Best candidate, independent of the order the candidates arrive in.
///
/// The highest exact price sets the reference. Candidates it beats by more than
/// `hop_threshold` drop out, and the rest are ranked by hops, then price. Exact ties keep the
/// earliest candidate. Candidates not comparable with the first present one are skipped.
pub fn best_trade<I>(candidates: I, hop_threshold: &Percent) -> Option<Trade>
where
    I: IntoIterator<Item = Option<Trade>>,
{
    let mut priced: Vec<(Trade, Price)> = Vec::new();
    for candidate in candidates.into_iter().flatten() {
        if let Some((first, _)) = priced.first() {
            if let Err(e) = ensure_comparable(first, &candidate) {
                warn!("Skipping {} candidate: {}", candidate.exchange, e);
                continue;
            }
        }
        match candidate.execution_price() {
            Ok(price) => priced.push((candidate, price)),
            Err(e) => warn!("Skipping {} candidate without a price: {}", candidate.exchange, e),
        }
    }

    let mut top: Option<&Price> = None;
    for (_, price) in priced.iter() {
        if top.is_none_or(|top| matches!(price.compare(top), Ok(Ordering::Greater))) {
            top = Some(price);
        }
    }
    let top = top?.clone();

    priced
        .into_iter()
        .filter(|(_, price)| matches!(top.exceeds_by_more_than(price, hop_threshold), Ok(false)))
        .fold(None, |best, (candidate, _)| select_better(best, Some(candidate), hop_threshold))
}
