use crate::data_sync::config::SwapConfigSection;
use crate::data_sync::providers::{FeeContext, QuoteError, QuoteRequest, QuoteSource};
use crate::logic::comparator::best_trade;
use crate::logic::fees::{MinTradeAmounts, MinTradeEstimates, min_native_trade_amount};
use crate::logic::pools::Exchange;
use crate::logic::trade::{Trade, TradeType};
use crate::utils::amount::CurrencyAmount;
use crate::utils::percent::Percent;
use crate::utils::token::Currency;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Identifies the request and round a quote was produced for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuoteTag {
    pub request: QuoteRequest,
    pub round: u64,
}

/// One source's answer for one tag.
#[derive(Debug)]
pub struct SourceQuote {
    pub tag: QuoteTag,
    pub exchange: Exchange,
    pub outcome: Result<Trade, QuoteError>,
}

/// One source's minimum tradable amounts for one tag.
#[derive(Debug)]
pub struct SourceEstimate {
    pub tag: QuoteTag,
    pub exchange: Exchange,
    pub amounts: MinTradeAmounts,
}

/// Everything a source task reports, in the order it reports it.
#[derive(Debug)]
pub enum SourceEvent {
    Estimate(SourceEstimate),
    Quote(SourceQuote),
}

impl SourceEvent {
    pub fn exchange(&self) -> Exchange {
        match self {
            SourceEvent::Estimate(estimate) => estimate.exchange,
            SourceEvent::Quote(quote) => quote.exchange,
        }
    }
}

/// Collects the answers for exactly one tag.
#[derive(Debug)]
pub struct QuoteBoard {
    tag: QuoteTag,
    exchanges: Vec<Exchange>,
    results: HashMap<Exchange, Option<Trade>>,
    estimates: MinTradeEstimates,
}

impl QuoteBoard {
    pub fn new(tag: QuoteTag, exchanges: Vec<Exchange>) -> Self {
        Self { tag, exchanges, results: HashMap::new(), estimates: MinTradeEstimates::new() }
    }

    pub fn tag(&self) -> &QuoteTag {
        &self.tag
    }

    /// Forget every answer and start collecting for `tag`.
    pub fn reset(&mut self, tag: QuoteTag) {
        self.tag = tag;
        self.results.clear();
        self.estimates = MinTradeEstimates::new();
    }

    /// Records `quote`. Answers for another tag are rejected with `Stale`.
    pub fn apply(&mut self, quote: SourceQuote) -> Result<(), QuoteError> {
        if quote.tag != self.tag {
            return Err(QuoteError::Stale);
        }
        let trade = match quote.outcome {
            Ok(trade) => Some(trade),
            Err(QuoteError::NoRoute) | Err(QuoteError::BelowMinimum) => {
                debug!("{} has no trade for {}", quote.exchange, self.tag.request);
                None
            }
            Err(e) => {
                warn!("{} failed to quote {}: {}", quote.exchange, self.tag.request, e);
                None
            }
        };
        self.results.insert(quote.exchange, trade);
        Ok(())
    }

    pub fn apply_estimate(&mut self, estimate: SourceEstimate) -> Result<(), QuoteError> {
        if estimate.tag != self.tag {
            return Err(QuoteError::Stale);
        }
        self.estimates.insert(estimate.exchange, estimate.amounts);
        Ok(())
    }

    pub fn apply_event(&mut self, event: SourceEvent) -> Result<(), QuoteError> {
        match event {
            SourceEvent::Estimate(estimate) => self.apply_estimate(estimate),
            SourceEvent::Quote(quote) => self.apply(quote),
        }
    }

    /// One slot per source in configured order. Unanswered sources are `None`.
    pub fn resolved(&self) -> Vec<Option<Trade>> {
        self.exchanges.iter().map(|exchange| self.results.get(exchange).cloned().flatten()).collect()
    }

    /// Thresholds of the sources that reported one so far.
    pub fn estimates(&self) -> &MinTradeEstimates {
        &self.estimates
    }

    pub fn answered(&self) -> usize {
        self.results.len()
    }

    pub fn is_complete(&self) -> bool {
        self.exchanges.iter().all(|exchange| self.results.contains_key(exchange))
    }

    pub fn best_trade(&self, hop_threshold: &Percent) -> Option<Trade> {
        best_trade(self.resolved(), hop_threshold)
    }
}

/// Converts the native minimum into `input` and `output` through `source`.
/// A failed conversion leaves that direction empty.
pub async fn source_min_trade_amounts(source: &dyn QuoteSource, min_native: &CurrencyAmount, input: &Currency, output: &Currency) -> MinTradeAmounts {
    let (exact_input, exact_output) = tokio::join!(source.native_value_in(min_native, input), source.native_value_in(min_native, output));
    let mut amounts = MinTradeAmounts::default();
    for (trade_type, currency, converted) in [(TradeType::ExactInput, input, exact_input), (TradeType::ExactOutput, output, exact_output)] {
        match converted {
            Ok(amount) => amounts.set(trade_type, Some(amount)),
            Err(e) => debug!("{} cannot price {} in {}: {}", source.exchange(), min_native, currency, e),
        }
    }
    amounts
}

/// Fans a quote request out to every configured source.
///
/// Each source runs in its own task: it first reports its minimum tradable amounts, then
/// quotes with the threshold of the requested direction. A source that never answers only
/// leaves its own slot empty.
pub struct QuoteAggregator {
    sources: Vec<Arc<dyn QuoteSource>>,
    config: SwapConfigSection,
    round: u64,
    tasks: JoinSet<()>,
}

impl QuoteAggregator {
    pub fn new(sources: Vec<Arc<dyn QuoteSource>>, config: SwapConfigSection) -> Self {
        Self { sources, config, round: 0, tasks: JoinSet::new() }
    }

    /// Source exchanges in configured order.
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.sources.iter().map(|source| source.exchange()).collect()
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Starts a new round, aborting whatever the previous round still has in flight.
    pub fn next_round(&mut self) -> u64 {
        self.abort_all();
        self.round += 1;
        self.round
    }

    pub fn abort_all(&mut self) {
        if !self.tasks.is_empty() {
            debug!("Aborting {} in-flight quote tasks", self.tasks.len());
        }
        self.tasks.abort_all();
        self.tasks = JoinSet::new();
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Native value a trade must be worth this round, `None` without a gas price.
    pub fn min_native_trade_amount(&self, fee_context: &FeeContext) -> Option<CurrencyAmount> {
        let gas_price_to_beat = fee_context.gas_price_to_beat?;
        match min_native_trade_amount(gas_price_to_beat, self.config.gas_limit, fee_context.bribe_margin, self.config.min_trade_margin, self.config.chain_id) {
            Ok(min_native) => Some(min_native),
            Err(e) => {
                warn!("Cannot compute min native trade amount: {}", e);
                None
            }
        }
    }

    /// Spawns one task per source for `round`. Estimates and quotes arrive on `events_tx`.
    pub fn dispatch(&mut self, round: u64, request: QuoteRequest, fee_context: FeeContext, events_tx: mpsc::Sender<SourceEvent>) -> Result<QuoteTag, QuoteError> {
        if round != self.round {
            return Err(QuoteError::Stale);
        }
        let tag = QuoteTag { request, round };
        let min_native = self.min_native_trade_amount(&fee_context);
        info!("Round {}: requesting {} from {} sources", round, tag.request, self.sources.len());

        for source in self.sources.iter() {
            let source = Arc::clone(source);
            let exchange = source.exchange();
            let min_native = min_native.clone();
            let fee_context = fee_context.clone();
            let tag = tag.clone();
            let events_tx = events_tx.clone();

            self.tasks.spawn(async move {
                let mut min_amount = None;
                if let Some(min_native) = min_native {
                    let amounts = source_min_trade_amounts(source.as_ref(), &min_native, &tag.request.input_currency, &tag.request.output_currency).await;
                    min_amount = amounts.get(tag.request.trade_type).cloned();
                    let estimate = SourceEstimate { tag: tag.clone(), exchange, amounts };
                    if events_tx.send(SourceEvent::Estimate(estimate)).await.is_err() {
                        debug!("Event receiver closed, dropping {} estimate", exchange);
                        return;
                    }
                }

                let outcome = source.quote(&tag.request, &fee_context, min_amount.as_ref()).await;
                if events_tx.send(SourceEvent::Quote(SourceQuote { tag, exchange, outcome })).await.is_err() {
                    debug!("Event receiver closed, dropping {} quote", exchange);
                }
            });
        }

        Ok(tag)
    }
}

impl Drop for QuoteAggregator {
    fn drop(&mut self) {
        self.tasks.abort_all();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::logic::graph::Route;
    use crate::logic::pools::Pair;
    use crate::utils::token::{Token, TokenWrapper};
    use alloy_primitives::{Address, U256};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    pub(crate) fn dai() -> TokenWrapper {
        Arc::new(Token::new_with_data(1, Address::repeat_byte(1), Some("DAI".to_string()), None, Some(18)))
    }

    pub(crate) fn usdc() -> TokenWrapper {
        Arc::new(Token::new_with_data(1, Address::repeat_byte(2), Some("USDC".to_string()), None, Some(6)))
    }

    /// Quotes a direct route at a fixed rate of `output_per_input` whole units.
    pub(crate) struct MockSource {
        pub exchange: Exchange,
        pub output_per_input: u64,
        pub pair: Address,
        pub fail: bool,
        pub gate: Option<Arc<Notify>>,
    }

    impl MockSource {
        pub(crate) fn new(exchange: Exchange, output_per_input: u64, pair: Address) -> Self {
            Self { exchange, output_per_input, pair, fail: false, gate: None }
        }
    }

    #[async_trait]
    impl QuoteSource for MockSource {
        fn exchange(&self) -> Exchange {
            self.exchange
        }

        async fn quote(&self, request: &QuoteRequest, _fee_context: &FeeContext, min_amount: Option<&CurrencyAmount>) -> Result<Trade, QuoteError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(QuoteError::Source(eyre::eyre!("venue offline")));
            }
            if let Some(min_amount) = min_amount {
                if min_amount.greater_than(&request.amount).unwrap_or(false) {
                    return Err(QuoteError::BelowMinimum);
                }
            }
            let (input, output) = (request.input_currency.clone(), request.output_currency.clone());
            let route = Route::new(vec![Pair::new(input.wrapped(), output.wrapped(), self.pair)], input.clone(), output.clone())
                .map_err(|e| QuoteError::Source(e.into()))?;
            let (input_amount, output_amount) = match request.trade_type {
                TradeType::ExactInput => {
                    let raw = request.amount.raw() * U256::from(self.output_per_input) * output.exp() / input.exp();
                    (request.amount.clone(), CurrencyAmount::from_raw(output, raw))
                }
                TradeType::ExactOutput => {
                    let raw = request.amount.raw() * input.exp() / (output.exp() * U256::from(self.output_per_input));
                    (CurrencyAmount::from_raw(input, raw), request.amount.clone())
                }
            };
            Trade::new(route, request.trade_type, input_amount, output_amount, self.exchange).map_err(|e| QuoteError::Source(e.into()))
        }

        async fn native_value_in(&self, native_amount: &CurrencyAmount, currency: &Currency) -> eyre::Result<CurrencyAmount> {
            if currency.is_native() {
                return Ok(native_amount.clone());
            }
            // one native unit is worth 2000 units of anything else
            let raw = native_amount.raw() * U256::from(2000u64) * currency.exp() / native_amount.currency().exp();
            Ok(CurrencyAmount::from_raw(currency.clone(), raw))
        }
    }

    /// Never answers anything.
    pub(crate) struct SilentSource {
        pub exchange: Exchange,
    }

    #[async_trait]
    impl QuoteSource for SilentSource {
        fn exchange(&self) -> Exchange {
            self.exchange
        }

        async fn quote(&self, _request: &QuoteRequest, _fee_context: &FeeContext, _min_amount: Option<&CurrencyAmount>) -> Result<Trade, QuoteError> {
            std::future::pending().await
        }

        async fn native_value_in(&self, _native_amount: &CurrencyAmount, _currency: &Currency) -> eyre::Result<CurrencyAmount> {
            std::future::pending().await
        }
    }

    fn request(value: &str) -> QuoteRequest {
        QuoteRequest::exact_input(CurrencyAmount::from_decimal_str(dai().into(), value).unwrap(), usdc().into())
    }

    fn quote(event: SourceEvent) -> SourceQuote {
        match event {
            SourceEvent::Quote(quote) => quote,
            SourceEvent::Estimate(estimate) => panic!("expected a quote, got an estimate from {}", estimate.exchange),
        }
    }

    fn gas(gwei: u64) -> FeeContext {
        FeeContext { gas_price_to_beat: Some(U256::from(gwei) * U256::from(1_000_000_000u64)), bribe_margin: 5 }
    }

    #[tokio::test]
    async fn test_dispatch_collects_all_sources() {
        let sources: Vec<Arc<dyn QuoteSource>> = vec![
            Arc::new(MockSource::new(Exchange::Uniswap, 1, Address::repeat_byte(10))),
            Arc::new(MockSource::new(Exchange::Sushiswap, 2, Address::repeat_byte(11))),
        ];
        let mut aggregator = QuoteAggregator::new(sources, SwapConfigSection::default());
        let (tx, mut rx) = mpsc::channel(8);

        let round = aggregator.next_round();
        let tag = aggregator.dispatch(round, request("10"), FeeContext::default(), tx).unwrap();
        let mut board = QuoteBoard::new(tag, aggregator.exchanges());

        while !board.is_complete() {
            let quote = quote(rx.recv().await.unwrap());
            board.apply(quote).unwrap();
        }

        assert_eq!(board.answered(), 2);
        // no gas price, no thresholds
        assert!(board.estimates().is_empty());
        let best = board.best_trade(&Percent::from_bips(50)).unwrap();
        assert_eq!(best.exchange, Exchange::Sushiswap);
        assert_eq!(best.output_amount.to_exact(), "20");
    }

    #[tokio::test]
    async fn test_failures_only_affect_their_source() {
        let mut failing = MockSource::new(Exchange::Uniswap, 3, Address::repeat_byte(10));
        failing.fail = true;
        let sources: Vec<Arc<dyn QuoteSource>> = vec![Arc::new(failing), Arc::new(MockSource::new(Exchange::Sushiswap, 1, Address::repeat_byte(11)))];
        let mut aggregator = QuoteAggregator::new(sources, SwapConfigSection::default());
        let (tx, mut rx) = mpsc::channel(8);

        let round = aggregator.next_round();
        let tag = aggregator.dispatch(round, request("10"), FeeContext::default(), tx).unwrap();
        let mut board = QuoteBoard::new(tag, aggregator.exchanges());
        while !board.is_complete() {
            board.apply_event(rx.recv().await.unwrap()).unwrap();
        }

        let resolved = board.resolved();
        assert!(resolved[0].is_none());
        assert_eq!(resolved[1].as_ref().unwrap().exchange, Exchange::Sushiswap);
    }

    #[tokio::test]
    async fn test_silent_source_does_not_hold_back_others() {
        let sources: Vec<Arc<dyn QuoteSource>> = vec![
            Arc::new(SilentSource { exchange: Exchange::Uniswap }),
            Arc::new(MockSource::new(Exchange::Sushiswap, 1, Address::repeat_byte(11))),
        ];
        let mut aggregator = QuoteAggregator::new(sources, SwapConfigSection::default());
        let (tx, mut rx) = mpsc::channel(8);

        let round = aggregator.next_round();
        let tag = aggregator.dispatch(round, request("100"), gas(100), tx).unwrap();
        let mut board = QuoteBoard::new(tag, aggregator.exchanges());
        while board.answered() == 0 {
            board.apply_event(rx.recv().await.unwrap()).unwrap();
        }

        assert!(!board.is_complete());
        assert!(board.estimates().get(Exchange::Uniswap).is_none());
        assert!(board.estimates().get(Exchange::Sushiswap).is_some());
        assert_eq!(board.best_trade(&Percent::from_bips(50)).unwrap().exchange, Exchange::Sushiswap);

        aggregator.next_round();
        assert_eq!(aggregator.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_stale_quotes_are_rejected() {
        let sources: Vec<Arc<dyn QuoteSource>> = vec![Arc::new(MockSource::new(Exchange::Uniswap, 1, Address::repeat_byte(10)))];
        let mut aggregator = QuoteAggregator::new(sources, SwapConfigSection::default());
        let (tx, mut rx) = mpsc::channel(8);

        let first_round = aggregator.next_round();
        let first = aggregator.dispatch(first_round, request("10"), FeeContext::default(), tx.clone()).unwrap();
        let stale = rx.recv().await.unwrap();

        let second_round = aggregator.next_round();
        assert!(matches!(aggregator.dispatch(first_round, request("10"), FeeContext::default(), tx.clone()), Err(QuoteError::Stale)));
        let second = aggregator.dispatch(second_round, request("10"), FeeContext::default(), tx).unwrap();
        assert_ne!(first, second);

        let mut board = QuoteBoard::new(second.clone(), aggregator.exchanges());
        assert!(matches!(board.apply_event(stale), Err(QuoteError::Stale)));
        let stale_estimate = SourceEstimate { tag: first.clone(), exchange: Exchange::Uniswap, amounts: MinTradeAmounts::default() };
        assert!(matches!(board.apply_estimate(stale_estimate), Err(QuoteError::Stale)));
        assert!(!board.is_complete());
        assert!(board.estimates().is_empty());

        board.apply_event(rx.recv().await.unwrap()).unwrap();
        assert!(board.is_complete());

        board.reset(first);
        assert_eq!(board.answered(), 0);
    }

    #[tokio::test]
    async fn test_next_round_aborts_in_flight_tasks() {
        let gate = Arc::new(Notify::new());
        let mut slow = MockSource::new(Exchange::Uniswap, 1, Address::repeat_byte(10));
        slow.gate = Some(gate.clone());
        let mut aggregator = QuoteAggregator::new(vec![Arc::new(slow)], SwapConfigSection::default());
        let (tx, mut rx) = mpsc::channel(8);

        let round = aggregator.next_round();
        aggregator.dispatch(round, request("10"), FeeContext::default(), tx).unwrap();
        assert_eq!(aggregator.in_flight(), 1);

        aggregator.next_round();
        assert_eq!(aggregator.in_flight(), 0);
        gate.notify_waiters();

        // the aborted task dropped its sender
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_estimates_precede_quotes() {
        let sources: Vec<Arc<dyn QuoteSource>> = vec![Arc::new(MockSource::new(Exchange::Uniswap, 1, Address::repeat_byte(10)))];
        let mut aggregator = QuoteAggregator::new(sources, SwapConfigSection::default());
        let (tx, mut rx) = mpsc::channel(8);

        let round = aggregator.next_round();
        let request = QuoteRequest::exact_input(CurrencyAmount::from_decimal_str(Currency::ether(1), "1").unwrap(), usdc().into());
        let tag = aggregator.dispatch(round, request, gas(100), tx).unwrap();
        let mut board = QuoteBoard::new(tag, aggregator.exchanges());

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, SourceEvent::Estimate(_)));
        board.apply_event(first).unwrap();
        // 0.025 ETH * 1.05 * 1.2
        assert_eq!(board.estimates().threshold(Exchange::Uniswap, TradeType::ExactInput).unwrap().to_exact(), "0.0315");
        assert_eq!(board.estimates().threshold(Exchange::Uniswap, TradeType::ExactOutput).unwrap().to_exact(), "63");

        board.apply_event(rx.recv().await.unwrap()).unwrap();
        assert!(board.is_complete());
    }

    #[test]
    fn test_min_native_needs_gas_price() {
        let aggregator = QuoteAggregator::new(Vec::new(), SwapConfigSection::default());
        assert!(aggregator.min_native_trade_amount(&FeeContext::default()).is_none());
        assert_eq!(aggregator.min_native_trade_amount(&gas(100)).unwrap().to_exact(), "0.0315");
    }

    #[tokio::test]
    async fn test_below_minimum_is_no_trade() {
        let sources: Vec<Arc<dyn QuoteSource>> = vec![Arc::new(MockSource::new(Exchange::Uniswap, 1, Address::repeat_byte(10)))];
        let mut aggregator = QuoteAggregator::new(sources, SwapConfigSection::default());
        let (tx, mut rx) = mpsc::channel(8);

        // 0.0315 ETH is worth 63 DAI
        let round = aggregator.next_round();
        let tag = aggregator.dispatch(round, request("10"), gas(100), tx).unwrap();
        let mut board = QuoteBoard::new(tag, aggregator.exchanges());
        while !board.is_complete() {
            let event = rx.recv().await.unwrap();
            if let SourceEvent::Quote(quote) = &event {
                assert!(matches!(quote.outcome, Err(QuoteError::BelowMinimum)));
            }
            board.apply_event(event).unwrap();
        }

        assert_eq!(board.estimates().threshold(Exchange::Uniswap, TradeType::ExactInput).unwrap().to_exact(), "63");
        assert!(board.best_trade(&Percent::from_bips(50)).is_none());
    }
}
