use crate::data_sync::aggregator::{QuoteAggregator, QuoteBoard, SourceEvent};
use crate::data_sync::config::{SessionConfig, SwapConfigSection};
use crate::data_sync::providers::{BalanceProvider, FeeContext, FeeOracle, NameResolver, QuoteError, QuoteRequest, QuoteSource};
use crate::data_sync::token_list::TokenList;
use crate::logic::fees::MinTradeEstimates;
use crate::logic::swap_state::SwapState;
use crate::logic::types::{EvaluationInputs, Field, RecipientInput, SwapVerdict};
use crate::logic::validation::evaluate;
use crate::utils::address::is_ens_name;
use crate::utils::amount::try_parse_amount;
use crate::utils::percent::Percent;
use crate::utils::token::Currency;
use alloy_primitives::Address;
use eyre::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Form contents plus user preferences for one refresh.
#[derive(Clone, Debug)]
pub struct SwapForm {
    pub account: Option<Address>,
    pub independent_field: Field,
    pub typed_value: String,
    pub input_currency: Option<Currency>,
    pub output_currency: Option<Currency>,
    pub recipient: Option<String>,
    pub slippage: Percent,
    pub bribe_margin: u64,
}

impl SwapForm {
    /// Resolves the currency ids of `state` through `tokens`. Unknown ids become `None`.
    /// Slippage and bribe margin start at the configured defaults.
    pub fn from_state(state: &SwapState, tokens: &TokenList, account: Option<Address>, config: &SwapConfigSection) -> Self {
        Self {
            account,
            independent_field: state.independent_field,
            typed_value: state.typed_value.clone(),
            input_currency: state.input_currency_id.and_then(|id| tokens.currency(&id)),
            output_currency: state.output_currency_id.and_then(|id| tokens.currency(&id)),
            recipient: state.recipient.clone(),
            slippage: config.default_slippage(),
            bribe_margin: config.default_bribe_margin,
        }
    }

    pub fn with_slippage(mut self, slippage: Percent) -> Self {
        self.slippage = slippage;
        self
    }

    pub fn with_bribe_margin(mut self, bribe_margin: u64) -> Self {
        self.bribe_margin = bribe_margin;
        self
    }
}

/// What subscribers receive: the verdict of a round and the thresholds it used.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub round: u64,
    pub verdict: SwapVerdict,
    pub min_trade_estimates: MinTradeEstimates,
}

/// Publishes `update` only while `round` is still the current one.
async fn publish(current_round: &Mutex<u64>, updates_tx: &watch::Sender<SessionUpdate>, update: SessionUpdate) -> bool {
    let current = current_round.lock().await;
    if *current != update.round {
        debug!("Dropping verdict of round {}, current round is {}", update.round, *current);
        return false;
    }
    updates_tx.send_replace(update);
    true
}

/// Owns the quote rounds of one swap form and publishes a verdict after every answer.
pub struct SwapSession {
    config: SessionConfig,
    aggregator: Mutex<QuoteAggregator>,
    fee_oracle: Arc<dyn FeeOracle>,
    balances: Arc<dyn BalanceProvider>,
    resolver: Arc<dyn NameResolver>,
    current_round: Arc<Mutex<u64>>,
    updates_tx: Arc<watch::Sender<SessionUpdate>>,
    collector: Mutex<Option<JoinHandle<()>>>,
}

impl SwapSession {
    pub fn new(
        config: SessionConfig,
        sources: Vec<Arc<dyn QuoteSource>>,
        fee_oracle: Arc<dyn FeeOracle>,
        balances: Arc<dyn BalanceProvider>,
        resolver: Arc<dyn NameResolver>,
    ) -> Self {
        info!("Initializing SwapSession with {} quote sources", sources.len());
        let (updates_tx, _updates_rx) = watch::channel(SessionUpdate::default());
        Self {
            aggregator: Mutex::new(QuoteAggregator::new(sources, config.swap.clone())),
            config,
            fee_oracle,
            balances,
            resolver,
            current_round: Arc::new(Mutex::new(0)),
            updates_tx: Arc::new(updates_tx),
            collector: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionUpdate> {
        self.updates_tx.subscribe()
    }

    pub fn latest(&self) -> SessionUpdate {
        self.updates_tx.borrow().clone()
    }

    pub fn get_config(&self) -> &SessionConfig {
        &self.config
    }

    /// Starts a new round for `form` and returns its number.
    ///
    /// A first verdict without quotes is published before any source is asked. Every arriving
    /// estimate or quote then triggers a re-evaluation, published only while no newer round
    /// has started. Sources are never awaited here.
    pub async fn refresh(&self, form: SwapForm) -> Result<u64> {
        let round = {
            let mut aggregator = self.aggregator.lock().await;
            let mut current = self.current_round.lock().await;
            let round = aggregator.next_round();
            *current = round;
            round
        };
        if let Some(collector) = self.collector.lock().await.take() {
            collector.abort();
        }
        debug!("Round {}: refreshing swap", round);

        let base_fee_per_gas = self.fee_oracle.base_fee_per_gas().await;
        let gas_price_to_beat = self.fee_oracle.gas_price_to_beat().await;
        let (input_balance, native_balance) = match (form.account, &form.input_currency) {
            (Some(account), Some(input)) => (
                self.balances.balance(account, input).await,
                self.balances.balance(account, &Currency::ether(self.config.swap.chain_id)).await,
            ),
            (Some(account), None) => (None, self.balances.balance(account, &Currency::ether(self.config.swap.chain_id)).await),
            _ => (None, None),
        };
        let recipient = self.resolve_recipient(form.recipient.as_deref()).await;

        let specified_currency = match form.independent_field {
            Field::Input => form.input_currency.as_ref(),
            Field::Output => form.output_currency.as_ref(),
        };
        let parsed_amount = try_parse_amount(Some(form.typed_value.as_str()), specified_currency);

        let exchanges = self.aggregator.lock().await.exchanges();
        let mut inputs = EvaluationInputs {
            account: form.account,
            chain_id: self.config.swap.chain_id,
            independent_field: form.independent_field,
            typed_value: form.typed_value.clone(),
            input_currency: form.input_currency.clone(),
            output_currency: form.output_currency.clone(),
            recipient,
            input_balance,
            native_balance,
            base_fee_per_gas,
            eip1559: self.config.swap.eip1559,
            gas_limit: self.config.swap.gas_limit,
            slippage: form.slippage,
            hop_threshold: self.config.swap.hop_threshold(),
            candidates: vec![None; exchanges.len()],
            min_trade_estimates: MinTradeEstimates::new(),
            bad_recipients: self.config.swap.bad_recipients.clone(),
        };

        let update = SessionUpdate { round, verdict: evaluate(&inputs), min_trade_estimates: MinTradeEstimates::new() };
        if !publish(&self.current_round, &self.updates_tx, update).await {
            return Ok(round);
        }

        let request = match (parsed_amount, &form.input_currency, &form.output_currency) {
            (Some(amount), Some(input), Some(output)) => match form.independent_field {
                Field::Input => QuoteRequest::exact_input(amount, output.clone()),
                Field::Output => QuoteRequest::exact_output(input.clone(), amount),
            },
            _ => return Ok(round),
        };

        let (events_tx, mut events_rx) = mpsc::channel::<SourceEvent>(self.config.channel_buffer_size);
        let fee_context = FeeContext { gas_price_to_beat, bribe_margin: form.bribe_margin };
        let tag = match self.aggregator.lock().await.dispatch(round, request, fee_context, events_tx) {
            Ok(tag) => tag,
            Err(QuoteError::Stale) => {
                debug!("Round {} superseded before dispatch", round);
                return Ok(round);
            }
            Err(e) => return Err(eyre::eyre!("Failed to dispatch quotes: {}", e)),
        };

        let current_round = Arc::clone(&self.current_round);
        let updates_tx = Arc::clone(&self.updates_tx);
        let collector = tokio::spawn(async move {
            let mut board = QuoteBoard::new(tag, exchanges);
            while let Some(event) = events_rx.recv().await {
                let exchange = event.exchange();
                if let Err(e) = board.apply_event(event) {
                    debug!("Discarding {} answer: {}", exchange, e);
                    continue;
                }

                inputs.candidates = board.resolved();
                inputs.min_trade_estimates = board.estimates().clone();
                let update = SessionUpdate { round, verdict: evaluate(&inputs), min_trade_estimates: board.estimates().clone() };
                if !publish(&current_round, &updates_tx, update).await || board.is_complete() {
                    break;
                }
            }
            debug!("Round {}: collected {} quotes", round, board.answered());
        });
        self.install_collector(round, collector).await;

        Ok(round)
    }

    /// Keeps `collector` only while `round` is current, otherwise aborts it.
    async fn install_collector(&self, round: u64, collector: JoinHandle<()>) -> bool {
        let current = self.current_round.lock().await;
        if *current != round {
            debug!("Round {} superseded, dropping its collector", round);
            collector.abort();
            return false;
        }
        if let Some(previous) = self.collector.lock().await.replace(collector) {
            previous.abort();
        }
        true
    }

    async fn resolve_recipient(&self, raw: Option<&str>) -> RecipientInput {
        let Some(raw) = raw else {
            return RecipientInput::account();
        };
        let recipient = RecipientInput::new(raw);
        if !is_ens_name(raw.trim()) {
            return recipient;
        }
        match self.resolver.resolve(raw.trim()).await {
            Ok(address) => recipient.with_resolved(address),
            Err(e) => {
                debug!("Recipient lookup failed: {}", e);
                recipient
            }
        }
    }

    /// Aborts in-flight quotes and the collector of the current round.
    pub async fn stop(&self) {
        info!("Stopping SwapSession");
        self.aggregator.lock().await.abort_all();
        if let Some(collector) = self.collector.lock().await.take() {
            collector.abort();
        }
    }
}

impl Drop for SwapSession {
    fn drop(&mut self) {
        if let Some(collector) = self.collector.get_mut().take() {
            collector.abort();
        }
    }
}

/// Builder for SwapSession
pub struct SwapSessionBuilder {
    config: Option<SessionConfig>,
    sources: Vec<Arc<dyn QuoteSource>>,
    fee_oracle: Option<Arc<dyn FeeOracle>>,
    balances: Option<Arc<dyn BalanceProvider>>,
    resolver: Option<Arc<dyn NameResolver>>,
}

impl SwapSessionBuilder {
    pub fn new() -> Self {
        Self { config: None, sources: Vec::new(), fee_oracle: None, balances: None, resolver: None }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn add_source(mut self, source: Arc<dyn QuoteSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_fee_oracle(mut self, fee_oracle: Arc<dyn FeeOracle>) -> Self {
        self.fee_oracle = Some(fee_oracle);
        self
    }

    pub fn with_balances(mut self, balances: Arc<dyn BalanceProvider>) -> Self {
        self.balances = Some(balances);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Result<SwapSession> {
        let config = match self.config {
            Some(config) => config,
            None => SessionConfig::from_env().unwrap_or_else(|e| {
                warn!("Falling back to default session config: {}", e);
                SessionConfig::default()
            }),
        };
        if self.sources.is_empty() {
            return Err(eyre::eyre!("SwapSession needs at least one quote source"));
        }
        let fee_oracle = self.fee_oracle.ok_or_else(|| eyre::eyre!("SwapSession needs a fee oracle"))?;
        let balances = self.balances.ok_or_else(|| eyre::eyre!("SwapSession needs a balance provider"))?;
        let resolver = self.resolver.ok_or_else(|| eyre::eyre!("SwapSession needs a name resolver"))?;

        Ok(SwapSession::new(config, self.sources, fee_oracle, balances, resolver))
    }
}

impl Default for SwapSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
