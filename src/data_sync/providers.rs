use crate::logic::pools::Exchange;
use crate::logic::trade::{Trade, TradeType};
use crate::utils::amount::CurrencyAmount;
use crate::utils::cache::BalanceCache;
use crate::utils::token::Currency;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::debug;

/// What the user asked to be quoted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuoteRequest {
    pub trade_type: TradeType,
    pub input_currency: Currency,
    pub output_currency: Currency,
    /// Input amount for exact input, output amount for exact output
    pub amount: CurrencyAmount,
}

impl QuoteRequest {
    pub fn exact_input(amount: CurrencyAmount, output_currency: Currency) -> Self {
        Self { trade_type: TradeType::ExactInput, input_currency: amount.currency().clone(), output_currency, amount }
    }

    pub fn exact_output(input_currency: Currency, amount: CurrencyAmount) -> Self {
        Self { trade_type: TradeType::ExactOutput, input_currency, output_currency: amount.currency().clone(), amount }
    }

    /// Currency the minimum tradable amount is expressed in.
    pub fn specified_currency(&self) -> &Currency {
        self.amount.currency()
    }
}

impl Display for QuoteRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} -> {}", self.trade_type, self.amount, self.input_currency, self.output_currency)
    }
}

/// Gas inputs a source needs to size its inclusion incentive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeContext {
    pub gas_price_to_beat: Option<U256>,
    pub bribe_margin: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("no route found")]
    NoRoute,
    #[error("amount below the minimum tradable amount")]
    BelowMinimum,
    #[error("quote answers a superseded request")]
    Stale,
    #[error("quote source failed: {0}")]
    Source(#[from] eyre::Report),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("cannot resolve {0}")]
    Unresolvable(String),
}

/// One liquidity venue able to price trades.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn exchange(&self) -> Exchange;

    /// Best trade on this venue. Requests below `min_amount` fail with `BelowMinimum`.
    async fn quote(&self, request: &QuoteRequest, fee_context: &FeeContext, min_amount: Option<&CurrencyAmount>) -> Result<Trade, QuoteError>;

    /// Value of `native_amount` expressed in `currency` at this venue's prices.
    async fn native_value_in(&self, native_amount: &CurrencyAmount, currency: &Currency) -> eyre::Result<CurrencyAmount>;
}

#[async_trait]
pub trait FeeOracle: Send + Sync {
    async fn base_fee_per_gas(&self) -> Option<U256>;

    async fn gas_price_to_beat(&self) -> Option<U256>;
}

#[async_trait]
pub trait BalanceProvider: Send + Sync {
    async fn balance(&self, account: Address, currency: &Currency) -> Option<CurrencyAmount>;
}

#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Address, ResolveError>;
}

/// Serves balances from a TTL cache and falls back to the wrapped provider.
pub struct CachedBalanceProvider<P> {
    inner: P,
    cache: Arc<BalanceCache>,
}

impl<P: BalanceProvider> CachedBalanceProvider<P> {
    pub fn new(inner: P, cache: Arc<BalanceCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<BalanceCache> {
        &self.cache
    }
}

#[async_trait]
impl<P: BalanceProvider> BalanceProvider for CachedBalanceProvider<P> {
    async fn balance(&self, account: Address, currency: &Currency) -> Option<CurrencyAmount> {
        if let Some(balance) = self.cache.get_balance(account, currency) {
            return Some(balance);
        }
        let balance = self.inner.balance(account, currency).await?;
        debug!("Caching {} balance for {}", balance, account);
        self.cache.set_balance(account, balance.clone());
        Some(balance)
    }
}
