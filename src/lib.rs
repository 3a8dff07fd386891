// Two-Layer Architecture
pub mod data_sync; // Data Layer: quote rounds, gas feed, balances, session
pub mod logic; // Logic Layer: trades, comparison, fees, form validation

// Common utilities and types
pub mod utils;

// Re-export key components from each layer
pub use data_sync::{
    BalanceProvider, FeeOracle, GasFeed, NameResolver, QuoteAggregator, QuoteRequest, QuoteSource, SessionConfig, SessionUpdate, SwapConfigSection,
    SwapForm, SwapSession, SwapSessionBuilder, TokenList,
};
pub use logic::{
    EvaluationInputs, Exchange, Field, Pair, Route, SlippageBounds, SwapInputError, SwapState, SwapVerdict, Trade, TradeBreakdown, TradeType,
    best_trade, evaluate, is_trade_better,
};
pub use utils::{Currency, CurrencyAmount, Percent, Price, Token, TokenWrapper};
