/// Data Layer
///
/// Everything that talks to the outside world on behalf of a swap form:
///
/// - quote sources fanned out per round, with stale answers discarded
/// - gas and base fee updates from the relay socket
/// - balances, name resolution and token lists
/// - the session that re-evaluates the form whenever a quote arrives
pub mod aggregator;
pub mod config;
pub mod gas_feed;
pub mod providers;
pub mod service;
pub mod token_list;

pub use aggregator::{QuoteAggregator, QuoteBoard, QuoteTag, SourceEstimate, SourceEvent, SourceQuote};
pub use config::{SessionConfig, SwapConfigRoot, SwapConfigSection};
pub use gas_feed::{GasFeed, GasFeedError, GasSnapshot, SocketEvent};
pub use providers::{BalanceProvider, CachedBalanceProvider, FeeContext, FeeOracle, NameResolver, QuoteError, QuoteRequest, QuoteSource, ResolveError};
pub use service::{SessionUpdate, SwapForm, SwapSession, SwapSessionBuilder};
pub use token_list::TokenList;
