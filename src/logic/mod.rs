/// Logic Layer
///
/// Pure swap arithmetic with no I/O:
/// - routes, trades and how two candidate trades compare
/// - gas-derived minimum trade amounts and the native balance a trade needs
/// - slippage bounds and the fee breakdown shown next to a trade
/// - evaluation of the whole swap form into a single verdict
pub mod breakdown;
pub mod comparator;
pub mod fees;
pub mod graph;
pub mod pools;
pub mod slippage;
pub mod swap_state;
pub mod trade;
pub mod types;
pub mod validation;

pub use breakdown::{TradeBreakdown, realized_lp_fee};
pub use comparator::{ComparisonError, best_trade, is_trade_better, select_better};
pub use fees::{MinTradeAmounts, MinTradeEstimates, base_fee_in_eth, min_native_trade_amount, required_native_balance};
pub use graph::{Route, RouteError};
pub use pools::{Exchange, Pair};
pub use slippage::{SlippageBounds, maximum_amount_in, minimum_amount_out};
pub use swap_state::{CurrencyId, CurrencyIdError, SwapState};
pub use trade::{Trade, TradeError, TradeType};
pub use types::{EvaluationInputs, Field, RecipientInput, SwapInputError, SwapVerdict};
pub use validation::evaluate;
