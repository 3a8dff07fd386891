use super::fees::MinTradeEstimates;
use super::slippage::SlippageBounds;
use super::trade::{Trade, TradeType};
use crate::utils::amount::CurrencyAmount;
use crate::utils::constants::{BAD_RECIPIENT_ADDRESSES, BETTER_TRADE_LESS_HOPS_THRESHOLD_BIPS, DEFAULT_GAS_LIMIT, DEFAULT_SLIPPAGE_BIPS, MAINNET_CHAIN_ID};
use crate::utils::percent::Percent;
use crate::utils::token::Currency;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Side of the swap form the user typed into.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Field {
    #[default]
    Input,
    Output,
}

impl Field {
    pub fn opposite(self) -> Field {
        match self {
            Field::Input => Field::Output,
            Field::Output => Field::Input,
        }
    }

    pub fn trade_type(self) -> TradeType {
        match self {
            Field::Input => TradeType::ExactInput,
            Field::Output => TradeType::ExactOutput,
        }
    }
}

/// Why the current swap cannot be submitted. Only the highest-precedence one is reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum SwapInputError {
    #[error("Connect Wallet")]
    ConnectWallet,
    #[error("Enter swap details")]
    EnterDetails,
    #[error("Base fee per gas unavailable")]
    BaseFeeUnavailable,
    #[error("Enter a recipient")]
    EnterRecipient,
    #[error("Invalid recipient")]
    InvalidRecipient,
    #[error("Insufficient {symbol} balance")]
    InsufficientBalance { symbol: String },
    #[error("Min trade amount not met")]
    MinTradeAmountNotMet,
    #[error("Insufficient {symbol} balance (fees)")]
    InsufficientFeeBalance { symbol: String },
}

/// Recipient as typed plus the result of name resolution, if one was attempted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientInput {
    /// `None` means "send to the connected account".
    pub raw: Option<String>,
    /// Address the raw name resolved to.
    pub resolved: Option<Address>,
}

impl RecipientInput {
    pub fn account() -> Self {
        Self::default()
    }

    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: Some(raw.into()), resolved: None }
    }

    pub fn with_resolved(mut self, resolved: Address) -> Self {
        self.resolved = Some(resolved);
        self
    }
}

/// Snapshot of everything the verdict depends on.
#[derive(Clone, Debug)]
pub struct EvaluationInputs {
    /// Connected wallet, `None` when disconnected
    pub account: Option<Address>,
    pub chain_id: u64,
    /// Field the typed value belongs to
    pub independent_field: Field,
    /// Amount exactly as typed
    pub typed_value: String,
    pub input_currency: Option<Currency>,
    pub output_currency: Option<Currency>,
    pub recipient: RecipientInput,
    /// Wallet balance of the input currency
    pub input_balance: Option<CurrencyAmount>,
    /// Wallet balance of the native currency
    pub native_balance: Option<CurrencyAmount>,
    /// Latest base fee per gas in wei
    pub base_fee_per_gas: Option<U256>,
    pub eip1559: bool,
    pub gas_limit: u64,
    /// User slippage tolerance
    pub slippage: Percent,
    /// Relative price band inside which fewer hops wins
    pub hop_threshold: Percent,
    /// One slot per configured source, in source order
    pub candidates: Vec<Option<Trade>>,
    pub min_trade_estimates: MinTradeEstimates,
    pub bad_recipients: Vec<Address>,
}

impl Default for EvaluationInputs {
    fn default() -> Self {
        Self {
            account: None,
            chain_id: MAINNET_CHAIN_ID,
            independent_field: Field::Input,
            typed_value: String::new(),
            input_currency: None,
            output_currency: None,
            recipient: RecipientInput::account(),
            input_balance: None,
            native_balance: None,
            base_fee_per_gas: None,
            eip1559: true,
            gas_limit: DEFAULT_GAS_LIMIT,
            slippage: Percent::from_bips(DEFAULT_SLIPPAGE_BIPS),
            hop_threshold: Percent::from_bips(BETTER_TRADE_LESS_HOPS_THRESHOLD_BIPS),
            candidates: vec![],
            min_trade_estimates: MinTradeEstimates::default(),
            bad_recipients: BAD_RECIPIENT_ADDRESSES.to_vec(),
        }
    }
}

/// Outcome of one evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapVerdict {
    pub trade: Option<Trade>,
    pub error: Option<SwapInputError>,
    pub min_amount_error: bool,
    pub parsed_amount: Option<CurrencyAmount>,
    pub slippage_bounds: Option<SlippageBounds>,
    pub base_fee_in_eth: Option<CurrencyAmount>,
    /// Resolved recipient address, when valid
    pub recipient: Option<Address>,
}

impl SwapVerdict {
    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.trade.is_some()
    }
}
