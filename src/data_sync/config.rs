use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync, load_from_str};
use crate::utils::constants::{
    BAD_RECIPIENT_ADDRESSES, BETTER_TRADE_LESS_HOPS_THRESHOLD_BIPS, DEFAULT_BRIBE_MARGIN, DEFAULT_GAS_LIMIT, DEFAULT_SLIPPAGE_BIPS,
    MAINNET_CHAIN_ID, MIN_TRADE_MARGIN,
};
use crate::utils::percent::Percent;
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Deserialize, Debug)]
pub struct SwapConfigRoot {
    pub swap: SwapConfigSection,
}

/// `[swap]` table of the config file.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct SwapConfigSection {
    pub chain_id: u64,
    /// Gas budgeted for one swap
    pub gas_limit: u64,
    /// Price band, in bips, inside which the route with fewer hops wins
    pub hop_threshold_bips: u64,
    /// Extra percent over the gas cost a trade must be worth
    pub min_trade_margin: u64,
    pub default_slippage_bips: u64,
    /// Percent added to the gas price to beat when bribing
    pub default_bribe_margin: u64,
    pub eip1559: bool,
    pub bad_recipients: Vec<Address>,
}

impl Default for SwapConfigSection {
    fn default() -> Self {
        Self {
            chain_id: MAINNET_CHAIN_ID,
            gas_limit: DEFAULT_GAS_LIMIT,
            hop_threshold_bips: BETTER_TRADE_LESS_HOPS_THRESHOLD_BIPS,
            min_trade_margin: MIN_TRADE_MARGIN,
            default_slippage_bips: DEFAULT_SLIPPAGE_BIPS,
            default_bribe_margin: DEFAULT_BRIBE_MARGIN,
            eip1559: true,
            bad_recipients: BAD_RECIPIENT_ADDRESSES.to_vec(),
        }
    }
}

impl SwapConfigSection {
    pub fn hop_threshold(&self) -> Percent {
        Percent::from_bips(self.hop_threshold_bips)
    }

    pub fn default_slippage(&self) -> Percent {
        Percent::from_bips(self.default_slippage_bips)
    }
}

#[async_trait]
impl ConfigLoader for SwapConfigSection {
    type SectionType = SwapConfigSection;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: SwapConfigRoot = load_from_file(file_name).await?;
        Ok(root.swap)
    }
}

impl ConfigLoaderSync for SwapConfigSection {
    type SectionType = SwapConfigSection;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: SwapConfigRoot = load_from_file_sync(file_name)?;
        Ok(root.swap)
    }

    fn load_section_from_str(contents: &str) -> Result<Self::SectionType, LoadConfigError> {
        let root: SwapConfigRoot = load_from_str(contents)?;
        Ok(root.swap)
    }
}

/// Runtime settings of a swap session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub swap: SwapConfigSection,
    /// Buffer size of the quote channel between source tasks and the session
    pub channel_buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { swap: SwapConfigSection::default(), channel_buffer_size: 16 }
    }
}

impl SessionConfig {
    pub fn new(swap: SwapConfigSection) -> Self {
        Self { swap, ..Self::default() }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(chain_id) = std::env::var("SWAP_CHAIN_ID") {
            config.swap.chain_id = chain_id.parse().map_err(|e| eyre::eyre!("Invalid SWAP_CHAIN_ID: {}", e))?;
        }

        if let Ok(gas_limit) = std::env::var("SWAP_GAS_LIMIT") {
            config.swap.gas_limit = gas_limit.parse().map_err(|e| eyre::eyre!("Invalid SWAP_GAS_LIMIT: {}", e))?;
        }

        if let Ok(eip1559) = std::env::var("SWAP_EIP1559") {
            config.swap.eip1559 = eip1559.parse().map_err(|e| eyre::eyre!("Invalid SWAP_EIP1559: {}", e))?;
        }

        if let Ok(buffer_size) = std::env::var("SWAP_CHANNEL_BUFFER_SIZE") {
            config.channel_buffer_size = buffer_size.parse().map_err(|e| eyre::eyre!("Invalid SWAP_CHANNEL_BUFFER_SIZE: {}", e))?;
        }

        if config.channel_buffer_size == 0 {
            return Err(eyre::eyre!("SWAP_CHANNEL_BUFFER_SIZE must be positive"));
        }

        Ok(config)
    }
}
