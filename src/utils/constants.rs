use alloy_primitives::{Address, address};

pub const WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

pub const MAINNET_CHAIN_ID: u64 = 1;
pub const ROPSTEN_CHAIN_ID: u64 = 3;
pub const RINKEBY_CHAIN_ID: u64 = 4;
pub const GOERLI_CHAIN_ID: u64 = 5;
pub const KOVAN_CHAIN_ID: u64 = 42;

/// Canonical wrapped ether per chain id.
pub const WETH_BY_CHAIN: [(u64, Address); 5] = [
    (MAINNET_CHAIN_ID, WETH),
    (ROPSTEN_CHAIN_ID, address!("0xc778417E063141139Fce010982780140Aa0cD5Ab")),
    (RINKEBY_CHAIN_ID, address!("0xc778417E063141139Fce010982780140Aa0cD5Ab")),
    (GOERLI_CHAIN_ID, address!("0xB4FBF271143F4FBf7B91A5ded31805e42b2208d6")),
    (KOVAN_CHAIN_ID, address!("0xd0A1E359811322d97991E03f863a0C30C2cF029C")),
];

/// Wrapped ether of `chain_id`, or `None` for chains without a known deployment.
pub fn weth_address(chain_id: u64) -> Option<Address> {
    WETH_BY_CHAIN.iter().find(|(id, _)| *id == chain_id).map(|(_, address)| *address)
}

pub const NATIVE_DECIMALS: u8 = 18;

/// Gas budget assumed for a relayed swap bundle.
pub const DEFAULT_GAS_LIMIT: u64 = 250_000;

/// Floor margin (percent) added on top of the user bribe margin when sizing minimum trades.
pub const MIN_TRADE_MARGIN: u64 = 20;

/// Default user bribe margin in percent.
pub const DEFAULT_BRIBE_MARGIN: u64 = 5;

/// Relative price tolerance, in bips, inside which the trade with fewer hops wins.
pub const BETTER_TRADE_LESS_HOPS_THRESHOLD_BIPS: u64 = 50;

pub const DEFAULT_SLIPPAGE_BIPS: u64 = 50;

pub const BIPS_BASE: u64 = 10_000;

/// Fee charged by a constant-product pair, in bips.
pub const PAIR_FEE_BIPS: u64 = 30;

#[non_exhaustive]
pub struct EthInfrastructureAddress;

impl EthInfrastructureAddress {
    // Uniswap V2
    pub const UNISWAP_V2_FACTORY: Address = address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
    pub const UNISWAP_V2_ROUTER_01: Address = address!("f164fC0Ec4E93095b804a4795bBe1e041497b92a");
    pub const UNISWAP_V2_ROUTER_02: Address = address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
}

/// Contracts that must never receive swap output directly.
pub const BAD_RECIPIENT_ADDRESSES: [Address; 3] = [
    EthInfrastructureAddress::UNISWAP_V2_FACTORY,
    EthInfrastructureAddress::UNISWAP_V2_ROUTER_01,
    EthInfrastructureAddress::UNISWAP_V2_ROUTER_02,
];
