use crate::utils::constants::{MAINNET_CHAIN_ID, NATIVE_DECIMALS, WETH, weth_address};
use alloy_primitives::utils::Unit;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Token {
    chain_id: u64,
    address: Address,
    decimals: u8,
    name: Option<String>,
    symbol: Option<String>,
}

pub type TokenWrapper = Arc<Token>;

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.get_address()
    }
}

impl Eq for Token {}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chain_id.cmp(&other.chain_id).then_with(|| self.address.cmp(&other.get_address()))
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Token {
    pub fn new(address: Address) -> Token {
        Token { chain_id: MAINNET_CHAIN_ID, address, decimals: 18, ..Token::default() }
    }

    pub fn new_with_data(chain_id: u64, address: Address, symbol: Option<String>, name: Option<String>, decimals: Option<u8>) -> Token {
        Token { chain_id, address, symbol, name, decimals: decimals.unwrap_or(18) }
    }

    /// Wrapped ether on the given chain. Chains without a known deployment get the mainnet address.
    pub fn weth(chain_id: u64) -> Token {
        Token::new_with_data(chain_id, weth_address(chain_id).unwrap_or(WETH), Some("WETH".to_string()), Some("Wrapped Ether".to_string()), Some(NATIVE_DECIMALS))
    }

    // For testing purposes
    pub fn repeat_byte(byte: u8) -> Token {
        Token::new(Address::repeat_byte(byte))
    }

    pub fn get_symbol(&self) -> String {
        self.symbol.clone().unwrap_or(self.address.to_string())
    }

    pub fn get_name(&self) -> String {
        self.name.clone().unwrap_or(self.address.to_string())
    }

    pub fn get_decimals(&self) -> u8 {
        self.decimals
    }

    pub fn get_chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn get_exp(&self) -> U256 {
        decimals_exp(self.decimals)
    }

    pub fn get_address(&self) -> Address {
        self.address
    }

    pub fn is_wrapped(&self) -> bool {
        self.address == weth_address(self.chain_id).unwrap_or(WETH)
    }
}

/// The chain's gas currency. Identity is the chain alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeCurrency {
    chain_id: u64,
    symbol: String,
    name: String,
}

impl NativeCurrency {
    pub fn ether(chain_id: u64) -> Self {
        Self { chain_id, symbol: "ETH".to_string(), name: "Ether".to_string() }
    }

    pub fn get_chain_id(&self) -> u64 {
        self.chain_id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Currency {
    Native(NativeCurrency),
    Token(TokenWrapper),
}

impl Currency {
    pub fn ether(chain_id: u64) -> Self {
        Currency::Native(NativeCurrency::ether(chain_id))
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Currency::Native(_))
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Currency::Native(native) => native.chain_id,
            Currency::Token(token) => token.chain_id,
        }
    }

    pub fn decimals(&self) -> u8 {
        match self {
            Currency::Native(_) => NATIVE_DECIMALS,
            Currency::Token(token) => token.decimals,
        }
    }

    pub fn symbol(&self) -> String {
        match self {
            Currency::Native(native) => native.symbol.clone(),
            Currency::Token(token) => token.get_symbol(),
        }
    }

    /// Contract address, `None` for the native currency.
    pub fn address(&self) -> Option<Address> {
        match self {
            Currency::Native(_) => None,
            Currency::Token(token) => Some(token.address),
        }
    }

    /// The token that stands in for this currency inside a route path.
    pub fn wrapped(&self) -> TokenWrapper {
        match self {
            Currency::Native(native) => Arc::new(Token::weth(native.chain_id)),
            Currency::Token(token) => token.clone(),
        }
    }

    pub fn exp(&self) -> U256 {
        decimals_exp(self.decimals())
    }
}

impl From<Token> for Currency {
    fn from(token: Token) -> Self {
        Currency::Token(Arc::new(token))
    }
}

impl From<TokenWrapper> for Currency {
    fn from(token: TokenWrapper) -> Self {
        Currency::Token(token)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

fn decimals_exp(decimals: u8) -> U256 {
    if decimals == 18 { Unit::ETHER.wei() } else { U256::from(10).pow(U256::from(decimals)) }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_serialize() {
        let weth_token = Token::weth(1);

        let serialized = serde_json::to_string(&weth_token).unwrap();
        assert_eq!(
            serialized,
            "{\"chain_id\":1,\"address\":\"0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2\",\"decimals\":18,\"name\":\"Wrapped Ether\",\"symbol\":\"WETH\"}"
        );
    }

    #[test]
    fn test_token_identity_ignores_metadata() {
        let a = Token::new_with_data(1, Address::repeat_byte(1), Some("AAA".to_string()), None, Some(6));
        let b = Token::new_with_data(1, Address::repeat_byte(1), Some("BBB".to_string()), None, Some(18));
        let other_chain = Token::new_with_data(5, Address::repeat_byte(1), Some("AAA".to_string()), None, Some(6));

        assert_eq!(a, b);
        assert_ne!(a, other_chain);
    }

    #[test]
    fn test_native_wraps_to_weth() {
        let eth = Currency::ether(1);
        assert!(eth.is_native());
        assert_eq!(eth.decimals(), 18);
        assert_eq!(eth.symbol(), "ETH");
        assert!(eth.wrapped().is_wrapped());
        assert_eq!(eth.address(), None);
        assert_ne!(eth, Currency::from(Token::weth(1)));
    }

    #[test]
    fn test_weth_per_chain() {
        let goerli = Token::weth(5);
        assert_eq!(goerli.get_address(), address!("0xB4FBF271143F4FBf7B91A5ded31805e42b2208d6"));
        assert!(goerli.is_wrapped());
        assert!(Currency::ether(5).wrapped().is_wrapped());
        assert_ne!(Currency::ether(5).wrapped(), Currency::ether(1).wrapped());

        // mainnet weth is just a token on goerli
        assert!(!Token::new_with_data(5, WETH, None, None, Some(18)).is_wrapped());
        assert_eq!(weth_address(137), None);
    }

    #[test]
    fn test_exp() {
        let usdc = Token::new_with_data(1, Address::repeat_byte(2), Some("USDC".to_string()), None, Some(6));
        assert_eq!(usdc.get_exp(), U256::from(1_000_000u64));
        assert_eq!(Currency::ether(1).exp(), U256::from(10).pow(U256::from(18)));
    }
}
