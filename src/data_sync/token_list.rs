use crate::logic::swap_state::CurrencyId;
use crate::utils::token::{Currency, Token, TokenWrapper};
use alloy_primitives::Address;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenListEntry {
    chain_id: u64,
    address: Address,
    decimals: u8,
    symbol: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct TokenListFile {
    tokens: Vec<TokenListEntry>,
}

/// Known tokens of one chain, used to turn form currency ids into currencies.
#[derive(Clone, Debug, Default)]
pub struct TokenList {
    chain_id: u64,
    tokens: HashMap<Address, TokenWrapper>,
}

impl TokenList {
    pub fn new(chain_id: u64) -> Self {
        let mut list = Self { chain_id, tokens: HashMap::new() };
        list.add(Token::weth(chain_id));
        list
    }

    /// Reads a standard token-list JSON document, keeping only tokens of `chain_id`.
    pub fn from_json(chain_id: u64, json: &str) -> Result<Self, serde_json::Error> {
        let file: TokenListFile = serde_json::from_str(json)?;
        let mut list = Self::new(chain_id);
        for entry in file.tokens {
            if entry.chain_id != chain_id {
                continue;
            }
            list.add(Token::new_with_data(entry.chain_id, entry.address, entry.symbol, entry.name, Some(entry.decimals)));
        }
        Ok(list)
    }

    pub fn add(&mut self, token: Token) {
        if token.get_chain_id() != self.chain_id {
            warn!("Skipping token {} from chain {}", token.get_symbol(), token.get_chain_id());
            return;
        }
        self.tokens.insert(token.get_address(), Arc::new(token));
    }

    pub fn get(&self, address: &Address) -> Option<&TokenWrapper> {
        self.tokens.get(address)
    }

    pub fn currency(&self, id: &CurrencyId) -> Option<Currency> {
        match id {
            CurrencyId::Native => Some(Currency::ether(self.chain_id)),
            CurrencyId::Token(address) => self.get(address).cloned().map(Currency::Token),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"{
        "name": "test",
        "tokens": [
            {"chainId": 1, "address": "0x6B175474E89094C44Da98b954EedeAC495271d0F", "decimals": 18, "symbol": "DAI", "name": "Dai Stablecoin"},
            {"chainId": 1, "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "decimals": 6, "symbol": "USDC", "name": "USD Coin"},
            {"chainId": 5, "address": "0x11fE4B6AE13d2a6055C8D9cF65c55bac32B5d844", "decimals": 18, "symbol": "DAI"}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let list = TokenList::from_json(1, LIST).unwrap();
        // weth plus the two mainnet tokens
        assert_eq!(list.len(), 3);

        let usdc: Address = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse().unwrap();
        let currency = list.currency(&CurrencyId::Token(usdc)).unwrap();
        assert_eq!(currency.symbol(), "USDC");
        assert_eq!(currency.decimals(), 6);

        assert!(list.currency(&CurrencyId::Native).unwrap().is_native());
        assert!(list.currency(&CurrencyId::Token(Address::repeat_byte(9))).is_none());
    }
}
