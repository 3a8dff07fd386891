use crate::utils::token::TokenWrapper;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// A two-token liquidity pair. Identity is the liquidity token address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pair {
    token0: TokenWrapper,
    token1: TokenWrapper,
    liquidity_token: Address,
}

impl Pair {
    /// Tokens are stored sorted by address, like the on-chain pair.
    pub fn new(token_a: TokenWrapper, token_b: TokenWrapper, liquidity_token: Address) -> Self {
        let (token0, token1) = if token_a.get_address() <= token_b.get_address() { (token_a, token_b) } else { (token_b, token_a) };
        Self { token0, token1, liquidity_token }
    }

    pub fn token0(&self) -> &TokenWrapper {
        &self.token0
    }

    pub fn token1(&self) -> &TokenWrapper {
        &self.token1
    }

    pub fn get_address(&self) -> Address {
        self.liquidity_token
    }

    pub fn involves_token(&self, token: &TokenWrapper) -> bool {
        self.token0 == *token || self.token1 == *token
    }

    /// The token on the other side of `token`, if `token` belongs to the pair.
    pub fn other_token(&self, token: &TokenWrapper) -> Option<&TokenWrapper> {
        if self.token0 == *token {
            Some(&self.token1)
        } else if self.token1 == *token {
            Some(&self.token0)
        } else {
            None
        }
    }

    pub fn get_tokens(&self) -> Vec<Address> {
        vec![self.token0.get_address(), self.token1.get_address()]
    }
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        self.liquidity_token == other.liquidity_token
    }
}

impl Eq for Pair {}

impl Hash for Pair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.liquidity_token.hash(state)
    }
}

impl Ord for Pair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.liquidity_token.cmp(&other.liquidity_token)
    }
}

impl PartialOrd for Pair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Pair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{:#}", self.token0.get_symbol(), self.token1.get_symbol(), self.liquidity_token)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::token::Token;
    use std::sync::Arc;

    #[test]
    fn test_tokens_are_sorted() {
        let high = Arc::new(Token::repeat_byte(9));
        let low = Arc::new(Token::repeat_byte(1));
        let pair = Pair::new(high.clone(), low.clone(), Address::repeat_byte(20));

        assert_eq!(pair.token0(), &low);
        assert_eq!(pair.token1(), &high);
        assert_eq!(pair.get_tokens(), vec![Address::repeat_byte(1), Address::repeat_byte(9)]);
    }

    #[test]
    fn test_other_token() {
        let a = Arc::new(Token::repeat_byte(1));
        let b = Arc::new(Token::repeat_byte(2));
        let c = Arc::new(Token::repeat_byte(3));
        let pair = Pair::new(a.clone(), b.clone(), Address::repeat_byte(20));

        assert_eq!(pair.other_token(&a), Some(&b));
        assert_eq!(pair.other_token(&b), Some(&a));
        assert_eq!(pair.other_token(&c), None);
        assert!(!pair.involves_token(&c));
    }
}
