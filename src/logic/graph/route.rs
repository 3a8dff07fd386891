use crate::logic::pools::Pair;
use crate::utils::token::{Currency, TokenWrapper};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route has no pairs")]
    Empty,
    #[error("route mixes chains {expected} and {found}")]
    ChainMismatch { expected: u64, found: u64 },
    #[error("pair {index} is not connected to {token}")]
    Disconnected { index: usize, token: Address },
    #[error("route ends at {found} instead of {expected}")]
    WrongOutput { expected: Address, found: Address },
    #[error("token {0} appears twice in route")]
    RepeatedToken(Address),
}

/// Ordered pairs connecting `input` to `output`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    // The pairs of the route e.g. pair0 -> pair1
    pub pairs: Vec<Pair>,
    // The tokens of the route e.g. token0 -> token1 -> token2
    pub path: Vec<TokenWrapper>,
    pub input: Currency,
    pub output: Currency,
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Route(pairs={:?}, path={:?})",
            self.pairs.iter().map(|p| format!("{:#}", p.get_address())).collect::<Vec<String>>(),
            self.path.iter().map(|t| t.get_symbol()).collect::<Vec<String>>()
        )
    }
}

impl Route {
    /// Walks the pairs from `input` and checks that the walk ends at `output`
    /// without visiting a token twice. Native currencies travel as their wrapped token.
    pub fn new(pairs: Vec<Pair>, input: Currency, output: Currency) -> Result<Self, RouteError> {
        if pairs.is_empty() {
            return Err(RouteError::Empty);
        }
        if input.chain_id() != output.chain_id() {
            return Err(RouteError::ChainMismatch { expected: input.chain_id(), found: output.chain_id() });
        }

        let mut current = input.wrapped();
        let mut seen = HashSet::from([current.get_address()]);
        let mut path = vec![current.clone()];

        for (index, pair) in pairs.iter().enumerate() {
            if pair.token0().get_chain_id() != input.chain_id() {
                return Err(RouteError::ChainMismatch { expected: input.chain_id(), found: pair.token0().get_chain_id() });
            }
            let next = pair.other_token(&current).ok_or(RouteError::Disconnected { index, token: current.get_address() })?.clone();
            if !seen.insert(next.get_address()) {
                return Err(RouteError::RepeatedToken(next.get_address()));
            }
            path.push(next.clone());
            current = next;
        }

        let expected = output.wrapped();
        if current != expected {
            return Err(RouteError::WrongOutput { expected: expected.get_address(), found: current.get_address() });
        }

        Ok(Route { pairs, path, input, output })
    }

    /// Number of pairs traversed.
    pub fn hops(&self) -> usize {
        self.pairs.len()
    }

    pub fn tokens_count(&self) -> usize {
        self.path.len()
    }

    /// True when `address` is a token of the path or the liquidity token of a pair.
    pub fn involves_address(&self, address: Address) -> bool {
        self.path.iter().any(|token| token.get_address() == address) || self.pairs.iter().any(|pair| pair.get_address() == address)
    }
}

impl Hash for Route {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.pairs.hash(state);
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.input == other.input && self.output == other.output && self.path == other.path && self.pairs == other.pairs
    }
}

impl Eq for Route {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::token::Token;
    use std::sync::Arc;

    fn tokens() -> (TokenWrapper, TokenWrapper, TokenWrapper) {
        (Arc::new(Token::repeat_byte(1)), Arc::new(Token::repeat_byte(2)), Arc::new(Token::repeat_byte(3)))
    }

    #[test]
    fn test_new_route() {
        let (token1, token2, token3) = tokens();
        let pair_1_2 = Pair::new(token1.clone(), token2.clone(), Address::repeat_byte(4));
        let pair_2_3 = Pair::new(token2.clone(), token3.clone(), Address::repeat_byte(5));

        let route = Route::new(vec![pair_1_2.clone(), pair_2_3.clone()], token1.clone().into(), token3.clone().into()).unwrap();

        assert_eq!(route.hops(), 2);
        assert_eq!(route.tokens_count(), 3);
        assert_eq!(route.path, vec![token1.clone(), token2.clone(), token3.clone()]);

        assert!(route.involves_address(token2.get_address()));
        assert!(route.involves_address(pair_2_3.get_address()));
        assert!(!route.involves_address(Address::repeat_byte(9)));
    }

    #[test]
    fn test_native_input_travels_as_weth() {
        let (token1, _, _) = tokens();
        let weth = Arc::new(Token::weth(1));
        let pair = Pair::new(weth.clone(), token1.clone(), Address::repeat_byte(4));

        let route = Route::new(vec![pair], Currency::ether(1), token1.clone().into()).unwrap();

        assert_eq!(route.path.first().unwrap(), &weth);
        assert!(route.input.is_native());
    }

    #[test]
    fn test_rejects_invalid_routes() {
        let (token1, token2, token3) = tokens();
        let pair_1_2 = Pair::new(token1.clone(), token2.clone(), Address::repeat_byte(4));
        let pair_2_3 = Pair::new(token2.clone(), token3.clone(), Address::repeat_byte(5));
        let pair_3_1 = Pair::new(token3.clone(), token1.clone(), Address::repeat_byte(6));

        assert_eq!(Route::new(vec![], token1.clone().into(), token2.clone().into()), Err(RouteError::Empty));
        assert!(matches!(
            Route::new(vec![pair_2_3.clone()], token1.clone().into(), token3.clone().into()),
            Err(RouteError::Disconnected { index: 0, .. })
        ));
        assert!(matches!(
            Route::new(vec![pair_1_2.clone()], token1.clone().into(), token3.clone().into()),
            Err(RouteError::WrongOutput { .. })
        ));
        assert_eq!(
            Route::new(vec![pair_1_2, pair_2_3, pair_3_1], token1.clone().into(), token1.clone().into()),
            Err(RouteError::RepeatedToken(token1.get_address()))
        );
    }
}
