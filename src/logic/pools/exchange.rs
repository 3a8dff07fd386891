use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, VariantNames};

/// Liquidity venue that produced a quote.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, VariantNames, EnumIter, Default, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exchange {
    Uniswap,
    Sushiswap,
    #[default]
    Undefined,
}

impl Exchange {
    /// Venues that can actually be queried.
    pub fn venues() -> impl Iterator<Item = Exchange> {
        use strum::IntoEnumIterator;
        Exchange::iter().filter(|exchange| *exchange != Exchange::Undefined)
    }
}
