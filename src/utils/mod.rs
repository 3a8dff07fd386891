pub mod address;
pub mod amount;
pub mod cache;
pub mod config_loader;
pub mod constants;
pub mod percent;
pub mod price;
pub mod token;

pub use address::{is_ens_name, parse_address};
pub use amount::{AmountError, CurrencyAmount, ParseError, try_parse_amount};
pub use cache::{BalanceCache, CacheStats};
pub use config_loader::*;
pub use constants::*;
pub use percent::Percent;
pub use price::Price;
pub use token::{Currency, NativeCurrency, Token, TokenWrapper};
