pub mod exchange;
pub mod pair;

pub use exchange::Exchange;
pub use pair::Pair;
