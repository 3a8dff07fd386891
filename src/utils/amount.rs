use crate::utils::percent::{U768, format_fixed, format_significant, trim_fraction, widen};
use crate::utils::token::Currency;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("{found} fractional digits exceed the {allowed} decimals of the currency")]
    TooManyDecimals { found: usize, allowed: u8 },
    #[error("amount does not fit in 256 bits")]
    Overflow,
    #[error("amount is zero")]
    Zero,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("zero denominator")]
    ZeroDenominator,
}

/// A non-negative quantity of a currency in its smallest unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyAmount {
    currency: Currency,
    raw: U256,
}

impl CurrencyAmount {
    pub fn from_raw(currency: Currency, raw: U256) -> Self {
        Self { currency, raw }
    }

    pub fn zero(currency: Currency) -> Self {
        Self { currency, raw: U256::ZERO }
    }

    /// Parses an integer string already expressed in smallest units.
    pub fn from_raw_str(currency: Currency, raw: &str) -> Result<Self, ParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ParseError::Empty);
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidNumber(raw.to_string()));
        }
        let value = U256::from_str_radix(raw, 10).map_err(|_| ParseError::Overflow)?;
        Ok(Self { currency, raw: value })
    }

    /// Parses a human decimal string such as `"1.25"` into smallest units.
    pub fn from_decimal_str(currency: Currency, value: &str) -> Result<Self, ParseError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ParseError::Empty);
        }

        let (int_part, frac_part) = match value.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (value, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseError::InvalidNumber(value.to_string()));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidNumber(value.to_string()));
        }

        let decimals = currency.decimals();
        if frac_part.len() > decimals as usize {
            return Err(ParseError::TooManyDecimals { found: frac_part.len(), allowed: decimals });
        }

        let digits = format!("{int_part}{frac_part:0<width$}", width = decimals as usize);
        let digits = digits.trim_start_matches('0');
        let raw = if digits.is_empty() { U256::ZERO } else { U256::from_str_radix(digits, 10).map_err(|_| ParseError::Overflow)? };
        if raw.is_zero() {
            return Err(ParseError::Zero);
        }
        Ok(Self { currency, raw })
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    fn ensure_same_currency(&self, other: &CurrencyAmount) -> Result<(), AmountError> {
        if self.currency != other.currency {
            return Err(AmountError::CurrencyMismatch { left: self.currency.symbol(), right: other.currency.symbol() });
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &CurrencyAmount) -> Result<CurrencyAmount, AmountError> {
        self.ensure_same_currency(other)?;
        let raw = self.raw.checked_add(other.raw).ok_or(AmountError::Overflow)?;
        Ok(Self { currency: self.currency.clone(), raw })
    }

    pub fn checked_sub(&self, other: &CurrencyAmount) -> Result<CurrencyAmount, AmountError> {
        self.ensure_same_currency(other)?;
        let raw = self.raw.checked_sub(other.raw).ok_or(AmountError::Underflow)?;
        Ok(Self { currency: self.currency.clone(), raw })
    }

    pub fn compare(&self, other: &CurrencyAmount) -> Result<Ordering, AmountError> {
        self.ensure_same_currency(other)?;
        Ok(self.raw.cmp(&other.raw))
    }

    pub fn less_than(&self, other: &CurrencyAmount) -> Result<bool, AmountError> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    pub fn greater_than(&self, other: &CurrencyAmount) -> Result<bool, AmountError> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    /// Full precision decimal rendering with trailing zeros removed.
    pub fn to_exact(&self) -> String {
        trim_fraction(format_fixed(widen(self.raw), widen(self.currency.exp()), self.currency.decimals() as usize))
    }

    pub fn to_fixed(&self, places: usize) -> String {
        format_fixed(widen(self.raw), widen(self.currency.exp()), places)
    }

    /// Display rendering, rounded down to `significant` digits.
    pub fn to_significant(&self, significant: usize) -> String {
        if self.raw.is_zero() {
            return "0".to_string();
        }
        format_significant(widen(self.raw), widen(self.currency.exp()), significant)
    }

    pub(crate) fn wide(&self) -> U768 {
        widen(self.raw)
    }
}

impl Display for CurrencyAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.to_significant(6), self.currency.symbol())
    }
}

/// Parses what the user typed. Anything unusable, including zero, means "no amount entered".
pub fn try_parse_amount(value: Option<&str>, currency: Option<&Currency>) -> Option<CurrencyAmount> {
    let (value, currency) = (value?, currency?);
    if value.is_empty() {
        return None;
    }
    match CurrencyAmount::from_decimal_str(currency.clone(), value) {
        Ok(amount) => Some(amount),
        Err(e) => {
            debug!("Failed to parse input amount {:?}: {}", value, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::token::Token;
    use alloy_primitives::Address;

    fn usdc() -> Currency {
        Currency::from(Token::new_with_data(1, Address::repeat_byte(7), Some("USDC".to_string()), None, Some(6)))
    }

    #[test]
    fn test_parse_decimal() {
        let amount = CurrencyAmount::from_decimal_str(usdc(), "1.5").unwrap();
        assert_eq!(amount.raw(), U256::from(1_500_000u64));

        let amount = CurrencyAmount::from_decimal_str(usdc(), ".25").unwrap();
        assert_eq!(amount.raw(), U256::from(250_000u64));

        let amount = CurrencyAmount::from_decimal_str(usdc(), "12.").unwrap();
        assert_eq!(amount.raw(), U256::from(12_000_000u64));

        let amount = CurrencyAmount::from_decimal_str(Currency::ether(1), "1").unwrap();
        assert_eq!(amount.raw(), U256::from(10).pow(U256::from(18)));
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!(CurrencyAmount::from_decimal_str(usdc(), ""), Err(ParseError::Empty));
        assert_eq!(CurrencyAmount::from_decimal_str(usdc(), "."), Err(ParseError::InvalidNumber(".".to_string())));
        assert_eq!(CurrencyAmount::from_decimal_str(usdc(), "1.2.3"), Err(ParseError::InvalidNumber("1.2.3".to_string())));
        assert_eq!(CurrencyAmount::from_decimal_str(usdc(), "-1"), Err(ParseError::InvalidNumber("-1".to_string())));
        assert_eq!(CurrencyAmount::from_decimal_str(usdc(), "abc"), Err(ParseError::InvalidNumber("abc".to_string())));
        assert_eq!(CurrencyAmount::from_decimal_str(usdc(), "1.0000001"), Err(ParseError::TooManyDecimals { found: 7, allowed: 6 }));
        assert_eq!(CurrencyAmount::from_decimal_str(usdc(), "0.000"), Err(ParseError::Zero));
    }

    #[test]
    fn test_try_parse_amount_treats_failures_as_empty() {
        let currency = usdc();
        assert!(try_parse_amount(None, Some(&currency)).is_none());
        assert!(try_parse_amount(Some("1"), None).is_none());
        assert!(try_parse_amount(Some(""), Some(&currency)).is_none());
        assert!(try_parse_amount(Some("0"), Some(&currency)).is_none());
        assert!(try_parse_amount(Some("1.1234567"), Some(&currency)).is_none());
        assert_eq!(try_parse_amount(Some("2"), Some(&currency)).unwrap().raw(), U256::from(2_000_000u64));
    }

    #[test]
    fn test_parse_then_format_keeps_raw_value() {
        let currency = usdc();
        for input in ["1", "0.000001", "123456.789", "10.10", "999999999999.999999"] {
            let parsed = CurrencyAmount::from_decimal_str(currency.clone(), input).unwrap();
            let reparsed = CurrencyAmount::from_decimal_str(currency.clone(), &parsed.to_exact()).unwrap();
            assert_eq!(parsed.raw(), reparsed.raw(), "round trip of {input}");
        }
        assert_eq!(CurrencyAmount::from_decimal_str(currency, "10.10").unwrap().to_exact(), "10.1");
    }

    #[test]
    fn test_arithmetic_requires_same_currency() {
        let a = CurrencyAmount::from_raw(usdc(), U256::from(5));
        let b = CurrencyAmount::from_raw(Currency::ether(1), U256::from(5));
        assert!(matches!(a.checked_add(&b), Err(AmountError::CurrencyMismatch { .. })));
        assert!(a.compare(&b).is_err());

        let c = CurrencyAmount::from_raw(usdc(), U256::from(7));
        assert_eq!(a.checked_add(&c).unwrap().raw(), U256::from(12));
        assert_eq!(c.checked_sub(&a).unwrap().raw(), U256::from(2));
        assert_eq!(a.checked_sub(&c), Err(AmountError::Underflow));
        assert!(a.less_than(&c).unwrap());
        assert!(c.greater_than(&a).unwrap());
    }

    #[test]
    fn test_display_helpers() {
        let amount = CurrencyAmount::from_decimal_str(Currency::ether(1), "1.23456789").unwrap();
        assert_eq!(amount.to_significant(4), "1.234");
        assert_eq!(amount.to_fixed(2), "1.23");
        assert_eq!(amount.to_string(), "1.23456 ETH");
        assert_eq!(CurrencyAmount::zero(usdc()).to_exact(), "0");
    }
}
