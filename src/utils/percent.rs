use crate::utils::amount::AmountError;
use crate::utils::constants::BIPS_BASE;
use alloy_primitives::U256;
use alloy_primitives::ruint::{Uint, UintTryFrom};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Wide enough for the product of three 256-bit values.
pub(crate) type U768 = Uint<768, 12>;

pub(crate) fn widen(value: U256) -> U768 {
    U768::from(value)
}

pub(crate) fn narrow(value: U768) -> Option<U256> {
    U256::uint_try_from(value).ok()
}

pub(crate) fn div_ceil(numerator: U768, denominator: U768) -> U768 {
    let (quotient, remainder) = numerator.div_rem(denominator);
    if remainder.is_zero() { quotient } else { quotient + U768::from(1u64) }
}

fn pow10(exp: usize) -> U768 {
    U768::from(10u64).pow(U768::from(exp))
}

/// Renders `numerator / denominator` with exactly `places` fractional digits, rounded down.
pub(crate) fn format_fixed(numerator: U768, denominator: U768, places: usize) -> String {
    let scaled = numerator * pow10(places) / denominator;
    let digits = scaled.to_string();
    if places == 0 {
        return digits;
    }
    let padded = format!("{:0>width$}", digits, width = places + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - places);
    format!("{int_part}.{frac_part}")
}

/// Renders `numerator / denominator` keeping `significant` digits, rounded down.
/// The integer part is never truncated.
pub(crate) fn format_significant(numerator: U768, denominator: U768, significant: usize) -> String {
    if numerator.is_zero() || significant == 0 {
        return "0".to_string();
    }
    let integer = numerator / denominator;
    let places = if integer.is_zero() {
        // count the zeros between the decimal point and the first significant digit
        let mut leading = 0usize;
        while (numerator * pow10(leading + 1)) / denominator < U768::from(1u64) {
            leading += 1;
        }
        leading + significant
    } else {
        let int_digits = integer.to_string().len();
        significant.saturating_sub(int_digits)
    };
    trim_fraction(format_fixed(numerator, denominator, places))
}

pub(crate) fn trim_fraction(value: String) -> String {
    if !value.contains('.') {
        return value;
    }
    value.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[derive(Deserialize)]
struct RawPercent {
    numerator: U256,
    denominator: U256,
}

impl TryFrom<RawPercent> for Percent {
    type Error = AmountError;

    fn try_from(raw: RawPercent) -> Result<Self, Self::Error> {
        Percent::new(raw.numerator, raw.denominator)
    }
}

/// Exact rational percentage. `1/100` is one percent.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawPercent")]
pub struct Percent {
    numerator: U256,
    denominator: U256,
}

impl Percent {
    pub const ZERO: Percent = Percent { numerator: U256::ZERO, denominator: U256::from_limbs([1, 0, 0, 0]) };

    pub fn new(numerator: U256, denominator: U256) -> Result<Self, AmountError> {
        if denominator.is_zero() {
            return Err(AmountError::ZeroDenominator);
        }
        Ok(Self { numerator, denominator })
    }

    pub fn from_bips(bips: u64) -> Self {
        Self { numerator: U256::from(bips), denominator: U256::from(BIPS_BASE) }
    }

    pub fn from_percent(percent: u64) -> Self {
        Self { numerator: U256::from(percent), denominator: U256::from(100u64) }
    }

    pub fn numerator(&self) -> U256 {
        self.numerator
    }

    pub fn denominator(&self) -> U256 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn add(&self, other: &Percent) -> Result<Percent, AmountError> {
        if self.denominator == other.denominator {
            let numerator = self.numerator.checked_add(other.numerator).ok_or(AmountError::Overflow)?;
            return Percent::new(numerator, self.denominator);
        }
        let left = widen(self.numerator) * widen(other.denominator);
        let right = widen(other.numerator) * widen(self.denominator);
        let numerator = narrow(left + right).ok_or(AmountError::Overflow)?;
        let denominator = narrow(widen(self.denominator) * widen(other.denominator)).ok_or(AmountError::Overflow)?;
        Percent::new(numerator, denominator)
    }

    /// `self - other`, floored at zero.
    pub fn saturating_sub(&self, other: &Percent) -> Result<Percent, AmountError> {
        if self <= other {
            return Ok(Percent::ZERO);
        }
        let left = widen(self.numerator) * widen(other.denominator);
        let right = widen(other.numerator) * widen(self.denominator);
        let numerator = narrow(left - right).ok_or(AmountError::Overflow)?;
        let denominator = narrow(widen(self.denominator) * widen(other.denominator)).ok_or(AmountError::Overflow)?;
        Percent::new(numerator, denominator)
    }

    /// Percentage with `places` decimals, e.g. `0.50` for fifty bips.
    pub fn to_fixed(&self, places: usize) -> String {
        format_fixed(widen(self.numerator) * U768::from(100u64), widen(self.denominator), places)
    }

    pub fn to_significant(&self, significant: usize) -> String {
        format_significant(widen(self.numerator) * U768::from(100u64), widen(self.denominator), significant)
    }
}

impl PartialEq for Percent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Percent {}

impl Ord for Percent {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = widen(self.numerator) * widen(other.denominator);
        let right = widen(other.numerator) * widen(self.denominator);
        left.cmp(&right)
    }
}

impl PartialOrd for Percent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.to_fixed(2))
    }
}
