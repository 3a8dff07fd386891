use crate::utils::amount::{AmountError, CurrencyAmount};
use crate::utils::percent::{Percent, U768, format_significant, widen};
use crate::utils::token::Currency;
use alloy_primitives::U256;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Exact ratio of `quote` units received per `base` unit spent, in raw units.
#[derive(Clone, Debug)]
pub struct Price {
    base: Currency,
    quote: Currency,
    // raw quote amount
    numerator: U256,
    // raw base amount
    denominator: U256,
}

impl Price {
    pub fn new(base: Currency, quote: Currency, denominator: U256, numerator: U256) -> Result<Self, AmountError> {
        if denominator.is_zero() {
            return Err(AmountError::ZeroDenominator);
        }
        Ok(Self { base, quote, numerator, denominator })
    }

    pub fn from_amounts(base_amount: &CurrencyAmount, quote_amount: &CurrencyAmount) -> Result<Self, AmountError> {
        Price::new(base_amount.currency().clone(), quote_amount.currency().clone(), base_amount.raw(), quote_amount.raw())
    }

    pub fn base(&self) -> &Currency {
        &self.base
    }

    pub fn quote(&self) -> &Currency {
        &self.quote
    }

    fn ensure_same_pair(&self, other: &Price) -> Result<(), AmountError> {
        if self.base != other.base || self.quote != other.quote {
            return Err(AmountError::CurrencyMismatch {
                left: format!("{}/{}", self.quote, self.base),
                right: format!("{}/{}", other.quote, other.base),
            });
        }
        Ok(())
    }

    /// Exact comparison of two prices over the same pair.
    pub fn compare(&self, other: &Price) -> Result<Ordering, AmountError> {
        self.ensure_same_pair(other)?;
        let left = widen(self.numerator) * widen(other.denominator);
        let right = widen(other.numerator) * widen(self.denominator);
        Ok(left.cmp(&right))
    }

    /// True when `self > other * (1 + tolerance)`.
    pub fn exceeds_by_more_than(&self, other: &Price, tolerance: &Percent) -> Result<bool, AmountError> {
        self.ensure_same_pair(other)?;
        let (tol_num, tol_den) = (widen(tolerance.numerator()), widen(tolerance.denominator()));
        let left = widen(self.numerator) * widen(other.denominator) * tol_den;
        let right = widen(other.numerator) * widen(self.denominator) * (tol_den + tol_num);
        Ok(left > right)
    }

    /// Human-unit rendering, rounded down.
    pub fn to_significant(&self, significant: usize) -> String {
        let numerator: U768 = widen(self.numerator) * widen(self.base.exp());
        let denominator: U768 = widen(self.denominator) * widen(self.quote.exp());
        format_significant(numerator, denominator, significant)
    }

    pub fn invert(&self) -> Result<Price, AmountError> {
        Price::new(self.quote.clone(), self.base.clone(), self.numerator, self.denominator)
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} per {}", self.to_significant(6), self.quote, self.base)
    }
}
