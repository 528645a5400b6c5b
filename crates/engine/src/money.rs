use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{CurrencyCode, EngineError, RateMap, ResultEngine};

/// Number of fractional digits of every persisted or returned amount.
pub const MONEY_SCALE: u32 = 2;

/// Money amount as a base-10 fixed-point decimal held at exactly two
/// fractional digits.
///
/// Use this type for **all** monetary values in the engine (item amounts,
/// share values, payments, settlement figures) to avoid floating-point drift.
/// Intermediate arithmetic happens on [`Decimal`] and is brought back to
/// `Money` with [`Money::round2`] (round half-up).
///
/// # Examples
///
/// ```rust
/// use engine::Money;
/// use rust_decimal::Decimal;
///
/// let amount = Money::from_minor(12_34);
/// assert_eq!(amount.to_string(), "12.34");
///
/// let third = Money::round2(Decimal::new(33_333, 3));
/// assert_eq!(third.to_string(), "33.33");
/// let half = Money::round2(Decimal::new(1_005, 3));
/// assert_eq!(half.to_string(), "1.01");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor().unwrap(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor().unwrap(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));

    /// Rounds a decimal to two places, half-up (midpoint away from zero).
    #[must_use]
    pub fn round2(value: Decimal) -> Self {
        let mut rounded =
            value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(MONEY_SCALE);
        Self(rounded)
    }

    /// Creates an amount from integer hundredths, the storage representation.
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, MONEY_SCALE))
    }

    /// Returns the amount as integer hundredths.
    pub fn minor(self) -> ResultEngine<i64> {
        let mut value = self.0;
        value.rescale(MONEY_SCALE);
        i64::try_from(value.mantissa())
            .map_err(|_| EngineError::InvalidAmount("amount too large".to_string()))
    }

    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the amount, or zero when it is negative.
    #[must_use]
    pub fn clamp_zero(self) -> Self {
        if self.is_negative() { Self::ZERO } else { self }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::round2(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money::round2(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money::round2(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }
        let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let normalized = rest.replace(',', ".");
        if normalized.starts_with('.') || normalized.starts_with("-.") {
            return Err(EngineError::InvalidAmount("invalid amount".to_string()));
        }
        let value = Decimal::from_str(&normalized)
            .map_err(|_| EngineError::InvalidAmount("invalid amount".to_string()))?;
        if value.scale() > MONEY_SCALE {
            return Err(EngineError::InvalidAmount("too many decimals".to_string()));
        }
        Ok(Money::round2(value))
    }
}

/// Converts `amount` expressed in `currency` into base-currency units.
///
/// Rates are quoted as base units per one unit of `currency`, so the amount
/// is multiplied by the rate. A currency without a rate is treated as base
/// (rate 1): the conversion is total and never fails.
#[must_use]
pub fn to_base(currency: CurrencyCode, amount: Money, rates: &RateMap) -> Money {
    Money::round2(amount.amount() * rates.rate(currency))
}

/// Sums item amounts after converting each one into base currency.
pub fn items_total_base<I>(items: I, rates: &RateMap) -> Money
where
    I: IntoIterator<Item = (CurrencyCode, Money)>,
{
    items
        .into_iter()
        .map(|(currency, amount)| to_base(currency, amount, rates))
        .sum()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::try_from(raw).unwrap()
    }

    #[test]
    fn display_keeps_two_digits() {
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::from_minor(1).to_string(), "0.01");
        assert_eq!(Money::from_minor(1050).to_string(), "10.50");
        assert_eq!(Money::from_minor(-1050).to_string(), "-10.50");
        assert_eq!(Money::round2(dec!(25)).to_string(), "25.00");
    }

    #[test]
    fn round2_is_half_up() {
        assert_eq!(Money::round2(dec!(0.005)), Money::from_minor(1));
        assert_eq!(Money::round2(dec!(0.004)), Money::ZERO);
        assert_eq!(Money::round2(dec!(2.675)), Money::from_minor(268));
        assert_eq!(Money::round2(dec!(-2.675)), Money::from_minor(-268));
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10.5".parse::<Money>().unwrap(), Money::from_minor(1050));
        assert_eq!("10,50".parse::<Money>().unwrap(), Money::from_minor(1050));
        assert_eq!("-0.01".parse::<Money>().unwrap(), Money::from_minor(-1));
        assert_eq!("+1.00".parse::<Money>().unwrap(), Money::from_minor(100));
        assert_eq!("  2.30 ".parse::<Money>().unwrap(), Money::from_minor(230));
    }

    #[test]
    fn parse_rejects_garbage_and_extra_decimals() {
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("12.345".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
    }

    #[test]
    fn minor_round_trips_storage_integers() {
        assert_eq!(Money::from_minor(65_750).minor().unwrap(), 65_750);
        assert_eq!(Money::round2(dec!(1.1)).minor().unwrap(), 110);
    }

    #[test]
    fn clamp_zero_drops_negative_amounts() {
        assert_eq!(Money::from_minor(-5).clamp_zero(), Money::ZERO);
        assert_eq!(Money::from_minor(5).clamp_zero(), Money::from_minor(5));
    }

    #[test]
    fn unknown_currency_converts_one_to_one() {
        let rates = RateMap::base();
        assert_eq!(
            to_base(code("XAU"), Money::from_minor(1234), &rates),
            Money::from_minor(1234)
        );
    }

    #[test]
    fn mixed_currency_items_total() {
        let rates = RateMap::from_iter([
            (code("USD"), dec!(36.25)),
            (code("JPY"), dec!(0.245)),
            (code("THB"), dec!(1)),
        ]);
        let total = items_total_base(
            [
                (code("USD"), Money::from_minor(1000)),
                (code("JPY"), Money::from_minor(100_000)),
                (code("THB"), Money::from_minor(5000)),
            ],
            &rates,
        );
        assert_eq!(total, Money::round2(dec!(657.50)));
        assert_eq!(total.to_string(), "657.50");
    }
}
