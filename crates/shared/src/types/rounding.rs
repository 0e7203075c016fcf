//! Rounding rules and scale-exact decimal operations.
//!
//! CRITICAL: every fixed-scale result produced here carries exactly the
//! requested number of fractional digits, so downstream sums never drift.

use std::cmp::Ordering;

use ethnum::U256;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{MoneyError, MoneyResult};

/// Largest scale a `Decimal` can carry.
pub const MAX_SCALE: u32 = 28;

/// Policy used to drop digits beyond a target scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingRule {
    /// Away from zero whenever digits are discarded.
    Up,
    /// Towards zero (truncation).
    Down,
    /// Towards positive infinity.
    Ceiling,
    /// Towards negative infinity.
    Floor,
    /// Nearest neighbour, ties away from zero.
    #[default]
    HalfUp,
    /// Nearest neighbour, ties towards zero.
    HalfDown,
    /// Nearest neighbour, ties to the even neighbour (banker's rounding).
    HalfEven,
}

impl RoundingRule {
    /// The equivalent `rust_decimal` strategy.
    #[must_use]
    pub const fn strategy(self) -> RoundingStrategy {
        match self {
            Self::Up => RoundingStrategy::AwayFromZero,
            Self::Down => RoundingStrategy::ToZero,
            Self::Ceiling => RoundingStrategy::ToPositiveInfinity,
            Self::Floor => RoundingStrategy::ToNegativeInfinity,
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfDown => RoundingStrategy::MidpointTowardZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    /// Rounds `amount` to `scale` places and pads it so that its scale is
    /// exactly `scale`.
    ///
    /// Fails with [`MoneyError::Overflow`] when the padded mantissa no longer
    /// fits.
    pub fn rescale(self, amount: Decimal, scale: u32) -> MoneyResult<Decimal> {
        let mut rounded = amount.round_dp_with_strategy(scale, self.strategy());
        rounded.rescale(scale);
        if rounded.scale() == scale {
            Ok(rounded)
        } else {
            Err(MoneyError::Overflow)
        }
    }

    /// Divides `dividend` by `divisor`, returning the quotient correctly
    /// rounded to exactly `scale` places.
    ///
    /// The rounding decision is made from the exact remainder, never from an
    /// already rounded intermediate quotient.
    ///
    /// # Errors
    ///
    /// [`MoneyError::DivisionByZero`] for a zero divisor and
    /// [`MoneyError::Overflow`] when the rounded quotient does not fit.
    ///
    /// # Example
    ///
    /// ```
    /// use coinage_shared::RoundingRule;
    /// use rust_decimal_macros::dec;
    ///
    /// let third = RoundingRule::Up.divide(dec!(1.00), dec!(3), 2)?;
    /// assert_eq!(third.to_string(), "0.34");
    /// # Ok::<(), coinage_shared::MoneyError>(())
    /// ```
    pub fn divide(self, dividend: Decimal, divisor: Decimal, scale: u32) -> MoneyResult<Decimal> {
        self.multiply_divide(dividend, Decimal::ONE, divisor, scale)
    }

    /// Computes `value * factor / divisor` rounded once to exactly `scale`
    /// places.
    ///
    /// The product is never materialised as a `Decimal`, so digits beyond the
    /// 28 a `Decimal` can hold still take part in the rounding decision.
    ///
    /// # Arguments
    ///
    /// * `value` - The amount being scaled
    /// * `factor` - Multiplier applied before the division
    /// * `divisor` - Non-zero divisor
    /// * `scale` - Number of fractional digits in the result
    ///
    /// # Errors
    ///
    /// [`MoneyError::DivisionByZero`] for a zero divisor and
    /// [`MoneyError::Overflow`] when the rounded quotient does not fit.
    pub fn multiply_divide(
        self,
        value: Decimal,
        factor: Decimal,
        divisor: Decimal,
        scale: u32,
    ) -> MoneyResult<Decimal> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        if scale > MAX_SCALE {
            return Err(MoneyError::Overflow);
        }
        let negative = !value.is_zero()
            && !factor.is_zero()
            && (value.is_sign_negative() ^ factor.is_sign_negative() ^ divisor.is_sign_negative());

        let truncated = Truncated::of(value, factor, divisor, scale)?;
        let mut magnitude = truncated.quotient;
        if let Some(half) = truncated.half
            && self.rounds_away(half, magnitude, negative)
        {
            magnitude = magnitude.checked_add(U256::ONE).ok_or(MoneyError::Overflow)?;
        }
        to_decimal(magnitude, negative, scale)
    }

    /// Decides whether a truncated magnitude must move one unit away from
    /// zero, given how twice the non-zero remainder compares to the divisor.
    fn rounds_away(self, half: Ordering, magnitude: U256, negative: bool) -> bool {
        match self {
            Self::Up => true,
            Self::Down => false,
            Self::Ceiling => !negative,
            Self::Floor => negative,
            Self::HalfUp => half != Ordering::Less,
            Self::HalfDown => half == Ordering::Greater,
            Self::HalfEven => {
                half == Ordering::Greater
                    || (half == Ordering::Equal && magnitude % U256::new(2) != U256::ZERO)
            }
        }
    }
}

/// Quotient of two unsigned integers truncated towards zero.
struct Truncated {
    quotient: U256,
    /// Twice the remainder against the divisor; `None` for an exact quotient.
    half: Option<Ordering>,
}

impl Truncated {
    /// `|value * factor / divisor|` truncated to `scale` places, expressed as
    /// an integer count of `10^-scale` units.
    fn of(value: Decimal, factor: Decimal, divisor: Decimal, scale: u32) -> MoneyResult<Self> {
        // Mantissas hold at most 96 bits, so their product cannot overflow.
        let product = digits(value)
            .checked_mul(digits(factor))
            .ok_or(MoneyError::Overflow)?;
        let up = divisor.scale() + scale;
        let down = value.scale() + factor.scale();

        if up >= down {
            // A numerator past 256 bits over a 96-bit divisor cannot fit.
            let numerator = pow10(up - down)
                .and_then(|p| product.checked_mul(p))
                .ok_or(MoneyError::Overflow)?;
            Ok(Self::divide(numerator, digits(divisor)))
        } else {
            match pow10(down - up).and_then(|p| digits(divisor).checked_mul(p)) {
                Some(denominator) => Ok(Self::divide(product, denominator)),
                // The denominator dwarfs any 192-bit product.
                None => Ok(Self {
                    quotient: U256::ZERO,
                    half: (product != U256::ZERO).then_some(Ordering::Less),
                }),
            }
        }
    }

    fn divide(numerator: U256, denominator: U256) -> Self {
        let quotient = numerator / denominator;
        let remainder = numerator % denominator;
        let half = (remainder != U256::ZERO).then(|| remainder.cmp(&(denominator - remainder)));
        Self { quotient, half }
    }
}

impl std::fmt::Display for RoundingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Ceiling => "ceiling",
            Self::Floor => "floor",
            Self::HalfUp => "half_up",
            Self::HalfDown => "half_down",
            Self::HalfEven => "half_even",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for RoundingRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "ceiling" => Ok(Self::Ceiling),
            "floor" => Ok(Self::Floor),
            "half_up" => Ok(Self::HalfUp),
            "half_down" => Ok(Self::HalfDown),
            "half_even" => Ok(Self::HalfEven),
            _ => Err(format!("Unknown rounding rule: {s}")),
        }
    }
}

/// Divides without a target scale, failing unless the quotient terminates
/// within [`MAX_SCALE`] places.
///
/// The quotient keeps at least `dividend.scale() - divisor.scale()` places,
/// and more when the exact result needs them.
///
/// # Errors
///
/// [`MoneyError::DivisionByZero`] for a zero divisor,
/// [`MoneyError::InexactDivision`] when the quotient does not terminate (or
/// needs more than [`MAX_SCALE`] places) and [`MoneyError::Overflow`] when it
/// does not fit.
///
/// # Example
///
/// ```
/// use coinage_shared::{MoneyError, types::divide_exact};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(divide_exact(dec!(10), dec!(4))?, dec!(2.5));
/// assert_eq!(divide_exact(dec!(10), dec!(3)), Err(MoneyError::InexactDivision));
/// # Ok::<(), MoneyError>(())
/// ```
pub fn divide_exact(dividend: Decimal, divisor: Decimal) -> MoneyResult<Decimal> {
    if divisor.is_zero() {
        return Err(MoneyError::DivisionByZero);
    }
    // dividend / divisor == (m1 * 10^s2) / (m2 * 10^s1); both sides fit in
    // 96 + 94 bits.
    let numerator = pow10(divisor.scale())
        .and_then(|p| digits(dividend).checked_mul(p))
        .ok_or(MoneyError::Overflow)?;
    let denominator = pow10(dividend.scale())
        .and_then(|p| digits(divisor).checked_mul(p))
        .ok_or(MoneyError::Overflow)?;

    let mut reduced = denominator / gcd(numerator, denominator);
    let twos = strip_factor(&mut reduced, 2);
    let fives = strip_factor(&mut reduced, 5);
    if reduced != U256::ONE {
        return Err(MoneyError::InexactDivision);
    }

    let preferred = dividend.scale().saturating_sub(divisor.scale());
    let scale = twos.max(fives).max(preferred);
    if scale > MAX_SCALE {
        return Err(MoneyError::InexactDivision);
    }
    RoundingRule::Down.divide(dividend, divisor, scale)
}

fn digits(value: Decimal) -> U256 {
    U256::new(value.mantissa().unsigned_abs())
}

fn pow10(exponent: u32) -> Option<U256> {
    (0..exponent).try_fold(U256::ONE, |acc, _| acc.checked_mul(U256::new(10)))
}

fn gcd(mut a: U256, mut b: U256) -> U256 {
    while b != U256::ZERO {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Divides out every factor of `prime`, returning how many were removed.
fn strip_factor(value: &mut U256, prime: u32) -> u32 {
    let prime = U256::new(u128::from(prime));
    let mut count = 0;
    while *value != U256::ZERO && *value % prime == U256::ZERO {
        *value /= prime;
        count += 1;
    }
    count
}

fn to_decimal(magnitude: U256, negative: bool, scale: u32) -> MoneyResult<Decimal> {
    let (high, low) = magnitude.into_words();
    if high != 0 {
        return Err(MoneyError::Overflow);
    }
    let mantissa = i128::try_from(low).map_err(|_| MoneyError::Overflow)?;
    let signed = if negative { -mantissa } else { mantissa };
    Decimal::try_from_i128_with_scale(signed, scale).map_err(|_| MoneyError::Overflow)
}
