//! Mutable calculations over monetary amounts.
//!
//! A calculation holds a running type and amount. Every operation that
//! consumes another amount reconciles the two types first, so adding pounds
//! to dollars fails instead of producing nonsense.
//!
//! When a scale is fixed, the running amount carries exactly that many
//! fractional digits after every operation, with one deliberate exception:
//! multiplying by a factor that has fractional digits keeps the product at
//! full precision for that step.

use coinage_shared::types::{MAX_SCALE, divide_exact};
use coinage_shared::{MoneyError, MoneyResult, RoundingRule};
use rust_decimal::Decimal;

use super::allocation::Allocator;
use super::monetary_type::MonetaryType;
use super::source::MoneySource;
use super::value::MonetaryValue;

/// How a consumed amount merges into the running amount.
#[derive(Debug, Clone, Copy)]
enum Merge {
    Add,
    Subtract,
    Max,
    Min,
}

impl Merge {
    fn apply(self, current: Decimal, operand: Decimal) -> MoneyResult<Decimal> {
        match self {
            Self::Add => current.checked_add(operand).ok_or(MoneyError::Overflow),
            Self::Subtract => current.checked_sub(operand).ok_or(MoneyError::Overflow),
            Self::Max => Ok(current.max(operand)),
            Self::Min => Ok(current.min(operand)),
        }
    }
}

/// A running monetary calculation.
///
/// Operations mutate in place and hand back `&mut Self` so they chain:
///
/// ```
/// use coinage_core::currency::MonetaryType;
/// use coinage_shared::Locale;
///
/// let usd = MonetaryType::for_locale(Locale::US);
/// let total = usd
///     .from_minor(80)
///     .open()
///     .add(&usd.from_minor(20))?
///     .negate()
///     .materialize();
/// assert_eq!(total, usd.from_minor(-100));
/// # Ok::<(), coinage_shared::MoneyError>(())
/// ```
///
/// A failed operation leaves the calculation untouched. Not safe for
/// concurrent mutation; confine each calculation to one owner.
#[derive(Debug, Clone)]
pub struct MonetaryAccumulator {
    monetary_type: MonetaryType,
    amount: Decimal,
    scale: Option<u32>,
    rounding: RoundingRule,
}

impl MonetaryAccumulator {
    pub(crate) fn unconstrained(monetary_type: MonetaryType, amount: Decimal) -> Self {
        Self {
            monetary_type,
            amount,
            scale: None,
            rounding: RoundingRule::default(),
        }
    }

    pub(crate) fn new(
        monetary_type: MonetaryType,
        amount: Decimal,
        scale: Option<u32>,
        rounding: RoundingRule,
    ) -> MoneyResult<Self> {
        if let Some(scale) = scale
            && scale > MAX_SCALE
        {
            return Err(MoneyError::InvalidArgument(format!(
                "scale {scale} exceeds maximum of {MAX_SCALE}"
            )));
        }
        let mut calc = Self {
            monetary_type,
            amount,
            scale,
            rounding,
        };
        calc.amount = calc.fit(amount)?;
        Ok(calc)
    }

    /// Maps a signed scale onto an optional one: negative means unconstrained.
    pub(crate) fn normalize_scale(scale: i32) -> MoneyResult<Option<u32>> {
        match u32::try_from(scale) {
            Err(_) => Ok(None),
            Ok(scale) if scale > MAX_SCALE => Err(MoneyError::InvalidArgument(format!(
                "scale {scale} exceeds maximum of {MAX_SCALE}"
            ))),
            Ok(scale) => Ok(Some(scale)),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The amount computed so far.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The type of the calculation.
    #[must_use]
    pub fn monetary_type(&self) -> &MonetaryType {
        &self.monetary_type
    }

    /// The fixed scale, or `None` when unconstrained.
    #[must_use]
    pub fn scale(&self) -> Option<u32> {
        self.scale
    }

    /// The rounding rule applied when a scale is fixed.
    #[must_use]
    pub fn rounding(&self) -> RoundingRule {
        self.rounding
    }

    /// Replaces the amount, rescaling it to the fixed scale.
    pub fn set_amount(&mut self, amount: Decimal) -> MoneyResult<&mut Self> {
        self.amount = self.fit(amount)?;
        Ok(self)
    }

    /// Replaces the type without reconciliation.
    pub fn set_type(&mut self, monetary_type: MonetaryType) -> &mut Self {
        self.monetary_type = monetary_type;
        self
    }

    // ------------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------------

    /// Snapshot of the current type and amount. The calculation stays usable.
    #[must_use]
    pub fn materialize(&self) -> MonetaryValue {
        MonetaryValue::new(self.monetary_type.clone(), self.amount)
    }

    /// Copies the current state into an unconstrained calculation.
    #[must_use]
    pub fn open_unscaled(&self) -> Self {
        Self::unconstrained(self.monetary_type.clone(), self.amount)
    }

    /// Starts distributing the current amount into parts.
    pub fn splitter(&mut self) -> MoneyResult<Allocator<'_>> {
        let scale = self.scale.ok_or(MoneyError::NoScaleSet)?;
        Ok(Allocator::new(self, scale))
    }

    // ------------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------------

    /// Adds an amount.
    pub fn add<'a>(&mut self, source: impl Into<MoneySource<'a>>) -> MoneyResult<&mut Self> {
        self.merge_all([source.into()], Merge::Add)
    }

    /// Adds several amounts; if any cannot be reconciled, none are applied.
    pub fn add_all<'a, I, S>(&mut self, sources: I) -> MoneyResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<MoneySource<'a>>,
    {
        self.merge_all(sources.into_iter().map(Into::into), Merge::Add)
    }

    /// Subtracts an amount.
    pub fn subtract<'a>(&mut self, source: impl Into<MoneySource<'a>>) -> MoneyResult<&mut Self> {
        self.merge_all([source.into()], Merge::Subtract)
    }

    /// Subtracts several amounts; if any cannot be reconciled, none are
    /// applied.
    pub fn subtract_all<'a, I, S>(&mut self, sources: I) -> MoneyResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<MoneySource<'a>>,
    {
        self.merge_all(sources.into_iter().map(Into::into), Merge::Subtract)
    }

    /// Keeps the larger of the running amount and the supplied amount.
    pub fn max<'a>(&mut self, source: impl Into<MoneySource<'a>>) -> MoneyResult<&mut Self> {
        self.merge_all([source.into()], Merge::Max)
    }

    /// Keeps the smaller of the running amount and the supplied amount.
    pub fn min<'a>(&mut self, source: impl Into<MoneySource<'a>>) -> MoneyResult<&mut Self> {
        self.merge_all([source.into()], Merge::Min)
    }

    /// Multiplies the running amount.
    ///
    /// The fixed scale is re-applied only for factors without fractional
    /// digits (`factor.scale() == 0`); other factors leave the product at
    /// full precision. A full-precision product with more than 28 places is
    /// rounded once to 28 with the calculation's rule.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if the product does not fit in a decimal.
    pub fn multiply(&mut self, factor: Decimal) -> MoneyResult<&mut Self> {
        let scale = match self.scale {
            Some(scale) if factor.scale() == 0 => scale,
            _ => (self.amount.scale() + factor.scale()).min(MAX_SCALE),
        };
        self.amount = self
            .rounding
            .multiply_divide(self.amount, factor, Decimal::ONE, scale)?;
        Ok(self)
    }

    /// Divides the running amount.
    ///
    /// With a fixed scale the exact quotient is rounded once to it.
    /// Otherwise the quotient must terminate within 28 places and is kept
    /// exactly.
    ///
    /// # Arguments
    ///
    /// * `divisor` - Any non-zero decimal
    ///
    /// # Errors
    ///
    /// - `DivisionByZero` if `divisor` is zero
    /// - `InexactDivision` if no scale is fixed and the quotient does not
    ///   terminate, as for 10 / 3
    /// - `Overflow` if the quotient does not fit in a decimal
    ///
    /// # Example
    ///
    /// ```
    /// use coinage_core::currency::MonetaryType;
    /// use coinage_shared::{Locale, MoneyError, RoundingRule};
    /// use rust_decimal_macros::dec;
    ///
    /// let usd = MonetaryType::for_locale(Locale::US);
    /// let mut calc = usd.from_major(dec!(10)).open_scaled(2, Some(RoundingRule::Up))?;
    /// calc.divide(dec!(3))?;
    /// assert_eq!(calc.amount(), dec!(3.34));
    ///
    /// let mut exact = usd.from_major(dec!(10)).open();
    /// assert!(matches!(exact.divide(dec!(3)), Err(MoneyError::InexactDivision)));
    /// exact.divide(dec!(4))?;
    /// assert_eq!(exact.amount(), dec!(2.5));
    /// # Ok::<(), MoneyError>(())
    /// ```
    pub fn divide(&mut self, divisor: Decimal) -> MoneyResult<&mut Self> {
        self.amount = match self.scale {
            Some(scale) => self.rounding.divide(self.amount, divisor, scale)?,
            None => divide_exact(self.amount, divisor)?,
        };
        Ok(self)
    }

    /// Replaces the running amount with its absolute value.
    pub fn abs(&mut self) -> &mut Self {
        self.amount = self.amount.abs();
        self
    }

    /// Negates the running amount.
    pub fn negate(&mut self) -> &mut Self {
        self.amount = -self.amount;
        self
    }

    /// Resets the running amount to zero at the fixed scale, keeping the type.
    pub fn zero(&mut self) -> &mut Self {
        self.amount = match self.scale {
            Some(scale) => Decimal::new(0, scale),
            None => Decimal::ZERO,
        };
        self
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn fit(&self, amount: Decimal) -> MoneyResult<Decimal> {
        match self.scale {
            Some(scale) => self.rounding.rescale(amount, scale),
            None => Ok(amount),
        }
    }

    /// Stages every source against a copy of the state and commits only when
    /// all of them succeed.
    fn merge_all<'a>(
        &mut self,
        sources: impl IntoIterator<Item = MoneySource<'a>>,
        merge: Merge,
    ) -> MoneyResult<&mut Self> {
        let mut monetary_type = self.monetary_type.clone();
        let mut amount = self.amount;
        for source in sources {
            monetary_type = monetary_type.combine(source.monetary_type())?;
            let operand = self.fit(source.amount())?;
            amount = self.fit(merge.apply(amount, operand)?)?;
        }
        self.monetary_type = monetary_type;
        self.amount = amount;
        Ok(self)
    }
}

impl PartialEq for MonetaryAccumulator {
    fn eq(&self, other: &Self) -> bool {
        self.monetary_type == other.monetary_type
            && self.amount == other.amount
            && self.scale == other.scale
            && self.rounding == other.rounding
    }
}

impl std::fmt::Display for MonetaryAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.materialize(), f)
    }
}
