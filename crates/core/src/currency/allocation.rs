//! Splitting a calculated amount into parts without losing a cent.
//!
//! Shares are assigned from the highest index down. Each step divides what is
//! left of the pool among the parts not yet assigned, rounding to the
//! calculation's scale, and index 0 takes whatever remains. The parts
//! therefore always sum exactly to the original amount, and all rounding
//! residue lands on index 0.

use coinage_shared::{MoneyError, MoneyResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::debug;

use super::accumulator::MonetaryAccumulator;
use super::value::MonetaryValue;

/// Converts integer weights into proportions.
#[must_use]
pub fn proportions_from_i64(weights: &[i64]) -> Vec<Decimal> {
    weights.iter().copied().map(Decimal::from).collect()
}

/// Converts float weights into proportions. Non-finite weights are rejected.
pub fn proportions_from_f64(weights: &[f64]) -> MoneyResult<Vec<Decimal>> {
    weights
        .iter()
        .map(|&weight| {
            Decimal::from_f64(weight).ok_or_else(|| {
                MoneyError::InvalidArgument(format!("{weight} is not a finite proportion"))
            })
        })
        .collect()
}

/// Distributes the amount of a [`MonetaryAccumulator`] into parts.
///
/// Obtained from [`MonetaryAccumulator::splitter`]. Without proportions the
/// amount is split evenly; once any proportion is set, parts without one
/// weigh zero.
///
/// ```
/// use coinage_core::currency::MonetaryType;
/// use coinage_shared::{Locale, RoundingRule};
/// use rust_decimal_macros::dec;
///
/// let usd = MonetaryType::for_locale(Locale::US);
/// let mut calc = usd.from_major(dec!(100)).open_scaled(0, Some(RoundingRule::Down))?;
/// let parts = calc.splitter()?.set_parts(3).split()?;
/// let amounts: Vec<_> = parts.iter().map(|part| part.amount()).collect();
/// assert_eq!(amounts, [dec!(34), dec!(33), dec!(33)]);
/// assert!(calc.amount().is_zero());
/// # Ok::<(), coinage_shared::MoneyError>(())
/// ```
#[derive(Debug)]
pub struct Allocator<'a> {
    calculation: &'a mut MonetaryAccumulator,
    scale: u32,
    parts: usize,
    proportions: Vec<Option<Decimal>>,
}

impl<'a> Allocator<'a> {
    pub(crate) fn new(calculation: &'a mut MonetaryAccumulator, scale: u32) -> Self {
        Self {
            calculation,
            scale,
            parts: 0,
            proportions: Vec::new(),
        }
    }

    /// The number of parts the amount will be split into.
    #[must_use]
    pub fn parts(&self) -> usize {
        self.parts
    }

    /// Sets the number of parts. Proportions beyond `parts` are ignored.
    ///
    /// The count is only checked when [`split`](Self::split) runs, which
    /// rejects a count it cannot allocate.
    pub fn set_parts(&mut self, parts: usize) -> &mut Self {
        self.parts = parts;
        self
    }

    /// Sets the proportions of the leading parts, growing the number of parts
    /// to cover them.
    ///
    /// # Arguments
    ///
    /// * `proportions` - Weights for parts `0..proportions.len()`. Weights are
    ///   relative; `[1, 1, 2]` and `[25, 25, 50]` split alike.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a negative weight. The allocator is left
    /// unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use coinage_core::currency::{MonetaryType, proportions_from_i64};
    /// use coinage_shared::Locale;
    /// use rust_decimal_macros::dec;
    ///
    /// let usd = MonetaryType::for_locale(Locale::US);
    /// let mut calc = usd.from_major(dec!(10.00)).open_scaled(2, None)?;
    /// let parts = calc
    ///     .splitter()?
    ///     .set_proportions(&proportions_from_i64(&[1, 3]))?
    ///     .split()?;
    /// assert_eq!(parts[0].amount(), dec!(2.50));
    /// assert_eq!(parts[1].amount(), dec!(7.50));
    /// # Ok::<(), coinage_shared::MoneyError>(())
    /// ```
    pub fn set_proportions(&mut self, proportions: &[Decimal]) -> MoneyResult<&mut Self> {
        if let Some(negative) = proportions.iter().find(|p| p.is_sign_negative() && !p.is_zero()) {
            return Err(MoneyError::InvalidArgument(format!(
                "negative proportion {negative}"
            )));
        }
        if let Some(last) = proportions.len().checked_sub(1) {
            self.slot(last)?;
        }
        for (slot, proportion) in self.proportions.iter_mut().zip(proportions) {
            *slot = Some(*proportion);
        }
        self.grow_parts(proportions.len());
        Ok(self)
    }

    /// Sets or clears (`None`) the proportion of one part, growing the number
    /// of parts to include it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a negative proportion or for an index
    /// whose slot cannot be allocated. The allocator is left unchanged.
    pub fn set_proportion(
        &mut self,
        index: usize,
        proportion: Option<Decimal>,
    ) -> MoneyResult<&mut Self> {
        if let Some(p) = proportion
            && p.is_sign_negative()
            && !p.is_zero()
        {
            return Err(MoneyError::InvalidArgument(format!("negative proportion {p}")));
        }
        let parts = index.checked_add(1).ok_or_else(|| {
            MoneyError::InvalidArgument(format!("proportion index {index} is out of range"))
        })?;
        *self.slot(index)? = proportion;
        self.grow_parts(parts);
        Ok(self)
    }

    /// Splits the amount and zeroes the calculation.
    ///
    /// With zero parts nothing is split and the calculation is left as is.
    /// On failure the calculation is also left as is.
    ///
    /// # Returns
    ///
    /// One value per part, each at the calculation's scale and of its type.
    /// The amounts sum exactly to the amount before the split.
    ///
    /// # Errors
    ///
    /// - `AllProportionsZero` if proportions are set but all weigh zero
    /// - `InvalidArgument` if the part count cannot be allocated
    /// - `Overflow` if a share does not fit in a decimal
    pub fn split(&mut self) -> MoneyResult<Vec<MonetaryValue>> {
        if self.parts == 0 {
            return Ok(Vec::new());
        }
        let weighted = self.is_weighted();
        let shares = if weighted {
            self.weighted_shares()?
        } else {
            self.even_shares()?
        };

        let monetary_type = self.calculation.monetary_type().clone();
        let zero = MonetaryValue::new(monetary_type.clone(), Decimal::new(0, self.scale));
        let parts = shares
            .into_iter()
            .map(|share| match share {
                Some(amount) => MonetaryValue::new(monetary_type.clone(), amount),
                None => zero.clone(),
            })
            .collect();

        self.calculation.zero();
        debug!(
            parts = self.parts,
            weighted,
            scale = self.scale,
            "split monetary amount"
        );
        Ok(parts)
    }

    fn even_shares(&self) -> MoneyResult<Vec<Option<Decimal>>> {
        let rounding = self.calculation.rounding();
        let mut shares = self.empty_shares()?;
        let mut remainder = self.calculation.amount();
        for i in (1..self.parts).rev() {
            let share = rounding.divide(remainder, Decimal::from(i + 1), self.scale)?;
            remainder = remainder.checked_sub(share).ok_or(MoneyError::Overflow)?;
            shares[i] = Some(share);
        }
        shares[0] = Some(remainder);
        Ok(shares)
    }

    /// `None` marks a zero-weighted part.
    fn weighted_shares(&self) -> MoneyResult<Vec<Option<Decimal>>> {
        let amount = self.calculation.amount();
        if self.parts == 1 {
            if self.proportion(0).is_zero() {
                return Err(MoneyError::AllProportionsZero);
            }
            return Ok(vec![Some(amount)]);
        }

        let mut denominators = Vec::new();
        denominators
            .try_reserve_exact(self.parts)
            .map_err(|_| self.too_many_parts())?;
        let mut running = Decimal::ZERO;
        for i in 0..self.parts {
            running = running
                .checked_add(self.proportion(i))
                .ok_or(MoneyError::Overflow)?;
            denominators.push(running);
        }
        if running.is_zero() {
            return Err(MoneyError::AllProportionsZero);
        }

        let rounding = self.calculation.rounding();
        let mut shares = self.empty_shares()?;
        let mut remainder = amount;
        for i in (1..self.parts).rev() {
            let proportion = self.proportion(i);
            if proportion.is_zero() {
                continue;
            }
            let share =
                rounding.multiply_divide(remainder, proportion, denominators[i], self.scale)?;
            remainder = remainder.checked_sub(share).ok_or(MoneyError::Overflow)?;
            shares[i] = Some(share);
        }
        shares[0] = Some(remainder);
        Ok(shares)
    }

    fn is_weighted(&self) -> bool {
        self.proportions
            .iter()
            .take(self.parts)
            .any(Option::is_some)
    }

    fn proportion(&self, index: usize) -> Decimal {
        self.proportions
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(Decimal::ZERO)
    }

    fn slot(&mut self, index: usize) -> MoneyResult<&mut Option<Decimal>> {
        if self.proportions.len() <= index {
            let missing = index - self.proportions.len() + 1;
            self.proportions.try_reserve_exact(missing).map_err(|_| {
                MoneyError::InvalidArgument(format!("proportion index {index} is out of range"))
            })?;
            self.proportions.resize(index + 1, None);
        }
        Ok(&mut self.proportions[index])
    }

    fn empty_shares(&self) -> MoneyResult<Vec<Option<Decimal>>> {
        let mut shares = Vec::new();
        shares
            .try_reserve_exact(self.parts)
            .map_err(|_| self.too_many_parts())?;
        shares.resize(self.parts, None);
        Ok(shares)
    }

    fn too_many_parts(&self) -> MoneyError {
        MoneyError::InvalidArgument(format!("cannot split into {} parts", self.parts))
    }

    fn grow_parts(&mut self, parts: usize) {
        self.parts = self.parts.max(parts);
    }
}
