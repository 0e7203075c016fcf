//! Immutable monetary amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` tagged with a [`MonetaryType`].

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use coinage_shared::{Currency, Locale, MoneyConfig, MoneyError, MoneyResult, RoundingRule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::accumulator::MonetaryAccumulator;
use super::monetary_type::MonetaryType;

/// A monetary amount of a given [`MonetaryType`].
///
/// The amount is kept at whatever precision it was created with; it is only
/// rounded to the type's places for presentation. Values are immutable and
/// safe to share between threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ValueRecord", into = "ValueRecord")]
pub struct MonetaryValue {
    monetary_type: MonetaryType,
    amount: Decimal,
    rounded: OnceLock<Decimal>,
}

#[derive(Serialize, Deserialize)]
struct ValueRecord {
    currency: Option<Currency>,
    locale: Option<Locale>,
    amount: Decimal,
}

impl MonetaryValue {
    pub(crate) fn new(monetary_type: MonetaryType, amount: Decimal) -> Self {
        Self {
            monetary_type,
            amount,
            rounded: OnceLock::new(),
        }
    }

    /// The type of this value.
    #[must_use]
    pub fn monetary_type(&self) -> &MonetaryType {
        &self.monetary_type
    }

    /// The amount at full precision.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The amount rounded half-up to the type's places. Computed once.
    pub fn rounded_amount(&self) -> Decimal {
        *self
            .rounded
            .get_or_init(|| round_for_display(self.amount, self.monetary_type.places(), RoundingRule::default()))
    }

    /// The amount rounded to the type's places with a specific rule.
    pub fn rounded_amount_with(&self, rule: RoundingRule) -> Decimal {
        if rule == RoundingRule::default() {
            return self.rounded_amount();
        }
        round_for_display(self.amount, self.monetary_type.places(), rule)
    }

    /// True iff the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// -1, 0 or 1 according to the sign of the amount.
    #[must_use]
    pub fn sign(&self) -> i32 {
        if self.amount.is_zero() {
            0
        } else if self.amount.is_sign_negative() {
            -1
        } else {
            1
        }
    }

    /// Compares amounts numerically.
    ///
    /// Fails when both sides name different currencies. Locales are ignored.
    pub fn compare(&self, other: &Self) -> MoneyResult<Ordering> {
        if let (Some(left), Some(right)) =
            (self.monetary_type.currency(), other.monetary_type.currency())
            && left != right
        {
            return Err(MoneyError::IncompatibleCurrency { left, right });
        }
        Ok(self.amount.cmp(&other.amount))
    }

    /// Opens an unconstrained calculation starting from this value.
    #[must_use]
    pub fn open(&self) -> MonetaryAccumulator {
        MonetaryAccumulator::unconstrained(self.monetary_type.clone(), self.amount)
    }

    /// Opens a calculation starting from this value, held to `scale` places.
    /// A negative scale means unconstrained; `None` rounding means half-up.
    pub fn open_scaled(
        &self,
        scale: i32,
        rounding: Option<RoundingRule>,
    ) -> MoneyResult<MonetaryAccumulator> {
        MonetaryAccumulator::new(
            self.monetary_type.clone(),
            self.amount,
            MonetaryAccumulator::normalize_scale(scale)?,
            rounding.unwrap_or_default(),
        )
    }

    /// Opens a calculation using the configured scale and rounding.
    pub fn open_configured(&self, config: &MoneyConfig) -> MoneyResult<MonetaryAccumulator> {
        MonetaryAccumulator::new(
            self.monetary_type.clone(),
            self.amount,
            config.fixed_scale()?,
            config.rounding,
        )
    }
}

fn round_for_display(amount: Decimal, places: u32, rule: RoundingRule) -> Decimal {
    rule.rescale(amount, places)
        .unwrap_or_else(|_| amount.round_dp_with_strategy(places, rule.strategy()))
}

impl PartialEq for MonetaryValue {
    fn eq(&self, other: &Self) -> bool {
        self.monetary_type == other.monetary_type && self.amount == other.amount
    }
}

impl Eq for MonetaryValue {}

impl Hash for MonetaryValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.monetary_type.hash(state);
        self.amount.normalize().hash(state);
    }
}

impl std::fmt::Display for MonetaryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.monetary_type.format(self.rounded_amount()))
    }
}

impl From<ValueRecord> for MonetaryValue {
    fn from(record: ValueRecord) -> Self {
        Self::new(MonetaryType::new(record.locale, record.currency), record.amount)
    }
}

impl From<MonetaryValue> for ValueRecord {
    fn from(value: MonetaryValue) -> Self {
        Self {
            currency: value.monetary_type.currency(),
            locale: value.monetary_type.locale().cloned(),
            amount: value.amount,
        }
    }
}
