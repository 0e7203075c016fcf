//! Anything a calculation can consume money from.

use rust_decimal::Decimal;

use super::accumulator::MonetaryAccumulator;
use super::monetary_type::MonetaryType;
use super::value::MonetaryValue;

/// A borrowed `{type, amount}` pair fed into calculation operations.
#[derive(Debug, Clone, Copy)]
pub enum MoneySource<'a> {
    /// An immutable value.
    Value(&'a MonetaryValue),
    /// The current state of another calculation.
    Accumulator(&'a MonetaryAccumulator),
    /// A type contributing a zero amount; reconciles types without changing
    /// the total.
    Zero(&'a MonetaryType),
}

impl MoneySource<'_> {
    /// The type to reconcile with.
    #[must_use]
    pub fn monetary_type(&self) -> &MonetaryType {
        match self {
            Self::Value(value) => value.monetary_type(),
            Self::Accumulator(calc) => calc.monetary_type(),
            Self::Zero(monetary_type) => monetary_type,
        }
    }

    /// The amount contributed.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Value(value) => value.amount(),
            Self::Accumulator(calc) => calc.amount(),
            Self::Zero(_) => Decimal::ZERO,
        }
    }
}

impl<'a> From<&'a MonetaryValue> for MoneySource<'a> {
    fn from(value: &'a MonetaryValue) -> Self {
        Self::Value(value)
    }
}

impl<'a> From<&'a MonetaryAccumulator> for MoneySource<'a> {
    fn from(calc: &'a MonetaryAccumulator) -> Self {
        Self::Accumulator(calc)
    }
}

impl<'a> From<&'a MonetaryType> for MoneySource<'a> {
    fn from(monetary_type: &'a MonetaryType) -> Self {
        Self::Zero(monetary_type)
    }
}
