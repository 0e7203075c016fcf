//! Currency-aware monetary amounts, calculations and exact splitting.
//!
//! A [`MonetaryType`] creates [`MonetaryValue`]s; a value opens a
//! [`MonetaryAccumulator`] for arithmetic; an accumulator with a fixed scale
//! hands its amount to an [`Allocator`] to be split into parts.

pub mod accumulator;
pub mod allocation;
pub mod format;
pub mod monetary_type;
pub mod source;
pub mod value;

#[cfg(test)]
mod props;

pub use accumulator::MonetaryAccumulator;
pub use allocation::{Allocator, proportions_from_f64, proportions_from_i64};
pub use format::{AmountFormat, CurrencyFormat};
pub use monetary_type::MonetaryType;
pub use source::MoneySource;
pub use value::MonetaryValue;
