//! Shared vocabulary for Coinage.
//!
//! This crate provides the types every other crate speaks in:
//! - Currency and locale identities
//! - Rounding rules and scale-exact decimal division
//! - Money error types
//! - Calculation defaults configuration

pub mod config;
pub mod error;
pub mod types;

pub use config::MoneyConfig;
pub use error::{MoneyError, MoneyResult};
pub use types::{Currency, Locale, RoundingRule};
