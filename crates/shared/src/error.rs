//! Money error types.

use thiserror::Error;

use crate::types::{Currency, Locale};

/// Result type alias using `MoneyError`.
pub type MoneyResult<T> = Result<T, MoneyError>;

/// Errors raised by monetary arithmetic, reconciliation and allocation.
///
/// All of these are programmer or input errors surfaced directly to the
/// caller; none are retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    // ========== Reconciliation Errors ==========
    /// Two monetary types name different currencies.
    #[error("Incompatible currencies: {left} {right}")]
    IncompatibleCurrency {
        /// Currency of the left-hand type.
        left: Currency,
        /// Currency of the right-hand type.
        right: Currency,
    },

    /// Two monetary types name locales where neither refines the other.
    #[error("Incompatible locales: {left} {right}")]
    IncompatibleLocale {
        /// Locale of the left-hand type.
        left: Locale,
        /// Locale of the right-hand type.
        right: Locale,
    },

    // ========== Argument Errors ==========
    /// A supplied argument is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ========== Allocation Errors ==========
    /// A scale-dependent operation was attempted without a fixed scale.
    #[error("No scale set on calculation")]
    NoScaleSet,

    /// A weighted split was attempted with every proportion zero.
    #[error("All proportions zero")]
    AllProportionsZero,

    // ========== Arithmetic Errors ==========
    /// An unconstrained division does not terminate.
    #[error("Non-terminating decimal expansion; no exact representable decimal result")]
    InexactDivision,

    /// Division by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// A result exceeds the representable decimal range or precision.
    #[error("Decimal overflow")]
    Overflow,

    // ========== Text Errors ==========
    /// Text does not match the type's currency format.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MoneyError {
    /// Returns a stable machine-readable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::IncompatibleCurrency { .. } => "INCOMPATIBLE_CURRENCY",
            Self::IncompatibleLocale { .. } => "INCOMPATIBLE_LOCALE",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NoScaleSet => "NO_SCALE_SET",
            Self::AllProportionsZero => "ALL_PROPORTIONS_ZERO",
            Self::InexactDivision => "INEXACT_DIVISION",
            Self::DivisionByZero => "DIVISION_BY_ZERO",
            Self::Overflow => "OVERFLOW",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Returns true if the error came from type reconciliation.
    #[must_use]
    pub const fn is_incompatible(&self) -> bool {
        matches!(
            self,
            Self::IncompatibleCurrency { .. } | Self::IncompatibleLocale { .. }
        )
    }
}

impl From<config::ConfigError> for MoneyError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            MoneyError::IncompatibleCurrency {
                left: Currency::Usd,
                right: Currency::Gbp,
            }
            .error_code(),
            "INCOMPATIBLE_CURRENCY"
        );
        assert_eq!(MoneyError::NoScaleSet.error_code(), "NO_SCALE_SET");
        assert_eq!(
            MoneyError::AllProportionsZero.error_code(),
            "ALL_PROPORTIONS_ZERO"
        );
        assert_eq!(MoneyError::InexactDivision.error_code(), "INEXACT_DIVISION");
        assert_eq!(MoneyError::Parse(String::new()).error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_error_display() {
        let err = MoneyError::IncompatibleCurrency {
            left: Currency::Usd,
            right: Currency::Gbp,
        };
        assert_eq!(err.to_string(), "Incompatible currencies: USD GBP");

        let err = MoneyError::IncompatibleLocale {
            left: Locale::CANADA_FRENCH,
            right: Locale::UK,
        };
        assert_eq!(err.to_string(), "Incompatible locales: fr_CA en_GB");

        assert_eq!(
            MoneyError::InvalidArgument("negative proportion".into()).to_string(),
            "Invalid argument: negative proportion"
        );
    }

    #[test]
    fn test_is_incompatible() {
        assert!(
            MoneyError::IncompatibleLocale {
                left: Locale::US,
                right: Locale::UK,
            }
            .is_incompatible()
        );
        assert!(!MoneyError::NoScaleSet.is_incompatible());
    }
}
