//! Monetary types: a currency and a locale, and how they reconcile.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use coinage_shared::types::MAX_SCALE;
use coinage_shared::{Currency, Locale, MoneyConfig, MoneyError, MoneyResult, RoundingRule};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::accumulator::MonetaryAccumulator;
use super::format::{AmountFormat, CurrencyFormat};
use super::value::MonetaryValue;

/// Combines an optional currency with an optional locale for recording and
/// presenting monetary amounts.
///
/// Instances are immutable and cheap to clone; clones share one descriptor.
/// Equality considers only the currency and the locale.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "TypeRecord", into = "TypeRecord")]
pub struct MonetaryType {
    inner: Arc<TypeInner>,
}

#[derive(Debug)]
struct TypeInner {
    currency: Option<Currency>,
    locale: Option<Locale>,
    places: u32,
    format: Arc<dyn AmountFormat>,
}

#[derive(Serialize, Deserialize)]
struct TypeRecord {
    currency: Option<Currency>,
    locale: Option<Locale>,
}

impl MonetaryType {
    /// A type with neither a currency nor a locale.
    #[must_use]
    pub fn unspecified() -> Self {
        Self::new(None, None)
    }

    /// A type for a locale; the currency is the locale's home currency.
    #[must_use]
    pub fn for_locale(locale: Locale) -> Self {
        let currency = locale.currency();
        Self::new(Some(locale), currency)
    }

    /// A type for a currency with no particular locale.
    #[must_use]
    pub fn for_currency(currency: Currency) -> Self {
        Self::new(None, Some(currency))
    }

    /// A type for an explicit locale/currency pair, presented with the
    /// built-in [`CurrencyFormat`].
    #[must_use]
    pub fn new(locale: Option<Locale>, currency: Option<Currency>) -> Self {
        let format = CurrencyFormat::new(locale.as_ref(), currency);
        Self {
            inner: Arc::new(TypeInner {
                currency,
                locale,
                places: format.places(),
                format: Arc::new(format),
            }),
        }
    }

    /// A type presented by a caller-supplied formatter.
    pub fn with_format(
        locale: Option<Locale>,
        currency: Option<Currency>,
        format: Arc<dyn AmountFormat>,
    ) -> MoneyResult<Self> {
        let places = format.places();
        if places > MAX_SCALE {
            return Err(MoneyError::InvalidArgument(format!(
                "formatter places {places} exceed maximum of {MAX_SCALE}"
            )));
        }
        Ok(Self {
            inner: Arc::new(TypeInner {
                currency,
                locale,
                places,
                format,
            }),
        })
    }

    /// A type built from the configured default locale and currency.
    pub fn from_config(config: &MoneyConfig) -> MoneyResult<Self> {
        let locale = config.locale()?;
        let currency = config
            .default_currency
            .or_else(|| locale.as_ref().and_then(Locale::currency));
        Ok(Self::new(locale, currency))
    }

    /// The currency, if specified.
    #[must_use]
    pub fn currency(&self) -> Option<Currency> {
        self.inner.currency
    }

    /// The locale, if specified.
    #[must_use]
    pub fn locale(&self) -> Option<&Locale> {
        self.inner.locale.as_ref()
    }

    /// Number of decimal places in this type's presentation.
    #[must_use]
    pub fn places(&self) -> u32 {
        self.inner.places
    }

    /// True if both handles share one descriptor.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------------

    /// A zero amount of this type.
    #[must_use]
    pub fn zero(&self) -> MonetaryValue {
        MonetaryValue::new(self.clone(), Decimal::ZERO)
    }

    /// Converts a small denomination (e.g. cents) into an amount by shifting
    /// the decimal point left by [`places`](Self::places).
    #[must_use]
    pub fn from_minor(&self, small_denomination: i64) -> MonetaryValue {
        MonetaryValue::new(self.clone(), Decimal::new(small_denomination, self.places()))
    }

    /// Wide variant of [`from_minor`](Self::from_minor).
    pub fn from_minor_i128(&self, small_denomination: i128) -> MoneyResult<MonetaryValue> {
        let amount = Decimal::try_from_i128_with_scale(small_denomination, self.places())
            .map_err(|_| MoneyError::Overflow)?;
        Ok(MonetaryValue::new(self.clone(), amount))
    }

    /// Converts a large denomination (e.g. dollars) given as a float. The
    /// float's shortest decimal rendering is taken literally.
    pub fn from_major_f64(&self, large_denomination: f64) -> MoneyResult<MonetaryValue> {
        let amount = Decimal::from_f64(large_denomination).ok_or_else(|| {
            MoneyError::InvalidArgument(format!("{large_denomination} is not a finite amount"))
        })?;
        Ok(MonetaryValue::new(self.clone(), amount))
    }

    /// Converts a large denomination (e.g. dollars) taken literally.
    #[must_use]
    pub fn from_major(&self, large_denomination: Decimal) -> MonetaryValue {
        MonetaryValue::new(self.clone(), large_denomination)
    }

    /// Parses display text in this type's currency format.
    pub fn parse(&self, text: &str) -> MoneyResult<MonetaryValue> {
        let amount = self.inner.format.parse(text)?;
        Ok(MonetaryValue::new(self.clone(), amount))
    }

    pub(crate) fn format(&self, rounded: Decimal) -> String {
        self.inner.format.format(rounded)
    }

    // ------------------------------------------------------------------------
    // Calculations
    // ------------------------------------------------------------------------

    /// Opens an unconstrained calculation starting at zero.
    #[must_use]
    pub fn open(&self) -> MonetaryAccumulator {
        MonetaryAccumulator::unconstrained(self.clone(), Decimal::ZERO)
    }

    /// Opens a calculation starting at zero and held to `scale` places.
    /// A negative scale means unconstrained; `None` rounding means half-up.
    pub fn open_scaled(
        &self,
        scale: i32,
        rounding: Option<RoundingRule>,
    ) -> MoneyResult<MonetaryAccumulator> {
        MonetaryAccumulator::new(
            self.clone(),
            Decimal::ZERO,
            MonetaryAccumulator::normalize_scale(scale)?,
            rounding.unwrap_or_default(),
        )
    }

    // ------------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------------

    /// Merges two types into one consistent type.
    ///
    /// Currencies must agree when both are given. Locales must agree, or one
    /// must refine the other: a locale whose `"<country>_<language>"` key
    /// extends the other's key wins. Whenever the merge equals one of the
    /// inputs, that input is returned.
    pub fn combine(&self, other: &Self) -> MoneyResult<Self> {
        if self.same_instance(other) {
            return Ok(self.clone());
        }

        let currency = match (self.currency(), other.currency()) {
            (Some(left), Some(right)) if left != right => {
                debug!(%left, %right, "rejected monetary types with different currencies");
                return Err(MoneyError::IncompatibleCurrency { left, right });
            }
            (left, right) => left.or(right),
        };

        let locale = match (self.locale(), other.locale()) {
            (Some(left), Some(right)) if left != right => {
                let left_key = left.reconciliation_key();
                let right_key = right.reconciliation_key();
                if left_key.starts_with(&right_key) {
                    Some(left)
                } else if right_key.starts_with(&left_key) {
                    Some(right)
                } else {
                    debug!(%left, %right, "rejected monetary types with unrelated locales");
                    return Err(MoneyError::IncompatibleLocale {
                        left: left.clone(),
                        right: right.clone(),
                    });
                }
            }
            (left, right) => left.or(right),
        };

        if currency == self.currency() && locale == self.locale() {
            return Ok(self.clone());
        }
        if currency == other.currency() && locale == other.locale() {
            return Ok(other.clone());
        }
        trace!(?currency, ?locale, "reconciled into a new monetary type");
        Ok(Self::new(locale.cloned(), currency))
    }
}

impl Default for MonetaryType {
    fn default() -> Self {
        Self::unspecified()
    }
}

impl PartialEq for MonetaryType {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
            || (self.currency() == other.currency() && self.locale() == other.locale())
    }
}

impl Eq for MonetaryType {}

impl Hash for MonetaryType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.currency().hash(state);
        self.locale().hash(state);
    }
}

impl std::fmt::Debug for MonetaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonetaryType")
            .field("currency", &self.inner.currency)
            .field("locale", &self.inner.locale)
            .field("places", &self.inner.places)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for MonetaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.currency() {
            Some(currency) => write!(f, "{currency}")?,
            None => f.write_str("-")?,
        }
        match self.locale() {
            Some(locale) => write!(f, "/{locale}"),
            None => f.write_str("/-"),
        }
    }
}

impl From<TypeRecord> for MonetaryType {
    fn from(record: TypeRecord) -> Self {
        Self::new(record.locale, record.currency)
    }
}

impl From<MonetaryType> for TypeRecord {
    fn from(monetary_type: MonetaryType) -> Self {
        Self {
            currency: monetary_type.currency(),
            locale: monetary_type.locale().cloned(),
        }
    }
}
