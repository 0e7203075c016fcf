//! Calculation defaults configuration.

use serde::Deserialize;

use crate::error::{MoneyError, MoneyResult};
use crate::types::{Currency, Locale, MAX_SCALE, RoundingRule};

/// Defaults applied when opening monetary types and calculations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MoneyConfig {
    /// Locale for types built from configuration, e.g. `en_US`.
    #[serde(default)]
    pub default_locale: Option<String>,
    /// Currency for types built from configuration. Falls back to the
    /// locale's home currency when absent.
    #[serde(default)]
    pub default_currency: Option<Currency>,
    /// Fixed calculation scale; negative or absent means unconstrained.
    #[serde(default)]
    pub scale: Option<i32>,
    /// Rounding rule applied whenever a fixed scale is in force.
    #[serde(default)]
    pub rounding: RoundingRule,
}

impl MoneyConfig {
    /// Loads configuration from an optional `config/money` file and
    /// `COINAGE__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> MoneyResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/money").required(false))
            .add_source(config::Environment::with_prefix("COINAGE").separator("__"))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Checks that every configured value is usable.
    pub fn validate(&self) -> MoneyResult<()> {
        self.locale()?;
        self.fixed_scale()?;
        Ok(())
    }

    /// The configured locale, parsed.
    pub fn locale(&self) -> MoneyResult<Option<Locale>> {
        self.default_locale
            .as_deref()
            .map(str::parse::<Locale>)
            .transpose()
            .map_err(MoneyError::Config)
    }

    /// The configured scale, with negative values normalised to `None`.
    pub fn fixed_scale(&self) -> MoneyResult<Option<u32>> {
        match self.scale {
            None => Ok(None),
            Some(scale) => match u32::try_from(scale) {
                Err(_) => Ok(None),
                Ok(scale) if scale > MAX_SCALE => Err(MoneyError::Config(format!(
                    "scale {scale} exceeds maximum of {MAX_SCALE}"
                ))),
                Ok(scale) => Ok(Some(scale)),
            },
        }
    }
}
