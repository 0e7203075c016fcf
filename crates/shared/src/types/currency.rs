//! ISO 4217 currency identities.
//!
//! A currency only carries identity and presentation facts (code, minor
//! digits, symbol). Amounts live in `coinage_core::currency::MonetaryValue`.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Indonesian Rupiah
    Idr,
    /// Euro
    Eur,
    /// Singapore Dollar
    Sgd,
    /// Japanese Yen
    Jpy,
    /// Pound Sterling
    Gbp,
    /// Canadian Dollar
    Cad,
    /// Swiss Franc
    Chf,
    /// Australian Dollar
    Aud,
}

impl Currency {
    /// Every supported currency, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Usd,
        Self::Idr,
        Self::Eur,
        Self::Sgd,
        Self::Jpy,
        Self::Gbp,
        Self::Cad,
        Self::Chf,
        Self::Aud,
    ];

    /// The three letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Idr => "IDR",
            Self::Eur => "EUR",
            Self::Sgd => "SGD",
            Self::Jpy => "JPY",
            Self::Gbp => "GBP",
            Self::Cad => "CAD",
            Self::Chf => "CHF",
            Self::Aud => "AUD",
        }
    }

    /// Number of digits of the minor unit (cents, sen, ...).
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        match self {
            Self::Jpy => 0,
            _ => 2,
        }
    }

    /// Symbol used when the currency is presented in its home locale.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usd | Self::Cad | Self::Aud => "$",
            Self::Idr => "Rp",
            Self::Eur => "€",
            Self::Sgd => "S$",
            Self::Jpy => "¥",
            Self::Gbp => "£",
            Self::Chf => "CHF",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|currency| currency.code() == upper)
            .ok_or_else(|| format!("Unknown currency: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Idr.to_string(), "IDR");
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!(Currency::Gbp.to_string(), "GBP");
        assert_eq!(Currency::Jpy.to_string(), "JPY");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str(" chf ").unwrap(), Currency::Chf);
        assert_eq!(Currency::from_str("SGD").unwrap(), Currency::Sgd);

        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(Currency::Usd.decimal_places(), 2);
        assert_eq!(Currency::Jpy.decimal_places(), 0);
        assert_eq!(Currency::Idr.decimal_places(), 2);
    }

    #[test]
    fn test_serde_uses_iso_code() {
        assert_eq!(serde_json::to_string(&Currency::Gbp).unwrap(), "\"GBP\"");
        let parsed: Currency = serde_json::from_str("\"EUR\"").unwrap();
        assert_eq!(parsed, Currency::Eur);
    }
}
