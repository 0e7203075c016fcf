//! Language and country identities for presenting money.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::currency::Currency;

/// A `(language, country)` pair.
///
/// `language` is a lower-case ISO 639 code and `country` an upper-case
/// ISO 3166 code. Either may be empty: `Locale::new("", "CA")` names Canada
/// without committing to a language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: Cow<'static, str>,
    country: Cow<'static, str>,
}

impl Locale {
    /// English, United States.
    pub const US: Self = Self::from_static("en", "US");
    /// English, United Kingdom.
    pub const UK: Self = Self::from_static("en", "GB");
    /// German, Germany.
    pub const GERMANY: Self = Self::from_static("de", "DE");
    /// French, France.
    pub const FRANCE: Self = Self::from_static("fr", "FR");
    /// Italian, Italy.
    pub const ITALY: Self = Self::from_static("it", "IT");
    /// Japanese, Japan.
    pub const JAPAN: Self = Self::from_static("ja", "JP");
    /// English, Canada.
    pub const CANADA: Self = Self::from_static("en", "CA");
    /// French, Canada.
    pub const CANADA_FRENCH: Self = Self::from_static("fr", "CA");
    /// Indonesian, Indonesia.
    pub const INDONESIA: Self = Self::from_static("id", "ID");
    /// English, Singapore.
    pub const SINGAPORE: Self = Self::from_static("en", "SG");
    /// German, Switzerland.
    pub const SWITZERLAND: Self = Self::from_static("de", "CH");
    /// English, Australia.
    pub const AUSTRALIA: Self = Self::from_static("en", "AU");

    const fn from_static(language: &'static str, country: &'static str) -> Self {
        Self {
            language: Cow::Borrowed(language),
            country: Cow::Borrowed(country),
        }
    }

    /// Creates a locale, normalising the case of both codes.
    #[must_use]
    pub fn new(language: &str, country: &str) -> Self {
        Self {
            language: Cow::Owned(language.trim().to_lowercase()),
            country: Cow::Owned(country.trim().to_uppercase()),
        }
    }

    /// The language code, possibly empty.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The country code, possibly empty.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// The home currency of the locale's country, if one is known.
    #[must_use]
    pub fn currency(&self) -> Option<Currency> {
        match self.country() {
            "US" => Some(Currency::Usd),
            "ID" => Some(Currency::Idr),
            "DE" | "FR" | "IT" | "ES" | "NL" | "IE" | "AT" | "BE" | "FI" | "PT" => {
                Some(Currency::Eur)
            }
            "SG" => Some(Currency::Sgd),
            "JP" => Some(Currency::Jpy),
            "GB" => Some(Currency::Gbp),
            "CA" => Some(Currency::Cad),
            "CH" => Some(Currency::Chf),
            "AU" => Some(Currency::Aud),
            _ => None,
        }
    }

    /// `"<country>_<language>"`, the string used to decide whether one locale
    /// refines another during type reconciliation.
    #[must_use]
    pub fn reconciliation_key(&self) -> String {
        format!("{}_{}", self.country, self.language)
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.country.is_empty() {
            f.write_str(&self.language)
        } else {
            write!(f, "{}_{}", self.language, self.country)
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(['_', '-']);
        let language = parts.next().unwrap_or_default();
        let country = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(format!("Unsupported locale variant: {s}"));
        }
        let valid = |code: &str, len: usize| {
            code.is_empty() || (code.len() == len && code.chars().all(|c| c.is_ascii_alphabetic()))
        };
        if (language.is_empty() && country.is_empty())
            || !(valid(language, 2) || valid(language, 3))
            || !valid(country, 2)
        {
            return Err(format!("Invalid locale: {s}"));
        }
        Ok(Self::new(language, country))
    }
}

impl TryFrom<String> for Locale {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en_US", Locale::US)]
    #[case("en-us", Locale::US)]
    #[case("fr_CA", Locale::CANADA_FRENCH)]
    #[case("_CA", Locale::new("", "CA"))]
    #[case("en", Locale::new("en", ""))]
    fn test_locale_from_str(#[case] input: &str, #[case] expected: Locale) {
        assert_eq!(input.parse::<Locale>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("_")]
    #[case("english_US")]
    #[case("en_US_POSIX")]
    #[case("e1_US")]
    fn test_locale_from_str_rejects(#[case] input: &str) {
        assert!(input.parse::<Locale>().is_err());
    }

    #[test]
    fn test_locale_display() {
        assert_eq!(Locale::US.to_string(), "en_US");
        assert_eq!(Locale::new("", "CA").to_string(), "_CA");
        assert_eq!(Locale::new("fr", "").to_string(), "fr");
    }

    #[test]
    fn test_owned_equals_static() {
        assert_eq!(Locale::new("EN", "us"), Locale::US);
    }

    #[test]
    fn test_home_currency() {
        assert_eq!(Locale::US.currency(), Some(Currency::Usd));
        assert_eq!(Locale::GERMANY.currency(), Some(Currency::Eur));
        assert_eq!(Locale::new("", "CA").currency(), Some(Currency::Cad));
        assert_eq!(Locale::new("en", "").currency(), None);
    }

    #[test]
    fn test_reconciliation_key() {
        assert_eq!(Locale::CANADA_FRENCH.reconciliation_key(), "CA_fr");
        assert_eq!(Locale::new("", "CA").reconciliation_key(), "CA_");
    }

    #[test]
    fn test_serde_as_string() {
        assert_eq!(serde_json::to_string(&Locale::UK).unwrap(), "\"en_GB\"");
        let parsed: Locale = serde_json::from_str("\"de_DE\"").unwrap();
        assert_eq!(parsed, Locale::GERMANY);
        assert!(serde_json::from_str::<Locale>("\"nope_nope\"").is_err());
    }
}
