//! Locale-specific presentation of monetary amounts.

use std::fmt::Debug;

use coinage_shared::{Currency, Locale, MoneyError, MoneyResult};
use rust_decimal::Decimal;

/// Placeholder shown when no currency is known.
const GENERIC_SYMBOL: &str = "¤";

/// Turns amounts into display text and back for one monetary type.
///
/// Implementations are shared between threads through `Arc`. A backend that is
/// not reentrant must serialise its own `format` and `parse` calls.
pub trait AmountFormat: Send + Sync + Debug {
    /// Number of decimal places shown.
    fn places(&self) -> u32;

    /// Renders an amount that has already been rounded to `places()`.
    fn format(&self, amount: Decimal) -> String;

    /// Reads an amount from display text.
    fn parse(&self, text: &str) -> MoneyResult<Decimal>;
}

/// Where the currency symbol sits relative to the digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPlacement {
    /// `$1.00`
    Prefix,
    /// `CHF 1.00`
    PrefixSpaced,
    /// `1,00 €`
    SuffixSpaced,
}

/// The built-in [`AmountFormat`], derived from a locale and currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    symbol: String,
    placement: SymbolPlacement,
    decimal_separator: char,
    grouping_separator: char,
    places: u32,
}

impl CurrencyFormat {
    /// Builds the conventions for a locale/currency pair.
    ///
    /// The currency defaults to the locale's home currency. When the currency
    /// is foreign to the locale its ISO code is shown instead of its symbol.
    #[must_use]
    pub fn new(locale: Option<&Locale>, currency: Option<Currency>) -> Self {
        let home = locale.and_then(Locale::currency);
        let shown = currency.or(home);
        let (mut placement, decimal_separator, grouping_separator) = conventions(locale);

        let symbol = match (shown, locale) {
            (None, _) => GENERIC_SYMBOL.to_string(),
            (Some(currency), Some(_)) if home != Some(currency) => {
                if placement == SymbolPlacement::Prefix {
                    placement = SymbolPlacement::PrefixSpaced;
                }
                currency.code().to_string()
            }
            (Some(currency), _) => currency.symbol().to_string(),
        };

        Self {
            symbol,
            placement,
            decimal_separator,
            grouping_separator,
            places: shown.map_or(2, Currency::decimal_places),
        }
    }

    /// The symbol written next to the digits.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn is_grouping(&self, c: char) -> bool {
        c == self.grouping_separator
            || (self.grouping_separator == ' ' && matches!(c, '\u{a0}' | '\u{202f}'))
    }

    fn group(&self, integer: &str) -> String {
        let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push(self.grouping_separator);
            }
            grouped.push(digit);
        }
        grouped
    }

    fn parse_digits(&self, text: &str) -> MoneyResult<Decimal> {
        let mut normalized = String::with_capacity(text.len());
        let mut seen_decimal = false;
        for c in text.chars() {
            if c.is_ascii_digit() {
                normalized.push(c);
            } else if c == self.decimal_separator && !seen_decimal {
                seen_decimal = true;
                normalized.push('.');
            } else if self.is_grouping(c) && !seen_decimal && !normalized.is_empty() {
                // grouping separators carry no value
            } else {
                return Err(MoneyError::Parse(format!("unexpected character {c:?} in {text:?}")));
            }
        }
        if !normalized.chars().any(|c| c.is_ascii_digit()) {
            return Err(MoneyError::Parse(format!("no digits in {text:?}")));
        }
        normalized
            .parse::<Decimal>()
            .map_err(|err| MoneyError::Parse(err.to_string()))
    }
}

impl AmountFormat for CurrencyFormat {
    fn places(&self) -> u32 {
        self.places
    }

    fn format(&self, amount: Decimal) -> String {
        let negative = amount.is_sign_negative() && !amount.is_zero();
        let plain = amount.abs().to_string();
        let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), ""));

        let mut number = self.group(integer);
        if !fraction.is_empty() {
            number.push(self.decimal_separator);
            number.push_str(fraction);
        }

        let body = match self.placement {
            SymbolPlacement::Prefix => format!("{}{number}", self.symbol),
            SymbolPlacement::PrefixSpaced => format!("{} {number}", self.symbol),
            SymbolPlacement::SuffixSpaced => format!("{number} {}", self.symbol),
        };
        if negative { format!("-{body}") } else { body }
    }

    fn parse(&self, text: &str) -> MoneyResult<Decimal> {
        let trimmed = text.trim();
        let (negative, body) = if let Some(inner) = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            (true, inner.trim())
        } else if let Some(rest) = trimmed.strip_prefix('-') {
            (true, rest.trim_start())
        } else {
            (false, trimmed)
        };

        let digits = match self.placement {
            SymbolPlacement::Prefix | SymbolPlacement::PrefixSpaced => body
                .strip_prefix(self.symbol.as_str())
                .map(str::trim_start),
            SymbolPlacement::SuffixSpaced => {
                body.strip_suffix(self.symbol.as_str()).map(str::trim_end)
            }
        }
        .ok_or_else(|| MoneyError::Parse(format!("{text:?} lacks currency symbol {}", self.symbol)))?;

        let amount = self.parse_digits(digits)?;
        Ok(if negative { -amount } else { amount })
    }
}

/// Symbol placement, decimal separator and grouping separator for a locale.
fn conventions(locale: Option<&Locale>) -> (SymbolPlacement, char, char) {
    let Some(locale) = locale else {
        return (SymbolPlacement::Prefix, '.', ',');
    };
    match (locale.language(), locale.country()) {
        ("de" | "fr" | "it", "CH") => (SymbolPlacement::PrefixSpaced, '.', '\''),
        ("de" | "es" | "it" | "nl" | "pt", _) => (SymbolPlacement::SuffixSpaced, ',', '.'),
        ("fr", _) => (SymbolPlacement::SuffixSpaced, ',', ' '),
        ("id", _) => (SymbolPlacement::Prefix, ',', '.'),
        _ => (SymbolPlacement::Prefix, '.', ','),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(Some(Locale::US), None, dec!(1234.56), "$1,234.56")]
    #[case(Some(Locale::UK), Some(Currency::Gbp), dec!(1.00), "£1.00")]
    #[case(Some(Locale::GERMANY), Some(Currency::Eur), dec!(1.00), "1,00 €")]
    #[case(Some(Locale::GERMANY), None, dec!(1234567.89), "1.234.567,89 €")]
    #[case(Some(Locale::FRANCE), None, dec!(1234.5), "1 234,5 €")]
    #[case(Some(Locale::SWITZERLAND), None, dec!(1234.56), "CHF 1'234.56")]
    #[case(Some(Locale::INDONESIA), None, dec!(1234.56), "Rp1.234,56")]
    #[case(Some(Locale::JAPAN), None, dec!(1235), "¥1,235")]
    #[case(Some(Locale::UK), Some(Currency::Usd), dec!(1.00), "USD 1.00")]
    #[case(None, Some(Currency::Usd), dec!(5.00), "$5.00")]
    #[case(None, None, dec!(5.00), "¤5.00")]
    fn test_format(
        #[case] locale: Option<Locale>,
        #[case] currency: Option<Currency>,
        #[case] amount: Decimal,
        #[case] expected: &str,
    ) {
        let format = CurrencyFormat::new(locale.as_ref(), currency);
        assert_eq!(format.format(amount), expected);
    }

    #[test]
    fn test_format_negative() {
        let format = CurrencyFormat::new(Some(&Locale::US), None);
        assert_eq!(format.format(dec!(-5.00)), "-$5.00");
        assert_eq!(format.format(dec!(-0.00)), "$0.00");
    }

    #[test]
    fn test_places() {
        assert_eq!(CurrencyFormat::new(Some(&Locale::US), None).places(), 2);
        assert_eq!(CurrencyFormat::new(Some(&Locale::JAPAN), None).places(), 0);
        assert_eq!(CurrencyFormat::new(Some(&Locale::JAPAN), Some(Currency::Usd)).places(), 2);
        assert_eq!(CurrencyFormat::new(None, None).places(), 2);
    }

    #[rstest]
    #[case("$1.00", dec!(1))]
    #[case("$1,234.56", dec!(1234.56))]
    #[case("-$5.00", dec!(-5))]
    #[case("($5.00)", dec!(-5))]
    #[case("  $0.00 ", dec!(0))]
    fn test_parse_us(#[case] text: &str, #[case] expected: Decimal) {
        let format = CurrencyFormat::new(Some(&Locale::US), None);
        assert_eq!(format.parse(text).unwrap(), expected);
    }

    #[rstest]
    #[case("1.00")]
    #[case("$")]
    #[case("$1.2.3")]
    #[case("$abc")]
    #[case("1,00 €")]
    fn test_parse_us_rejects(#[case] text: &str) {
        let format = CurrencyFormat::new(Some(&Locale::US), None);
        assert!(matches!(format.parse(text), Err(MoneyError::Parse(_))));
    }

    #[test]
    fn test_parse_continental() {
        let format = CurrencyFormat::new(Some(&Locale::GERMANY), None);
        assert_eq!(format.parse("1.234,56 €").unwrap(), dec!(1234.56));
        let format = CurrencyFormat::new(Some(&Locale::FRANCE), None);
        assert_eq!(format.parse("1\u{a0}234,56 €").unwrap(), dec!(1234.56));
    }
}
