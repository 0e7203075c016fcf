//! Property-based tests for monetary arithmetic.
//!
//! - Split Sum Invariant
//! - Scale Discipline
//! - Type Reconciliation Laws

use proptest::prelude::*;
use rust_decimal::Decimal;

use coinage_shared::{Currency, Locale, RoundingRule};

use super::allocation::proportions_from_i64;
use super::monetary_type::MonetaryType;

/// Strategy to generate signed amounts in minor units (-1,000,000.00 to 1,000,000.00).
fn minor_amount() -> impl Strategy<Value = i64> {
    -100_000_000i64..100_000_000i64
}

/// Strategy to generate amounts with up to 6 fractional digits.
fn precise_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000_000i64..1_000_000_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

/// Strategy to generate part counts (1 to 50).
fn part_count() -> impl Strategy<Value = usize> {
    1usize..50
}

/// Strategy to generate fixed scales (0 to 4).
fn fixed_scale() -> impl Strategy<Value = i32> {
    0i32..=4
}

fn rounding_rule() -> impl Strategy<Value = RoundingRule> {
    prop_oneof![
        Just(RoundingRule::Up),
        Just(RoundingRule::Down),
        Just(RoundingRule::Ceiling),
        Just(RoundingRule::Floor),
        Just(RoundingRule::HalfUp),
        Just(RoundingRule::HalfDown),
        Just(RoundingRule::HalfEven),
    ]
}

/// Strategy to generate weights with at least one non-zero entry.
fn weights() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..1000, 1..20)
        .prop_filter("at least one non-zero weight", |w| w.iter().any(|&v| v != 0))
}

fn monetary_type() -> impl Strategy<Value = MonetaryType> {
    let locales = prop_oneof![
        Just(None),
        Just(Some(Locale::US)),
        Just(Some(Locale::UK)),
        Just(Some(Locale::CANADA)),
        Just(Some(Locale::CANADA_FRENCH)),
        Just(Some(Locale::new("", "CA"))),
    ];
    let currencies = prop_oneof![
        Just(None),
        Just(Some(Currency::Usd)),
        Just(Some(Currency::Gbp)),
        Just(Some(Currency::Cad)),
    ];
    (locales, currencies).prop_map(|(locale, currency)| MonetaryType::new(locale, currency))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Split Sum Invariant
    // =========================================================================

    /// *For any* amount, scale, rounding and part count, the even split SHALL
    /// return exactly `parts` values summing to the original amount.
    #[test]
    fn prop_even_split_sum_invariant(
        minor in minor_amount(),
        parts in part_count(),
        scale in fixed_scale(),
        rounding in rounding_rule(),
    ) {
        let usd = MonetaryType::for_locale(Locale::US);
        let mut calc = usd.from_minor(minor).open_scaled(scale, Some(rounding)).unwrap();
        let original = calc.amount();

        let split = calc.splitter().unwrap().set_parts(parts).split().unwrap();
        prop_assert_eq!(split.len(), parts);

        let sum: Decimal = split.iter().map(|part| part.amount()).sum();
        prop_assert_eq!(sum, original, "parts {:?}", split);
        prop_assert!(calc.amount().is_zero());
    }

    /// *For any* non-degenerate weights, the weighted split SHALL sum to the
    /// original amount and give zero-weighted parts above index 0 nothing.
    #[test]
    fn prop_weighted_split_sum_invariant(
        minor in minor_amount(),
        weights in weights(),
        scale in fixed_scale(),
        rounding in rounding_rule(),
    ) {
        let usd = MonetaryType::for_locale(Locale::US);
        let mut calc = usd.from_minor(minor).open_scaled(scale, Some(rounding)).unwrap();
        let original = calc.amount();

        let split = calc
            .splitter()
            .unwrap()
            .set_proportions(&proportions_from_i64(&weights))
            .unwrap()
            .split()
            .unwrap();
        prop_assert_eq!(split.len(), weights.len());

        let sum: Decimal = split.iter().map(|part| part.amount()).sum();
        prop_assert_eq!(sum, original);
        for (i, (part, weight)) in split.iter().zip(&weights).enumerate().skip(1) {
            if *weight == 0 {
                prop_assert!(part.is_zero(), "part {} has weight 0 but got {}", i, part.amount());
            }
        }
    }

    /// *For any* split, every part SHALL carry exactly the calculation's scale.
    #[test]
    fn prop_split_parts_carry_scale(
        amount in precise_amount(),
        parts in part_count(),
        scale in fixed_scale(),
    ) {
        let usd = MonetaryType::for_locale(Locale::US);
        let mut calc = usd.from_major(amount).open_scaled(scale, None).unwrap();
        let split = calc.splitter().unwrap().set_parts(parts).split().unwrap();
        let expected = u32::try_from(scale).unwrap();
        for part in &split {
            prop_assert_eq!(part.amount().scale(), expected);
        }
    }

    // =========================================================================
    // Scale Discipline
    // =========================================================================

    /// *For any* chain of operations on a scaled calculation, the amount SHALL
    /// keep exactly the fixed scale after each step.
    #[test]
    fn prop_scale_held_across_operations(
        start in precise_amount(),
        operand in precise_amount(),
        divisor in 1i64..1000,
        factor in -1000i64..1000,
        scale in fixed_scale(),
        rounding in rounding_rule(),
    ) {
        let usd = MonetaryType::for_locale(Locale::US);
        let expected = u32::try_from(scale).unwrap();
        let value = usd.from_major(operand);
        let mut calc = usd.from_major(start).open_scaled(scale, Some(rounding)).unwrap();
        prop_assert_eq!(calc.amount().scale(), expected);

        calc.add(&value).unwrap();
        prop_assert_eq!(calc.amount().scale(), expected);
        calc.subtract(&value).unwrap();
        prop_assert_eq!(calc.amount().scale(), expected);
        calc.divide(Decimal::from(divisor)).unwrap();
        prop_assert_eq!(calc.amount().scale(), expected);
        calc.multiply(Decimal::from(factor)).unwrap();
        prop_assert_eq!(calc.amount().scale(), expected);
        calc.max(&value).unwrap().min(&value).unwrap();
        prop_assert_eq!(calc.amount().scale(), expected);
        calc.negate().abs();
        prop_assert_eq!(calc.amount().scale(), expected);
    }

    /// *For any* scaled division, the quotient SHALL be the exact quotient
    /// rounded once, so it lies within one unit in the last place.
    #[test]
    fn prop_scaled_divide_within_one_ulp(
        minor in minor_amount(),
        divisor in 1i64..10_000,
        scale in fixed_scale(),
        rounding in rounding_rule(),
    ) {
        let usd = MonetaryType::for_locale(Locale::US);
        let amount = usd.from_minor(minor).amount();
        let mut calc = usd.from_minor(minor).open_scaled(scale, Some(rounding)).unwrap();
        let start = calc.amount();
        calc.divide(Decimal::from(divisor)).unwrap();

        let ulp = Decimal::new(1, u32::try_from(scale).unwrap());
        let back = calc.amount() * Decimal::from(divisor);
        let error = (back - start).abs();
        prop_assert!(error < ulp * Decimal::from(divisor), "{} / {} -> {}", amount, divisor, calc.amount());
    }

    // =========================================================================
    // Type Reconciliation Laws
    // =========================================================================

    /// *For any* two types, `combine` SHALL succeed or fail symmetrically and
    /// agree in value when it succeeds.
    #[test]
    fn prop_combine_is_commutative(a in monetary_type(), b in monetary_type()) {
        prop_assert_eq!(a.combine(&b).ok(), b.combine(&a).ok());
    }

    /// *For any* type, combining with itself or with the unspecified type
    /// SHALL return the same instance.
    #[test]
    fn prop_combine_identity(a in monetary_type()) {
        prop_assert!(a.combine(&a).unwrap().same_instance(&a));
        prop_assert!(a.combine(&MonetaryType::unspecified()).unwrap().same_instance(&a));
    }

    /// *For any* three types whose pairwise merges succeed, grouping SHALL not
    /// change the merged type.
    #[test]
    fn prop_combine_is_associative(
        a in monetary_type(),
        b in monetary_type(),
        c in monetary_type(),
    ) {
        let left = a.combine(&b).and_then(|ab| ab.combine(&c));
        let right = b.combine(&c).and_then(|bc| a.combine(&bc));
        if let (Ok(left), Ok(right)) = (left, right) {
            prop_assert_eq!(left, right);
        }
    }

    /// *For any* failing add, the calculation SHALL be left untouched.
    #[test]
    fn prop_failed_add_is_atomic(
        minor in minor_amount(),
        a in monetary_type(),
        b in monetary_type(),
    ) {
        let usd = MonetaryType::for_locale(Locale::US);
        let mut calc = usd.from_minor(minor).open();
        let before = calc.clone();
        let values = [a.from_minor(1), b.from_minor(2)];
        if calc.add_all(&values).is_err() {
            prop_assert_eq!(calc, before);
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Specific example: 1.00 in 3 parts at 2 places sums to 1.00.
    #[test]
    fn test_split_dollar_in_three() {
        let usd = MonetaryType::for_locale(Locale::US);
        let mut calc = usd.from_major(dec!(1)).open_scaled(2, None).unwrap();
        let split = calc.splitter().unwrap().set_parts(3).split().unwrap();
        let sum: Decimal = split.iter().map(|part| part.amount()).sum();
        assert_eq!(sum, dec!(1.00));
    }

    /// Specific example: a single cent in 3 parts leaves two parts empty.
    #[test]
    fn test_split_penny_in_three() {
        let usd = MonetaryType::for_locale(Locale::US);
        let mut calc = usd.from_minor(1).open_scaled(2, None).unwrap();
        let split = calc.splitter().unwrap().set_parts(3).split().unwrap();
        let amounts: Vec<Decimal> = split.iter().map(|part| part.amount()).collect();
        assert_eq!(amounts.iter().copied().sum::<Decimal>(), dec!(0.01));
        assert_eq!(amounts.iter().filter(|a| a.is_zero()).count(), 2);
    }
}
