//! Property-based tests for aging bucket classification.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::aging::{AgingBucketCalculator, AgingLabel};

/// Evaluation instants spread across a few years, any time of day.
fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..(3 * 365 * 86_400)).prop_map(|secs| {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    })
}

/// Non-negative outstanding balances, zero included.
fn outstanding_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every past-or-present due date falls into exactly one bucket.
    #[test]
    fn prop_exactly_one_bucket(now in instant_strategy(), days in 0i64..2000) {
        let calc = AgingBucketCalculator::new(now);
        let due: NaiveDate = (now - Duration::days(days)).date_naive();

        let hits = calc.windows().iter().filter(|w| w.contains(due)).count();
        prop_assert_eq!(hits, 1);
    }

    /// Future due dates belong to no bucket.
    #[test]
    fn prop_future_is_unbucketed(now in instant_strategy(), days in 1i64..400) {
        let calc = AgingBucketCalculator::new(now);
        let due = now.date_naive() + Duration::days(days);

        prop_assert_eq!(calc.classify(due), None);
    }

    /// Bucket counts and amounts add up to the positive, non-future rows.
    #[test]
    fn prop_partition_conserves_totals(
        now in instant_strategy(),
        rows in prop::collection::vec((0i64..500, outstanding_strategy()), 0..40),
    ) {
        let calc = AgingBucketCalculator::new(now);
        let rows: Vec<_> = rows
            .into_iter()
            .map(|(days, amt)| ((now - Duration::days(days)).date_naive(), amt))
            .collect();

        let buckets = calc.partition(rows.iter().copied());
        let expected_count = rows.iter().filter(|(_, a)| *a > Decimal::ZERO).count();
        let expected_amount: Decimal = rows.iter().map(|(_, a)| *a).sum();

        prop_assert_eq!(buckets.len(), 4);
        prop_assert_eq!(buckets.iter().map(|b| b.count).sum::<i64>(), i64::try_from(expected_count).unwrap());
        prop_assert_eq!(buckets.iter().map(|b| b.amount).sum::<Decimal>(), expected_amount);
        prop_assert!(buckets.iter().all(|b| b.amount >= Decimal::ZERO));
    }

    /// Older due dates never land in a younger bucket.
    #[test]
    fn prop_classification_is_monotonic(now in instant_strategy(), a in 0i64..500, b in 0i64..500) {
        let calc = AgingBucketCalculator::new(now);
        let (younger, older) = if a <= b { (a, b) } else { (b, a) };
        let young: AgingLabel = calc.classify((now - Duration::days(younger)).date_naive()).unwrap();
        let old: AgingLabel = calc.classify((now - Duration::days(older)).date_naive()).unwrap();

        prop_assert!(young <= old);
    }
}
