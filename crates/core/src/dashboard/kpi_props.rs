//! Property-based tests for the derived KPIs.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::kpi::{DerivedMetricsCalculator, round_half_up};
use super::types::BaseKpis;

/// Non-negative money amounts up to 10 billion.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Arbitrary non-negative KPI inputs with `overdue <= invoices`.
fn base_kpis() -> impl Strategy<Value = BaseKpis> {
    (0i64..10_000, 0i64..10_000, amount(), amount(), amount(), 0i64..5_000).prop_map(
        |(invoices, overdue, outstanding, collected, total, customers)| BaseKpis {
            customer_count: customers,
            invoice_count: invoices,
            outstanding_total: outstanding,
            overdue_count: overdue.min(invoices),
            collected_this_month: collected,
            total_invoice_amount: total,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Percentages stay in 0..=100 and DSO is never negative.
    #[test]
    fn prop_kpis_are_bounded(base in base_kpis(), days in 1i64..3651) {
        let summary = DerivedMetricsCalculator::derive(&base, days);

        prop_assert!(summary.dso >= 0);
        for pct in [summary.cei, summary.on_time_collection_rate, summary.promise_to_pay, summary.sla_compliance] {
            prop_assert!((0..=100).contains(&pct), "out of range: {}", pct);
        }
    }

    /// The base counters pass through untouched.
    #[test]
    fn prop_base_values_pass_through(base in base_kpis(), days in 1i64..3651) {
        let summary = DerivedMetricsCalculator::derive(&base, days);

        prop_assert_eq!(summary.invoice_count, base.invoice_count);
        prop_assert_eq!(summary.outstanding_total, base.outstanding_total);
        prop_assert_eq!(summary.collected_this_month, base.collected_this_month);
    }

    /// On-time rate never exceeds CEI and promise-to-pay never exceeds CEI.
    #[test]
    fn prop_weighted_scores_do_not_exceed_cei(base in base_kpis()) {
        let summary = DerivedMetricsCalculator::derive(&base, 30);

        prop_assert!(summary.on_time_collection_rate <= summary.cei);
        prop_assert!(summary.promise_to_pay <= summary.cei);
    }

    /// Rounding moves a value by at most one half.
    #[test]
    fn prop_round_half_up_is_nearest(cents in -1_000_000i64..1_000_000) {
        let value = Decimal::new(cents, 2);
        let rounded = round_half_up(value);

        prop_assert!(rounded.fract().is_zero());
        prop_assert!((rounded - value).abs() <= Decimal::new(5, 1));
    }
}
