//! Derived collection KPIs.
//!
//! All ratios are computed in `Decimal` and rounded half-up to whole numbers.
//! Percentages are clamped to `0..=100`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::types::{BaseKpis, KpiSummary};

/// On-time collection weighting (0.95).
pub const ON_TIME_FACTOR: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

/// Promise-to-pay weighting applied to CEI (0.92).
pub const PROMISE_TO_PAY_FACTOR: Decimal = Decimal::from_parts(92, 0, 0, false, 2);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds to a whole number with ties going toward positive infinity.
#[must_use]
pub fn round_half_up(value: Decimal) -> Decimal {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    value.round_dp_with_strategy(0, strategy)
}

/// Rounds and clamps a percentage. `None` means the ratio overflowed upward.
fn percent(value: Option<Decimal>) -> i64 {
    value
        .map(round_half_up)
        .and_then(|v| v.to_i64())
        .map_or(100, |v| v.clamp(0, 100))
}

/// Pure calculator turning [`BaseKpis`] into a [`KpiSummary`].
pub struct DerivedMetricsCalculator;

impl DerivedMetricsCalculator {
    /// Denominator for the collection ratios.
    ///
    /// The invoice total when positive, otherwise outstanding plus this
    /// month's collections.
    #[must_use]
    pub fn total_sum(base: &BaseKpis) -> Decimal {
        if base.total_invoice_amount > Decimal::ZERO {
            base.total_invoice_amount
        } else {
            base.outstanding_total
                .checked_add(base.collected_this_month)
                .unwrap_or(Decimal::MAX)
        }
    }

    /// Days sales outstanding.
    #[must_use]
    pub fn dso(base: &BaseKpis, days_in_range: i64) -> i64 {
        let days = Decimal::from(days_in_range.max(1));
        let average_daily_sales = Self::total_sum(base)
            .checked_div(days)
            .unwrap_or(Decimal::ZERO);
        if average_daily_sales.is_zero() {
            return 0;
        }
        base.outstanding_total
            .checked_div(average_daily_sales)
            .map(round_half_up)
            .and_then(|v| v.to_i64())
            .map_or(i64::MAX, |v| v.max(0))
    }

    /// Collection effectiveness index.
    #[must_use]
    pub fn cei(base: &BaseKpis) -> i64 {
        let total = Self::total_sum(base);
        if total.is_zero() {
            return 0;
        }
        percent(
            base.collected_this_month
                .checked_div(total)
                .and_then(|r| r.checked_mul(HUNDRED)),
        )
    }

    /// On-time collection rate.
    #[must_use]
    pub fn on_time_collection_rate(base: &BaseKpis) -> i64 {
        let total = Self::total_sum(base);
        if total.is_zero() {
            return 0;
        }
        percent(
            base.collected_this_month
                .checked_div(total)
                .and_then(|r| r.checked_mul(HUNDRED))
                .and_then(|r| r.checked_mul(ON_TIME_FACTOR)),
        )
    }

    /// Promise-to-pay score derived from CEI.
    #[must_use]
    pub fn promise_to_pay(cei: i64) -> i64 {
        percent(Decimal::from(cei).checked_mul(PROMISE_TO_PAY_FACTOR))
    }

    /// Share of in-range invoices that are not overdue; 100 with no invoices.
    #[must_use]
    pub fn sla_compliance(base: &BaseKpis) -> i64 {
        if base.invoice_count <= 0 {
            return 100;
        }
        let on_time = Decimal::from(base.invoice_count - base.overdue_count.min(base.invoice_count));
        percent(
            on_time
                .checked_div(Decimal::from(base.invoice_count))
                .and_then(|r| r.checked_mul(HUNDRED)),
        )
    }

    /// Full KPI block.
    #[must_use]
    pub fn derive(base: &BaseKpis, days_in_range: i64) -> KpiSummary {
        let cei = Self::cei(base);
        KpiSummary {
            customer_count: base.customer_count,
            invoice_count: base.invoice_count,
            outstanding_total: base.outstanding_total,
            overdue_count: base.overdue_count,
            collected_this_month: base.collected_this_month,
            total_invoice_amount: base.total_invoice_amount,
            dso: Self::dso(base, days_in_range),
            cei,
            on_time_collection_rate: Self::on_time_collection_rate(base),
            promise_to_pay: Self::promise_to_pay(cei),
            sla_compliance: Self::sla_compliance(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn base(total: Decimal, outstanding: Decimal, collected: Decimal) -> BaseKpis {
        BaseKpis {
            customer_count: 3,
            invoice_count: 4,
            outstanding_total: outstanding,
            overdue_count: 1,
            collected_this_month: collected,
            total_invoice_amount: total,
        }
    }

    #[rstest]
    #[case(dec!(2.5), dec!(3))]
    #[case(dec!(2.4), dec!(2))]
    #[case(dec!(-2.5), dec!(-2))]
    #[case(dec!(-2.6), dec!(-3))]
    #[case(dec!(0.5), dec!(1))]
    fn test_round_half_up(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_half_up(input), expected);
    }

    #[test]
    fn test_total_sum_falls_back_when_no_invoice_total() {
        let kpis = base(dec!(0), dec!(300), dec!(200));
        assert_eq!(DerivedMetricsCalculator::total_sum(&kpis), dec!(500));
    }

    #[test]
    fn test_derive_reference_values() {
        // 3000 over 30 days = 100/day; 700 outstanding -> 7 days
        let kpis = base(dec!(3000), dec!(700), dec!(1500));
        let summary = DerivedMetricsCalculator::derive(&kpis, 30);

        assert_eq!(summary.dso, 7);
        assert_eq!(summary.cei, 50);
        // 50 * 0.95 = 47.5
        assert_eq!(summary.on_time_collection_rate, 48);
        // 50 * 0.92 = 46
        assert_eq!(summary.promise_to_pay, 46);
        assert_eq!(summary.sla_compliance, 75);
    }

    #[test]
    fn test_zero_data_scores() {
        let summary = DerivedMetricsCalculator::derive(&BaseKpis::default(), 30);

        assert_eq!(summary.dso, 0);
        assert_eq!(summary.cei, 0);
        assert_eq!(summary.on_time_collection_rate, 0);
        assert_eq!(summary.promise_to_pay, 0);
        assert_eq!(summary.sla_compliance, 100);
    }

    #[test]
    fn test_collections_above_total_clamp_to_100() {
        let kpis = base(dec!(100), dec!(0), dec!(250));
        let summary = DerivedMetricsCalculator::derive(&kpis, 30);

        assert_eq!(summary.cei, 100);
        assert_eq!(summary.on_time_collection_rate, 100);
        assert_eq!(summary.promise_to_pay, 92);
    }

    #[test]
    fn test_oversized_dso_saturates() {
        let kpis = base(dec!(1), Decimal::MAX, dec!(0));
        let summary = DerivedMetricsCalculator::derive(&kpis, 3650);

        assert_eq!(summary.dso, i64::MAX);
    }
}
