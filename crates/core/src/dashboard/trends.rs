//! Rolling monthly and two-month series.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use super::kpi::round_half_up;
use super::types::{CashInflowPoint, QuarterPoint, TrendPoint};
use crate::tenant::DateRange;

/// Number of months in the rolling series.
pub const TREND_MONTHS: u32 = 12;

/// Months folded into one rollup bucket.
pub const MONTHS_PER_QUARTER: usize = 2;

/// Target uplift applied to each rollup bucket (1.1).
pub const QUARTER_TARGET_FACTOR: Decimal = Decimal::from_parts(11, 0, 0, false, 1);

/// Share of due invoice totals expected to be collected (0.8).
pub const CASH_ESTIMATE_FACTOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// One calendar month `[start, end_exclusive)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    /// Display label, e.g. `"Oct 2026"`.
    pub label: String,
    /// First day of the month.
    pub start: NaiveDate,
    /// First day of the following month.
    pub end_exclusive: NaiveDate,
}

impl MonthWindow {
    /// Window for the month starting at `start`.
    #[must_use]
    pub fn starting(start: NaiveDate) -> Self {
        let end_exclusive = start
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self {
            label: start.format("%b %Y").to_string(),
            start,
            end_exclusive,
        }
    }

    /// True when `date` falls in the month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end_exclusive
    }

    /// True when the month shares at least one instant with `range`.
    #[must_use]
    pub fn overlaps(&self, range: &DateRange) -> bool {
        let start = self.start.and_time(NaiveTime::MIN).and_utc();
        let end = self.end_exclusive.and_time(NaiveTime::MIN).and_utc();
        start <= range.end && end > range.start
    }
}

/// Builds the trend, rollup and cash-inflow series for one evaluation instant.
#[derive(Debug, Clone, Copy)]
pub struct TrendSeriesBuilder {
    now: DateTime<Utc>,
    range: Option<DateRange>,
}

impl TrendSeriesBuilder {
    /// Builder for `now`, optionally restricted to `range`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>, range: Option<DateRange>) -> Self {
        Self { now, range }
    }

    /// The 12 months ending at the current month, oldest first, minus the
    /// months lying wholly outside the range.
    #[must_use]
    pub fn month_windows(&self) -> Vec<MonthWindow> {
        let today = self.now.date_naive();
        let Some(current) = NaiveDate::from_ymd_opt(today.year(), today.month(), 1) else {
            return Vec::new();
        };

        (0..TREND_MONTHS)
            .rev()
            .filter_map(|back| current.checked_sub_months(Months::new(back)))
            .map(MonthWindow::starting)
            .filter(|w| self.range.is_none_or(|r| w.overlaps(&r)))
            .collect()
    }

    /// Buckets `(issue_date, total, paid)` rows into one point per window.
    #[must_use]
    pub fn monthly_series<I>(windows: &[MonthWindow], invoices: I) -> Vec<TrendPoint>
    where
        I: IntoIterator<Item = (NaiveDate, Decimal, Decimal)>,
    {
        let mut points: Vec<TrendPoint> = windows
            .iter()
            .map(|w| TrendPoint {
                month: w.label.clone(),
                sales: Decimal::ZERO,
                balance_due: Decimal::ZERO,
            })
            .collect();

        for (issued, total, paid) in invoices {
            if let Some(idx) = windows.iter().position(|w| w.contains(issued)) {
                points[idx].sales += total;
                points[idx].balance_due += total - paid;
            }
        }
        points
    }

    /// Folds consecutive pairs of months into `Q1`, `Q2`, ...
    #[must_use]
    pub fn quarterly(points: &[TrendPoint]) -> Vec<QuarterPoint> {
        points
            .chunks(MONTHS_PER_QUARTER)
            .enumerate()
            .map(|(idx, chunk)| {
                let actual: Decimal = chunk.iter().map(|p| p.sales).sum();
                let target = actual
                    .checked_mul(QUARTER_TARGET_FACTOR)
                    .map_or(Decimal::MAX, round_half_up);
                QuarterPoint {
                    label: format!("Q{}", idx + 1),
                    actual,
                    target,
                }
            })
            .collect()
    }

    /// Cash point for one month.
    #[must_use]
    pub fn cash_inflow_point(window: &MonthWindow, actual: Decimal, due_total: Decimal) -> CashInflowPoint {
        CashInflowPoint {
            month: window.label.clone(),
            actual,
            estimated: due_total
                .checked_mul(CASH_ESTIMATE_FACTOR)
                .unwrap_or(Decimal::MAX),
        }
    }
}
