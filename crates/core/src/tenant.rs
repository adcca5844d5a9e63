//! Tenant context threaded through every metrics call.
//!
//! A `TenantContext` can only be built from an `OwnerId`, so every query the
//! engine issues is tied to exactly one tenant. Requests without a tenant
//! never get a context at all.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

pub use finboard_shared::OwnerId;

/// Days used when no range is given.
pub const DEFAULT_RANGE_DAYS: u32 = 30;

/// Longest range accepted from a `<N>d` label.
pub const MAX_RANGE_DAYS: u32 = 3650;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Inclusive time range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Range start.
    pub start: DateTime<Utc>,
    /// Range end.
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range, swapping the bounds if they arrive reversed.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// The `days` days ending at `now`.
    #[must_use]
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        Self::new(now - Duration::days(i64::from(days)), now)
    }

    /// Range covering whole calendar days from `from` through `to`.
    #[must_use]
    pub fn from_dates(from: NaiveDate, to: NaiveDate) -> Self {
        let start = from.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = to
            .and_hms_milli_opt(23, 59, 59, 999)
            .map_or(start, |end| end.and_utc());
        Self::new(start, end)
    }

    /// `max(1, ceil((end - start) / 1 day))`.
    #[must_use]
    pub fn days_in_range(&self) -> i64 {
        let millis = (self.end - self.start).num_milliseconds().max(0);
        ((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY).max(1)
    }

    /// First calendar day touched by the range.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Last calendar day touched by the range.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }
}

/// Parses a `<N>d` range label (`15d`, `30d`, `90d`, ...).
///
/// Returns `None` for anything that is not a positive day count up to
/// [`MAX_RANGE_DAYS`].
#[must_use]
pub fn parse_range_days(label: &str) -> Option<u32> {
    let days: u32 = label.trim().strip_suffix('d')?.parse().ok()?;
    (1..=MAX_RANGE_DAYS).contains(&days).then_some(days)
}

/// Date-range part of a metrics request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsFilter {
    /// Range the invoice aggregates are restricted to, if any.
    pub range: Option<DateRange>,
    /// Label echoed back to clients (e.g. `"30d"`).
    pub range_label: String,
}

impl MetricsFilter {
    /// Builds the filter for a `?range=` query value.
    ///
    /// Missing or unparseable labels fall back to `default_days`.
    #[must_use]
    pub fn from_range_param(param: Option<&str>, now: DateTime<Utc>, default_days: u32) -> Self {
        let days = param.and_then(parse_range_days).unwrap_or(default_days);
        Self {
            range: Some(DateRange::trailing_days(now, days)),
            range_label: format!("{days}d"),
        }
    }

    /// Filter without a date restriction.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            range: None,
            range_label: "all".to_string(),
        }
    }

    /// Days covered by the filter, [`DEFAULT_RANGE_DAYS`] without a range.
    #[must_use]
    pub fn days_in_range(&self) -> i64 {
        self.range
            .map_or(i64::from(DEFAULT_RANGE_DAYS), |r| r.days_in_range())
    }
}

/// `(owner, filter)` pair plus the instant the request is evaluated at.
///
/// All sections of one snapshot share the same `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    owner_id: OwnerId,
    filter: MetricsFilter,
    now: DateTime<Utc>,
}

impl TenantContext {
    /// Creates a context for a known tenant.
    #[must_use]
    pub const fn new(owner_id: OwnerId, filter: MetricsFilter, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            filter,
            now,
        }
    }

    /// Creates a context only when a tenant is present.
    #[must_use]
    pub fn for_owner(
        owner_id: Option<OwnerId>,
        filter: MetricsFilter,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        owner_id.map(|owner_id| Self::new(owner_id, filter, now))
    }

    /// The tenant every query is scoped to.
    #[must_use]
    pub const fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    /// The date filter.
    #[must_use]
    pub const fn filter(&self) -> &MetricsFilter {
        &self.filter
    }

    /// Evaluation instant.
    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Evaluation date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case("15d", Some(15))]
    #[case("30d", Some(30))]
    #[case("90d", Some(90))]
    #[case("7d", Some(7))]
    #[case(" 45d ", Some(45))]
    #[case("0d", None)]
    #[case("30", None)]
    #[case("d", None)]
    #[case("-5d", None)]
    #[case("3651d", None)]
    #[case("abc", None)]
    fn test_parse_range_days(#[case] label: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_range_days(label), expected);
    }

    #[test]
    fn test_unparseable_range_falls_back_to_default() {
        let filter = MetricsFilter::from_range_param(Some("weekly"), now(), 30);

        assert_eq!(filter.range_label, "30d");
        assert_eq!(filter.days_in_range(), 30);
    }

    #[test]
    fn test_days_in_range_rounds_partial_days_up() {
        let start = now();
        let range = DateRange::new(start, start + Duration::hours(36));

        assert_eq!(range.days_in_range(), 2);
    }

    #[test]
    fn test_days_in_range_is_at_least_one() {
        assert_eq!(DateRange::new(now(), now()).days_in_range(), 1);
    }

    #[test]
    fn test_unbounded_filter_uses_default_days() {
        assert_eq!(MetricsFilter::unbounded().days_in_range(), 30);
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let later = now() + Duration::days(3);
        let range = DateRange::new(later, now());

        assert_eq!(range.start, now());
        assert_eq!(range.end, later);
    }

    #[test]
    fn test_from_dates_covers_whole_days() {
        let from = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 10, 31).unwrap();
        let range = DateRange::from_dates(from, to);

        assert_eq!(range.start_date(), from);
        assert_eq!(range.end_date(), to);
        assert_eq!(range.days_in_range(), 92);
    }

    #[test]
    fn test_context_requires_owner() {
        assert!(TenantContext::for_owner(None, MetricsFilter::unbounded(), now()).is_none());

        let owner = OwnerId::new();
        let ctx = TenantContext::for_owner(Some(owner), MetricsFilter::unbounded(), now()).unwrap();
        assert_eq!(ctx.owner_id(), owner);
        assert_eq!(ctx.today(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }
}
