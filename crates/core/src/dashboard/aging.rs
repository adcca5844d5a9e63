//! Receivables aging buckets.
//!
//! Buckets are keyed on the invoice due date relative to the evaluation
//! instant:
//!
//! | label   | due date                  |
//! |---------|---------------------------|
//! | `0-30`  | `[now - 30d, now]`        |
//! | `31-60` | `[now - 60d, now - 30d)`  |
//! | `61-90` | `[now - 90d, now - 60d)`  |
//! | `90+`   | `< now - 90d`             |
//!
//! Due dates are calendar days compared at midnight UTC, so each window is
//! turned into a half-open date interval. Invoices due after `now` belong to
//! no bucket.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aging bucket label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgingLabel {
    /// Due within the last 30 days.
    #[serde(rename = "0-30")]
    Current,
    /// 31 to 60 days past due.
    #[serde(rename = "31-60")]
    Days31To60,
    /// 61 to 90 days past due.
    #[serde(rename = "61-90")]
    Days61To90,
    /// More than 90 days past due.
    #[serde(rename = "90+")]
    Over90,
}

impl AgingLabel {
    /// All labels in display order.
    pub const ALL: [Self; 4] = [Self::Current, Self::Days31To60, Self::Days61To90, Self::Over90];

    /// Display form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "0-30",
            Self::Days31To60 => "31-60",
            Self::Days61To90 => "61-90",
            Self::Over90 => "90+",
        }
    }
}

impl std::fmt::Display for AgingLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open balance falling into one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBucket {
    /// Bucket label.
    pub label: AgingLabel,
    /// Σ outstanding.
    pub amount: Decimal,
    /// Number of invoices.
    pub count: i64,
}

impl AgingBucket {
    /// Empty bucket.
    #[must_use]
    pub const fn empty(label: AgingLabel) -> Self {
        Self {
            label,
            amount: Decimal::ZERO,
            count: 0,
        }
    }
}

/// Due-date interval `[from, until)` for one bucket. `from = None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgingWindow {
    /// Bucket the window feeds.
    pub label: AgingLabel,
    /// Inclusive lower bound.
    pub from: Option<NaiveDate>,
    /// Exclusive upper bound.
    pub until: NaiveDate,
}

impl AgingWindow {
    /// True when `due` lies in the window.
    #[must_use]
    pub fn contains(&self, due: NaiveDate) -> bool {
        self.from.is_none_or(|from| due >= from) && due < self.until
    }
}

/// Classifies due dates against a fixed evaluation instant.
#[derive(Debug, Clone, Copy)]
pub struct AgingBucketCalculator {
    now: DateTime<Utc>,
}

impl AgingBucketCalculator {
    /// Calculator evaluated at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// First calendar day whose midnight is not before `now - days`.
    fn cutoff(&self, days: i64) -> NaiveDate {
        let instant = self.now - Duration::days(days);
        let date = instant.date_naive();
        if instant.time() == NaiveTime::MIN {
            date
        } else {
            date.succ_opt().unwrap_or(date)
        }
    }

    /// The four windows in label order.
    #[must_use]
    pub fn windows(&self) -> [AgingWindow; 4] {
        let today = self.now.date_naive();
        let end = today.succ_opt().unwrap_or(today);
        let c30 = self.cutoff(30);
        let c60 = self.cutoff(60);
        let c90 = self.cutoff(90);

        [
            AgingWindow {
                label: AgingLabel::Current,
                from: Some(c30),
                until: end,
            },
            AgingWindow {
                label: AgingLabel::Days31To60,
                from: Some(c60),
                until: c30,
            },
            AgingWindow {
                label: AgingLabel::Days61To90,
                from: Some(c90),
                until: c60,
            },
            AgingWindow {
                label: AgingLabel::Over90,
                from: None,
                until: c90,
            },
        ]
    }

    /// Bucket for `due`, or `None` when it is not yet due.
    #[must_use]
    pub fn classify(&self, due: NaiveDate) -> Option<AgingLabel> {
        self.windows()
            .into_iter()
            .find(|w| w.contains(due))
            .map(|w| w.label)
    }

    /// Groups `(due_date, outstanding)` rows into the four buckets.
    ///
    /// Rows without a positive outstanding balance are ignored.
    #[must_use]
    pub fn partition<I>(&self, rows: I) -> Vec<AgingBucket>
    where
        I: IntoIterator<Item = (NaiveDate, Decimal)>,
    {
        let mut buckets = Self::zeroed();
        for (due, outstanding) in rows {
            if outstanding <= Decimal::ZERO {
                continue;
            }
            if let Some(label) = self.classify(due)
                && let Some(bucket) = buckets.iter_mut().find(|b| b.label == label)
            {
                bucket.amount += outstanding;
                bucket.count += 1;
            }
        }
        buckets
    }

    /// Four empty buckets in label order.
    #[must_use]
    pub fn zeroed() -> Vec<AgingBucket> {
        AgingLabel::ALL.into_iter().map(AgingBucket::empty).collect()
    }
}
