//! `INV-{year}{sequence:04}` invoice numbers.

use std::fmt;

use serde::{Serialize, Serializer};

/// Prefix shared by every invoice number.
pub const INVOICE_PREFIX: &str = "INV-";

/// Human-readable invoice number.
///
/// Sequences below 10000 are zero-padded to four digits; larger ones widen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceNumber {
    year: i32,
    sequence: u64,
}

impl InvoiceNumber {
    /// Number `sequence` of `year`.
    #[must_use]
    pub const fn new(year: i32, sequence: u64) -> Self {
        Self { year, sequence }
    }

    /// Issue year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Position within the year.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The same year, one sequence later.
    #[must_use]
    pub const fn bumped(&self) -> Self {
        Self::new(self.year, self.sequence.saturating_add(1))
    }

    /// `INV-{year}`, the prefix every number of `year` starts with.
    #[must_use]
    pub fn year_prefix(year: i32) -> String {
        format!("{INVOICE_PREFIX}{year}")
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{INVOICE_PREFIX}{}{:04}", self.year, self.sequence)
    }
}

impl Serialize for InvoiceNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
