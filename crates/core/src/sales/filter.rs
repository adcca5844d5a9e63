//! Sales-invoice dashboard filters.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tenant::DateRange;

/// GST component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxType {
    /// Central GST.
    Cgst,
    /// State GST.
    Sgst,
    /// Integrated GST.
    Igst,
}

impl TaxType {
    /// All components in display order.
    pub const ALL: [Self; 3] = [Self::Cgst, Self::Sgst, Self::Igst];

    /// Parses one component name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cgst" => Some(Self::Cgst),
            "sgst" => Some(Self::Sgst),
            "igst" => Some(Self::Igst),
            _ => None,
        }
    }

    /// Parses a comma-separated list, dropping unknown and repeated names.
    #[must_use]
    pub fn parse_list(csv: &str) -> Vec<Self> {
        let mut types = Vec::new();
        for tax in csv.split(',').filter_map(Self::parse) {
            if !types.contains(&tax) {
                types.push(tax);
            }
        }
        types
    }
}

/// Invalid query parameter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Not a `YYYY-MM-DD` date.
    #[error("Invalid date for {field}: {value}")]
    InvalidDate {
        /// Parameter name.
        field: &'static str,
        /// Rejected value.
        value: String,
    },

    /// Not a decimal amount.
    #[error("Invalid amount for {field}: {value}")]
    InvalidAmount {
        /// Parameter name.
        field: &'static str,
        /// Rejected value.
        value: String,
    },

    /// `dateFrom` after `dateTo` or `amountMin` above `amountMax`.
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),
}

/// Raw query values as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesFilterParams {
    /// Earliest invoice date.
    pub date_from: Option<String>,
    /// Latest invoice date.
    pub date_to: Option<String>,
    /// Customer name fragment.
    pub customer: Option<String>,
    /// Business unit.
    pub business_unit: Option<String>,
    /// Region.
    pub region: Option<String>,
    /// Zone.
    pub zone: Option<String>,
    /// Invoice type.
    pub invoice_type: Option<String>,
    /// Minimum invoice total.
    pub amount_min: Option<String>,
    /// Maximum invoice total.
    pub amount_max: Option<String>,
    /// Comma-separated GST components.
    pub tax_types: Option<String>,
}

/// Parsed sales-invoice filter. Empty fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesInvoiceFilter {
    /// Earliest invoice date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest invoice date, inclusive.
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive customer name fragment.
    pub customer: Option<String>,
    /// Exact business unit.
    pub business_unit: Option<String>,
    /// Exact region.
    pub region: Option<String>,
    /// Exact zone.
    pub zone: Option<String>,
    /// Exact invoice type.
    pub invoice_type: Option<String>,
    /// Minimum total, inclusive.
    pub amount_min: Option<Decimal>,
    /// Maximum total, inclusive.
    pub amount_max: Option<Decimal>,
    /// Components of interest; empty means all.
    pub tax_types: Vec<TaxType>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(field: &'static str, value: Option<String>) -> Result<Option<NaiveDate>, FilterError> {
    non_empty(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| FilterError::InvalidDate { field, value: v })
        })
        .transpose()
}

fn parse_amount(field: &'static str, value: Option<String>) -> Result<Option<Decimal>, FilterError> {
    non_empty(value)
        .map(|v| {
            v.parse::<Decimal>()
                .map_err(|_| FilterError::InvalidAmount { field, value: v })
        })
        .transpose()
}

impl SalesInvoiceFilter {
    /// Parses raw query values.
    ///
    /// # Errors
    ///
    /// Returns `FilterError` for malformed dates or amounts and for
    /// inverted ranges.
    pub fn parse(params: SalesFilterParams) -> Result<Self, FilterError> {
        let filter = Self {
            date_from: parse_date("dateFrom", params.date_from)?,
            date_to: parse_date("dateTo", params.date_to)?,
            customer: non_empty(params.customer),
            business_unit: non_empty(params.business_unit),
            region: non_empty(params.region),
            zone: non_empty(params.zone),
            invoice_type: non_empty(params.invoice_type),
            amount_min: parse_amount("amountMin", params.amount_min)?,
            amount_max: parse_amount("amountMax", params.amount_max)?,
            tax_types: params
                .tax_types
                .as_deref()
                .map(TaxType::parse_list)
                .unwrap_or_default(),
        };

        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to)
            && from > to
        {
            return Err(FilterError::InvalidRange("dateFrom is after dateTo"));
        }
        if let (Some(min), Some(max)) = (filter.amount_min, filter.amount_max)
            && min > max
        {
            return Err(FilterError::InvalidRange("amountMin is above amountMax"));
        }
        Ok(filter)
    }

    /// Components to report; all three when none were chosen.
    #[must_use]
    pub fn effective_tax_types(&self) -> Vec<TaxType> {
        if self.tax_types.is_empty() {
            TaxType::ALL.to_vec()
        } else {
            self.tax_types.clone()
        }
    }

    /// Date range for the monthly series, if any bound was given.
    ///
    /// An open upper bound ends at `today`.
    #[must_use]
    pub fn date_range(&self, today: NaiveDate) -> Option<DateRange> {
        if self.date_from.is_none() && self.date_to.is_none() {
            return None;
        }
        let from = self.date_from.unwrap_or(NaiveDate::MIN);
        Some(DateRange::from_dates(from, self.date_to.unwrap_or(today)))
    }
}
