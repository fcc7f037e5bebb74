//! The calendar month a report covers.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{Datelike, Months, NaiveDate};

use crate::error::ReportError;

/// Years a report can cover.
pub const YEAR_RANGE: RangeInclusive<i32> = 1..=9999;

/// A validated (year, month) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportPeriod {
    first_day: NaiveDate,
}

impl ReportPeriod {
    /// Validates `month` and the first day of the month. Years outside [`YEAR_RANGE`] are
    /// rejected.
    pub fn new(year: i32, month: u32) -> Result<Self, ReportError> {
        if !(1..=12).contains(&month) {
            return Err(ReportError::InvalidMonth(month));
        }
        if !YEAR_RANGE.contains(&year) {
            return Err(ReportError::InvalidDate { year, month });
        }
        let first_day =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(ReportError::InvalidDate { year, month })?;
        Ok(Self { first_day })
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// First day of the month.
    pub fn start_date(&self) -> NaiveDate {
        self.first_day
    }

    /// Last day of the month, inclusive.
    pub fn end_date(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or_else(|| self.first_day.with_day(31).unwrap_or(self.first_day))
    }

    /// English month name, e.g. `January`.
    pub fn month_name(&self) -> String {
        self.first_day.format("%B").to_string()
    }

    /// Human readable label, e.g. `January 2023`.
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year())
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}
