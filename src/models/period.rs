//! Pay period - one calendar month of one year.

use crate::errors::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

/// A calendar month. Months are 1-based (January = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    /// Creates a period, rejecting months outside 1-12 and years chrono cannot represent.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(Error::InvalidPeriod { year, month });
        }
        Ok(Self { year, month })
    }

    /// The period containing the given date.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month, 1-12
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        // Validated in the constructors.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether the date falls inside this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The month before this one.
    #[must_use]
    pub const fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Human-readable label, e.g. `"March 2024"`.
    #[must_use]
    pub fn label(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    /// Short label, e.g. `"Mar 24"`.
    #[must_use]
    pub fn short_label(self) -> String {
        self.first_day().format("%b %y").to_string()
    }

    /// Full month name, e.g. `"March"`.
    #[must_use]
    pub fn month_name(self) -> String {
        self.first_day().format("%B").to_string()
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_new_rejects_bad_month() {
        assert!(matches!(
            PayPeriod::new(2024, 13),
            Err(Error::InvalidPeriod {
                year: 2024,
                month: 13
            })
        ));
        assert!(PayPeriod::new(2024, 0).is_err());
        assert!(PayPeriod::new(2024, 12).is_ok());
    }

    #[test]
    fn test_bounds() {
        let feb = PayPeriod::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = PayPeriod::new(2023, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_previous_wraps_year() {
        let jan = PayPeriod::new(2024, 1).unwrap();
        assert_eq!(jan.previous(), PayPeriod::new(2023, 12).unwrap());
        assert_eq!(
            PayPeriod::new(2024, 5).unwrap().previous(),
            PayPeriod::new(2024, 4).unwrap()
        );
    }

    #[test]
    fn test_labels() {
        let period = PayPeriod::new(2024, 3).unwrap();
        assert_eq!(period.label(), "March 2024");
        assert_eq!(period.short_label(), "Mar 24");
        assert_eq!(period.month_name(), "March");
        assert_eq!(period.to_string(), "2024-03");
    }

    #[test]
    fn test_contains() {
        let period = PayPeriod::new(2024, 3).unwrap();
        assert!(period.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()));
    }
}
