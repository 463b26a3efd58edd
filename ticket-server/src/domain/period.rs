//! Service periods: which dates does a train run?
//!
//! A [`Period`] is a weekly pattern (one boolean per weekday) valid over an
//! inclusive date range, plus date-specific exceptions. This mirrors the GTFS
//! `calendar.txt` / `calendar_dates.txt` pair: an exception with `add_day`
//! set corresponds to `exception_type = 1` (service added), cleared to
//! `exception_type = 2` (service removed).

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::{DomainError, PeriodId};

/// A date-specific override of a period's weekday pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodException {
    pub date: NaiveDate,
    /// True: the train runs on `date` regardless of the weekday pattern.
    /// False: it does not run, regardless of the pattern.
    pub add_day: bool,
}

/// A weekly service calendar with a validity range and exceptions.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ticket_server::domain::{Period, PeriodId};
///
/// // Monday-to-Friday service for all of 2024.
/// let period = Period::new(
///     PeriodId(1),
///     [true, true, true, true, true, false, false],
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
/// );
///
/// // 2024-06-10 is a Monday, 2024-06-08 a Saturday.
/// assert!(period.runs_on(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()));
/// assert!(!period.runs_on(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub id: PeriodId,
    /// One flag per weekday, Monday at index 0 through Sunday at index 6.
    pub weekdays: [bool; 7],
    /// First valid date, inclusive.
    pub start_date: NaiveDate,
    /// Last valid date, inclusive.
    pub end_date: NaiveDate,
    exceptions: BTreeMap<NaiveDate, bool>,
}

impl Period {
    /// Creates a period with no exceptions.
    pub fn new(
        id: PeriodId,
        weekdays: [bool; 7],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            weekdays,
            start_date,
            end_date,
            exceptions: BTreeMap::new(),
        }
    }

    /// Registers a date-specific exception.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an exception already exists for the date: at most
    /// one exception per (period, date) pair.
    pub fn add_exception(&mut self, exception: PeriodException) -> Result<(), DomainError> {
        if self.exceptions.contains_key(&exception.date) {
            return Err(DomainError::DuplicateException {
                period: self.id,
                date: exception.date,
            });
        }
        self.exceptions.insert(exception.date, exception.add_day);
        Ok(())
    }

    /// Returns the exception registered for a date, if any.
    pub fn exception_on(&self, date: NaiveDate) -> Option<PeriodException> {
        self.exceptions
            .get(&date)
            .map(|&add_day| PeriodException { date, add_day })
    }

    /// All exceptions, in date order.
    pub fn exceptions(&self) -> impl Iterator<Item = PeriodException> + '_ {
        self.exceptions
            .iter()
            .map(|(&date, &add_day)| PeriodException { date, add_day })
    }

    /// Does a train on this period run on `date`?
    ///
    /// Dates outside `[start_date, end_date]` never run. Inside the range an
    /// exception for the exact date is authoritative; otherwise the weekday
    /// flag decides. A degenerate period (`start_date > end_date`) never
    /// matches any date, which is the intended behavior for malformed data
    /// rather than an error.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if date < self.start_date || date > self.end_date {
            return false;
        }
        if let Some(&add_day) = self.exceptions.get(&date) {
            return add_day;
        }
        self.weekdays[date.weekday().num_days_from_monday() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekdays_only() -> Period {
        Period::new(
            PeriodId(1),
            [true, true, true, true, true, false, false],
            date(2024, 1, 1),
            date(2024, 12, 31),
        )
    }

    #[test]
    fn weekday_pattern_is_honored() {
        let p = weekdays_only();

        // 2024-06-10 through 2024-06-16 is a Monday..Sunday week.
        assert!(p.runs_on(date(2024, 6, 10))); // Monday
        assert!(p.runs_on(date(2024, 6, 14))); // Friday
        assert!(!p.runs_on(date(2024, 6, 15))); // Saturday
        assert!(!p.runs_on(date(2024, 6, 16))); // Sunday
    }

    #[test]
    fn validity_range_is_inclusive() {
        let p = Period::new(
            PeriodId(1),
            [true; 7],
            date(2024, 6, 1),
            date(2024, 6, 30),
        );

        assert!(!p.runs_on(date(2024, 5, 31)));
        assert!(p.runs_on(date(2024, 6, 1)));
        assert!(p.runs_on(date(2024, 6, 30)));
        assert!(!p.runs_on(date(2024, 7, 1)));
    }

    #[test]
    fn added_day_overrides_pattern() {
        let mut p = weekdays_only();
        // A Saturday the train exceptionally runs.
        p.add_exception(PeriodException {
            date: date(2024, 6, 15),
            add_day: true,
        })
        .unwrap();

        assert!(p.runs_on(date(2024, 6, 15)));
        // Other Saturdays are unaffected.
        assert!(!p.runs_on(date(2024, 6, 22)));
    }

    #[test]
    fn removed_day_overrides_pattern() {
        let mut p = weekdays_only();
        // A public holiday on a Wednesday.
        p.add_exception(PeriodException {
            date: date(2024, 5, 1),
            add_day: false,
        })
        .unwrap();

        assert!(!p.runs_on(date(2024, 5, 1)));
        assert!(p.runs_on(date(2024, 5, 8)));
    }

    #[test]
    fn exception_outside_range_does_not_resurrect() {
        let mut p = Period::new(
            PeriodId(1),
            [true; 7],
            date(2024, 6, 1),
            date(2024, 6, 30),
        );
        p.add_exception(PeriodException {
            date: date(2024, 7, 14),
            add_day: true,
        })
        .unwrap();

        // The range check wins over the exception.
        assert!(!p.runs_on(date(2024, 7, 14)));
    }

    #[test]
    fn duplicate_exception_rejected() {
        let mut p = weekdays_only();
        let e = PeriodException {
            date: date(2024, 5, 1),
            add_day: false,
        };
        p.add_exception(e).unwrap();

        let err = p
            .add_exception(PeriodException {
                date: date(2024, 5, 1),
                add_day: true,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateException { .. }));

        // The original exception is untouched.
        assert_eq!(p.exception_on(date(2024, 5, 1)), Some(e));
    }

    #[test]
    fn degenerate_range_never_runs() {
        let p = Period::new(
            PeriodId(1),
            [true; 7],
            date(2024, 12, 31),
            date(2024, 1, 1),
        );

        assert!(!p.runs_on(date(2024, 6, 10)));
        assert!(!p.runs_on(date(2024, 1, 1)));
        assert!(!p.runs_on(date(2024, 12, 31)));
    }

    #[test]
    fn exceptions_iterate_in_date_order() {
        let mut p = weekdays_only();
        for (m, d, add) in [(8u32, 15u32, false), (5, 1, false), (7, 14, true)] {
            p.add_exception(PeriodException {
                date: date(2024, m, d),
                add_day: add,
            })
            .unwrap();
        }

        let dates: Vec<_> = p.exceptions().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 5, 1), date(2024, 7, 14), date(2024, 8, 15)]
        );
    }
}
