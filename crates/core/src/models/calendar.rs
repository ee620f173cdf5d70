use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// The fixed 12-month calendar vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month number, 1 (January) to 12 (December).
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Month> {
        number
            .checked_sub(1)
            .and_then(|idx| Month::ALL.get(idx as usize).copied())
    }

    /// Like [`Month::from_number`] but reports out-of-range input.
    pub fn try_from_number(number: u32) -> Result<Month, CoreError> {
        Month::from_number(number).ok_or_else(|| {
            CoreError::Validation(format!("Month must be between 1 and 12, got {number}"))
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    pub fn of(date: NaiveDate) -> Month {
        // chrono guarantees 1..=12
        Month::ALL[date.month0() as usize]
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Keep only the month numbers that belong to the calendar vocabulary and
/// return them in calendar order, whatever order (or duplicates) the server sent.
pub fn months_in_calendar_order(numbers: &[u32]) -> Vec<Month> {
    Month::ALL
        .iter()
        .copied()
        .filter(|m| numbers.contains(&m.number()))
        .collect()
}

/// The dashboard's year/month selection.
///
/// A months fetch needs `year`; a summary fetch needs both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub month: Option<Month>,
}

impl FilterSelection {
    pub fn new(year: Option<i32>, month: Option<Month>) -> Self {
        Self { year, month }
    }

    /// Selection for the calendar month containing `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            year: Some(date.year()),
            month: Some(Month::of(date)),
        }
    }

    /// The (year, month) pair a summary can be fetched for, if complete.
    pub fn summary_key(&self) -> Option<(i32, Month)> {
        Some((self.year?, self.month?))
    }
}
