//! Calendar helpers: bucket keys, display labels and date walks.
//!
//! Labels come from fixed Dutch tables rather than the system locale so that
//! generated dashboards are identical on every host.

use time::{Date, Time};

/// Weekday abbreviations, Monday first.
pub const WEEKDAY_ABBREV: [&str; 7] = ["ma", "di", "wo", "do", "vr", "za", "zo"];

/// Month abbreviations, January first.
pub const MONTH_ABBREV: [&str; 12] = [
    "jan", "feb", "mrt", "apr", "mei", "jun", "jul", "aug", "sep", "okt", "nov", "dec",
];

/// Full month names, January first.
pub const MONTH_NAME: [&str; 12] = [
    "januari",
    "februari",
    "maart",
    "april",
    "mei",
    "juni",
    "juli",
    "augustus",
    "september",
    "oktober",
    "november",
    "december",
];

/// The calendar-based bucket granularities.
///
/// Multi-year chunks are not listed here: their boundaries depend on which
/// years hold data, not on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    /// Key of the bucket containing `date`.
    ///
    /// ```
    /// use p1dash_core::calendar::Granularity;
    /// use time::macros::date;
    ///
    /// assert_eq!(Granularity::Day.key(date!(2024-03-05)), "2024-03-05");
    /// assert_eq!(Granularity::Week.key(date!(2021-01-03)), "2020-53");
    /// assert_eq!(Granularity::Month.key(date!(2024-03-05)), "2024-03");
    /// assert_eq!(Granularity::Year.key(date!(2024-03-05)), "2024");
    /// ```
    #[must_use]
    pub fn key(self, date: Date) -> String {
        match self {
            Granularity::Day => format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                month_number(date),
                date.day()
            ),
            Granularity::Week => {
                let (year, week, _) = date.to_iso_week_date();
                format!("{:04}-{:02}", year, week)
            }
            Granularity::Month => format!("{:04}-{:02}", date.year(), month_number(date)),
            Granularity::Year => format!("{:04}", date.year()),
        }
    }

    /// Display title of the bucket containing `date`.
    #[must_use]
    pub fn title(self, date: Date) -> String {
        match self {
            Granularity::Day => format!(
                "{} {} {} {}",
                weekday_abbrev(date),
                date.day(),
                month_abbrev(date),
                date.year()
            ),
            Granularity::Week => {
                let (year, week, _) = date.to_iso_week_date();
                format!("Week {}, {}", week, year)
            }
            Granularity::Month => format!("{} {}", month_name(date), date.year()),
            Granularity::Year => date.year().to_string(),
        }
    }
}

/// Month as 1..=12.
#[must_use]
pub fn month_number(date: Date) -> u8 {
    u8::from(date.month())
}

#[must_use]
pub fn weekday_abbrev(date: Date) -> &'static str {
    WEEKDAY_ABBREV[usize::from(date.weekday().number_days_from_monday())]
}

#[must_use]
pub fn month_abbrev(date: Date) -> &'static str {
    MONTH_ABBREV[usize::from(month_number(date) - 1)]
}

#[must_use]
pub fn month_name(date: Date) -> &'static str {
    MONTH_NAME[usize::from(month_number(date) - 1)]
}

/// `HH:MM` label for a sample inside a day.
#[must_use]
pub fn clock_label(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Iterator over every date from `first` to `last`, both inclusive.
#[derive(Debug, Clone)]
pub struct DateRange {
    next: Option<Date>,
    last: Date,
}

impl Iterator for DateRange {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let current = self.next.filter(|d| *d <= self.last)?;
        self.next = current.next_day();
        Some(current)
    }
}

/// Walk the calendar one day at a time.
///
/// Empty when `first > last`.
#[must_use]
pub fn days(first: Date, last: Date) -> DateRange {
    DateRange {
        next: Some(first),
        last,
    }
}
