//! Sale-date parsing and week bucketing.
//!
//! Two week conventions are supported and must be chosen explicitly:
//! - `WeekRule::Iso` buckets by ISO-8601 week and ISO week-year.
//! - `WeekRule::Calendar` numbers weeks inside the *calendar* year using a
//!   configurable first weekday and counting rule. Early-January days that
//!   belong to the previous year's last week keep their calendar year, so
//!   (year, 52/53) can name two separate spans of days in the same year.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::data::TimeBucket;
use crate::errors::RollupError;

/// How the first week of a calendar year is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalendarWeekRule {
    /// Week 1 starts on January 1st and ends before the first `first_day`.
    FirstDay,
    /// Week 1 is the first full week starting on `first_day`.
    FirstFullWeek,
    /// Week 1 is the first week with at least four days in the new year.
    FirstFourDayWeek,
}

impl CalendarWeekRule {
    fn min_days(self) -> i64 {
        match self {
            CalendarWeekRule::FirstDay => 1,
            CalendarWeekRule::FirstFullWeek => 7,
            CalendarWeekRule::FirstFourDayWeek => 4,
        }
    }
}

/// Week numbering convention used for time buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WeekRule {
    /// ISO-8601 week of the ISO week-year.
    #[default]
    Iso,
    /// Week of the calendar year under an explicit first weekday and rule.
    Calendar {
        /// Day each week starts on.
        first_day: Weekday,
        /// How the first week of the year is chosen.
        rule: CalendarWeekRule,
    },
}

impl WeekRule {
    /// Calendar rule matching the en-GB platform convention (Monday, four-day week).
    pub const fn calendar_en_gb() -> Self {
        WeekRule::Calendar {
            first_day: Weekday::Mon,
            rule: CalendarWeekRule::FirstFourDayWeek,
        }
    }

    /// Time bucket that `date` falls into.
    pub fn bucket(&self, date: NaiveDate) -> TimeBucket {
        match *self {
            WeekRule::Iso => {
                let iso = date.iso_week();
                TimeBucket::new(iso.year(), iso.week())
            }
            WeekRule::Calendar { first_day, rule } => {
                TimeBucket::new(date.year(), calendar_week(date, first_day, rule))
            }
        }
    }
}

/// Parse a sale date with a chrono format string.
pub fn parse_sales_date(value: &str, format: &str) -> Result<NaiveDate, RollupError> {
    NaiveDate::parse_from_str(value, format).map_err(|_| RollupError::DateParse {
        value: value.to_string(),
        format: format.to_string(),
    })
}

/// Week of the calendar year for `date`.
///
/// Weekdays are counted from Sunday = 0. Days before the first week of the
/// year are numbered as the last week of the previous year.
pub fn calendar_week(date: NaiveDate, first_day: Weekday, rule: CalendarWeekRule) -> u32 {
    let day_of_year = i64::from(date.ordinal0());
    let weekday = i64::from(date.weekday().num_days_from_sunday());
    let first = i64::from(first_day.num_days_from_sunday());
    let jan1 = weekday - day_of_year % 7;

    if rule == CalendarWeekRule::FirstDay {
        let offset = (jan1 - first + 14) % 7;
        return ((day_of_year + offset) / 7 + 1) as u32;
    }

    let mut offset = (first - jan1 + 14) % 7;
    if offset != 0 && offset >= rule.min_days() {
        offset -= 7;
    }
    let day = day_of_year - offset;
    if day >= 0 {
        return (day / 7 + 1) as u32;
    }
    match NaiveDate::from_ymd_opt(date.year() - 1, 12, 31) {
        Some(previous_year_end) => calendar_week(previous_year_end, first_day, rule),
        None => 1,
    }
}
