//! Calendar arithmetic shared by budgets, stats and the recurring processor.
//!
//! All helpers work on [`NaiveDate`] because transaction dates carry no time
//! or zone. Month and year steps clamp to the last valid day of the target
//! month (Jan 31 + 1 month = Feb 28/29).

use chrono::{Datelike, Days, Months, NaiveDate};

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    add_months(month_start(date), 1)
}

/// Adds whole calendar months, clamping the day of month
///
/// Saturates at [`NaiveDate::MAX`] rather than overflowing.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Subtracts whole calendar months, clamping the day of month
pub fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Adds days, saturating at [`NaiveDate::MAX`]
pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// `YYYY-MM` key used to bucket transactions by month
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
