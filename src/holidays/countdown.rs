use chrono::NaiveDate;

use super::definition::MaterializedHoliday;

/// First holiday on or after `today`. Input order breaks ties.
pub fn next_holiday(holidays: &[MaterializedHoliday], today: NaiveDate) -> Option<&MaterializedHoliday> {
    holidays
        .iter()
        .filter(|holiday| holiday.date >= today)
        .min_by_key(|holiday| holiday.date)
}

pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}
