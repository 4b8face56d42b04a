use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::calendar::Locale;

#[derive(Debug, Error, PartialEq)]
pub enum LunarError {
    #[error("Invalid Hijri date: {0}")]
    InvalidDate(HijriDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HijriDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl HijriDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for HijriDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02} AH", self.year, self.month, self.day)
    }
}

/// Conversion between a lunar calendar and the Gregorian calendar.
#[cfg_attr(test, mockall::automock)]
pub trait LunarCalendar {
    /// Fails with [`LunarError::InvalidDate`] when the month/day combination
    /// does not exist in that lunar year.
    fn to_gregorian(&self, date: HijriDate) -> Result<NaiveDate, LunarError>;

    fn from_gregorian(&self, date: NaiveDate) -> HijriDate;
}

/// Arithmetical (civil) Islamic calendar: 30-year cycle with 11 leap years,
/// alternating 30/29-day months, and a 30th day of Dhu al-Hijjah in leap years.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularHijri;

const EPOCH_YEAR: i32 = 622;
const EPOCH_MONTH: u32 = 7;
const EPOCH_DAY: u32 = 19;

impl TabularHijri {
    pub fn is_leap_year(year: i32) -> bool {
        (14 + 11 * year).rem_euclid(30) < 11
    }

    pub fn month_length(year: i32, month: u32) -> u32 {
        if month % 2 == 1 || (month == 12 && Self::is_leap_year(year)) {
            30
        } else {
            29
        }
    }

    fn epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(EPOCH_YEAR, EPOCH_MONTH, EPOCH_DAY).unwrap_or(NaiveDate::MIN)
    }

    /// Days elapsed from 1 Muharram 1 AH.
    fn days_from_epoch(date: HijriDate) -> i64 {
        let year = date.year as i64;
        let month = date.month as i64;
        (date.day as i64 - 1)
            + (59 * (month - 1) + 1) / 2
            + (year - 1) * 354
            + (3 + 11 * year).div_euclid(30)
    }

    fn offset(days: i64) -> Option<NaiveDate> {
        let epoch = Self::epoch();
        if days >= 0 {
            epoch.checked_add_days(Days::new(days as u64))
        } else {
            epoch.checked_sub_days(Days::new(days.unsigned_abs()))
        }
    }

    fn year_start(year: i32) -> i64 {
        Self::days_from_epoch(HijriDate::new(year, 1, 1))
    }
}

impl LunarCalendar for TabularHijri {
    fn to_gregorian(&self, date: HijriDate) -> Result<NaiveDate, LunarError> {
        if date.year < 1
            || !(1..=12).contains(&date.month)
            || date.day < 1
            || date.day > Self::month_length(date.year, date.month)
        {
            return Err(LunarError::InvalidDate(date));
        }

        Self::offset(Self::days_from_epoch(date)).ok_or(LunarError::InvalidDate(date))
    }

    fn from_gregorian(&self, date: NaiveDate) -> HijriDate {
        let days = (date - Self::epoch()).num_days();

        let mut year = ((30 * days + 10646).div_euclid(10631)) as i32;
        while Self::year_start(year + 1) <= days {
            year += 1;
        }
        while Self::year_start(year) > days {
            year -= 1;
        }

        let mut remaining = days - Self::year_start(year);
        let mut month = 1;
        while month < 12 && remaining >= Self::month_length(year, month) as i64 {
            remaining -= Self::month_length(year, month) as i64;
            month += 1;
        }

        HijriDate::new(year, month, remaining as u32 + 1)
    }
}

pub fn format_hijri(date: HijriDate, locale: Locale) -> String {
    format!(
        "{} {} {}",
        locale.digits(date.day),
        locale.hijri_month_name(date.month),
        locale.digits(date.year)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn epoch_is_first_of_muharram() {
        let calendar = TabularHijri;

        assert_eq!(calendar.to_gregorian(HijriDate::new(1, 1, 1)), Ok(date(622, 7, 19)));
        assert_eq!(calendar.from_gregorian(date(622, 7, 19)), HijriDate::new(1, 1, 1));
    }

    #[test]
    fn start_of_ramadan_1446() {
        let calendar = TabularHijri;

        assert_eq!(calendar.to_gregorian(HijriDate::new(1446, 9, 1)), Ok(date(2025, 3, 1)));
        assert_eq!(calendar.to_gregorian(HijriDate::new(1447, 9, 1)), Ok(date(2026, 2, 18)));
    }

    #[test]
    fn eid_al_adha_1446() {
        let calendar = TabularHijri;

        assert_eq!(calendar.to_gregorian(HijriDate::new(1446, 12, 10)), Ok(date(2025, 6, 7)));
    }

    #[test]
    fn thirtieth_of_even_month_is_invalid() {
        let calendar = TabularHijri;
        let missing = HijriDate::new(1446, 2, 30);

        assert_eq!(calendar.to_gregorian(missing), Err(LunarError::InvalidDate(missing)));
    }

    #[test]
    fn thirtieth_of_dhu_al_hijjah_exists_only_in_leap_years() {
        let calendar = TabularHijri;

        assert!(TabularHijri::is_leap_year(1445));
        assert!(!TabularHijri::is_leap_year(1446));
        assert_eq!(calendar.to_gregorian(HijriDate::new(1445, 12, 30)), Ok(date(2024, 7, 7)));
        assert!(calendar.to_gregorian(HijriDate::new(1446, 12, 30)).is_err());
    }

    #[test]
    fn out_of_range_components_are_invalid() {
        let calendar = TabularHijri;

        assert!(calendar.to_gregorian(HijriDate::new(1446, 13, 1)).is_err());
        assert!(calendar.to_gregorian(HijriDate::new(1446, 0, 1)).is_err());
        assert!(calendar.to_gregorian(HijriDate::new(1446, 1, 0)).is_err());
        assert!(calendar.to_gregorian(HijriDate::new(0, 1, 1)).is_err());
    }

    #[test]
    fn leap_years_follow_thirty_year_cycle() {
        let leaps: Vec<i32> = (1..=30).filter(|y| TabularHijri::is_leap_year(*y)).collect();

        assert_eq!(leaps, vec![2, 5, 7, 10, 13, 16, 18, 21, 24, 26, 29]);
    }

    #[test]
    fn gregorian_round_trip_over_four_decades() {
        let calendar = TabularHijri;
        let mut day = date(2000, 1, 1);
        let mut previous = calendar.from_gregorian(day.pred_opt().unwrap());

        while day <= date(2040, 12, 31) {
            let hijri = calendar.from_gregorian(day);
            assert_eq!(calendar.to_gregorian(hijri), Ok(day), "round trip of {day}");
            assert!(hijri > previous);
            previous = hijri;
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn formats_in_english_and_arabic() {
        let ramadan = HijriDate::new(1446, 9, 1);

        assert_eq!(format_hijri(ramadan, Locale::EnUs), "1 Ramadan 1446");
        assert_eq!(format_hijri(ramadan, Locale::Ar), "١ رمضان ١٤٤٦");
    }
}
