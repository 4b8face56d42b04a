use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LocaleError {
    #[error("Unsupported locale: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    EnUs,
    Fr,
    Ar,
}

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const FR_MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin",
    "juillet", "août", "septembre", "octobre", "novembre", "décembre",
];

const AR_MONTHS: [&str; 12] = [
    "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو",
    "يوليو", "أغسطس", "سبتمبر", "أكتوبر", "نوفمبر", "ديسمبر",
];

// Indexed from Monday.
const EN_WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const FR_WEEKDAYS: [&str; 7] = ["lun.", "mar.", "mer.", "jeu.", "ven.", "sam.", "dim."];
const AR_WEEKDAYS: [&str; 7] = ["اثنين", "ثلاثاء", "أربعاء", "خميس", "جمعة", "سبت", "أحد"];

const EN_HIJRI_MONTHS: [&str; 12] = [
    "Muharram", "Safar", "Rabi' al-Awwal", "Rabi' al-Thani",
    "Jumada al-Ula", "Jumada al-Akhirah", "Rajab", "Sha'ban",
    "Ramadan", "Shawwal", "Dhu al-Qi'dah", "Dhu al-Hijjah",
];

const AR_HIJRI_MONTHS: [&str; 12] = [
    "محرم", "صفر", "ربيع الأول", "ربيع الآخر", "جمادى الأولى", "جمادى الآخرة",
    "رجب", "شعبان", "رمضان", "شوال", "ذو القعدة", "ذو الحجة",
];

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::Fr => "fr",
            Locale::Ar => "ar",
        }
    }

    pub fn week_start(self) -> Weekday {
        match self {
            Locale::EnUs => Weekday::Sun,
            Locale::Fr => Weekday::Mon,
            Locale::Ar => Weekday::Sat,
        }
    }

    /// `month` is 1-based. Out-of-range values yield an empty string.
    pub fn month_name(self, month: u32) -> &'static str {
        let names = match self {
            Locale::EnUs => &EN_MONTHS,
            Locale::Fr => &FR_MONTHS,
            Locale::Ar => &AR_MONTHS,
        };
        month
            .checked_sub(1)
            .and_then(|i| names.get(i as usize))
            .copied()
            .unwrap_or("")
    }

    pub fn hijri_month_name(self, month: u32) -> &'static str {
        let names = match self {
            Locale::Ar => &AR_HIJRI_MONTHS,
            Locale::EnUs | Locale::Fr => &EN_HIJRI_MONTHS,
        };
        month
            .checked_sub(1)
            .and_then(|i| names.get(i as usize))
            .copied()
            .unwrap_or("")
    }

    pub fn weekday_short(self, weekday: Weekday) -> &'static str {
        let names = match self {
            Locale::EnUs => &EN_WEEKDAYS,
            Locale::Fr => &FR_WEEKDAYS,
            Locale::Ar => &AR_WEEKDAYS,
        };
        names[weekday.num_days_from_monday() as usize]
    }

    pub fn digits(self, value: impl ToString) -> String {
        let text = value.to_string();
        match self {
            Locale::Ar => text
                .chars()
                .map(|c| match c.to_digit(10) {
                    Some(d) => char::from_u32(0x0660 + d).unwrap_or(c),
                    None => c,
                })
                .collect(),
            Locale::EnUs | Locale::Fr => text,
        }
    }

    pub fn format_month_title(self, year: i32, month: u32) -> String {
        format!("{} {}", self.month_name(month), self.digits(year))
    }

    pub fn format_long_date(self, date: NaiveDate) -> String {
        match self {
            Locale::EnUs => format!(
                "{}, {} {}, {}",
                date.format("%A"),
                self.month_name(date.month()),
                date.day(),
                date.year()
            ),
            Locale::Fr | Locale::Ar => format!(
                "{} {} {}",
                self.digits(date.day()),
                self.month_name(date.month()),
                self.digits(date.year())
            ),
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let language = lowered.split(['-', '_']).next().unwrap_or("");
        match language {
            "en" => Ok(Locale::EnUs),
            "fr" => Ok(Locale::Fr),
            "ar" => Ok(Locale::Ar),
            _ => Err(LocaleError::Unsupported(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_tags_to_language() {
        assert_eq!("en-US".parse::<Locale>(), Ok(Locale::EnUs));
        assert_eq!("fr_FR".parse::<Locale>(), Ok(Locale::Fr));
        assert_eq!("AR-ma".parse::<Locale>(), Ok(Locale::Ar));
    }

    #[test]
    fn rejects_unknown_language() {
        assert!(matches!("de-DE".parse::<Locale>(), Err(LocaleError::Unsupported(_))));
    }

    #[test]
    fn week_start_follows_locale() {
        assert_eq!(Locale::EnUs.week_start(), Weekday::Sun);
        assert_eq!(Locale::Fr.week_start(), Weekday::Mon);
        assert_eq!(Locale::Ar.week_start(), Weekday::Sat);
    }

    #[test]
    fn arabic_digits_are_shaped() {
        assert_eq!(Locale::Ar.digits(1446), "١٤٤٦");
        assert_eq!(Locale::Fr.digits(1446), "1446");
    }

    #[test]
    fn month_title_uses_locale_names() {
        assert_eq!(Locale::EnUs.format_month_title(2025, 2), "February 2025");
        assert_eq!(Locale::Fr.format_month_title(2025, 8), "août 2025");
        assert_eq!(Locale::EnUs.month_name(13), "");
    }

    #[test]
    fn long_date_in_english() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(Locale::EnUs.format_long_date(date), "Saturday, March 1, 2025");
        assert_eq!(Locale::Fr.format_long_date(date), "1 mars 2025");
    }
}
