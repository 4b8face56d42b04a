use chrono::NaiveDate;
use thiserror::Error;

use super::definition::{HolidayDefinition, HolidayKind, MaterializedHoliday, RecurrenceRule};
use super::hijri::{HijriDate, LunarCalendar, format_hijri};
use crate::calendar::Locale;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MaterializeError {
    #[error("Invalid year range: {start}..={end}")]
    InvalidRange { start: i32, end: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterializeOptions {
    pub country_code: String,
    pub kind: HolidayKind,
    /// Extra lunar years scanned on each side of the Gregorian window.
    pub lunar_margin_years: u32,
    pub display_locale: Locale,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            country_code: "MA".to_string(),
            kind: HolidayKind::Religious,
            lunar_margin_years: 1,
            display_locale: Locale::Ar,
        }
    }
}

/// Concrete dates for every definition within `[start_year-01-01, end_year-12-31]`,
/// sorted by date. Definitions sharing a date keep their input order.
pub fn materialize(
    definitions: &[HolidayDefinition],
    start_year: i32,
    end_year: i32,
    options: &MaterializeOptions,
    calendar: &dyn LunarCalendar,
) -> Result<Vec<MaterializedHoliday>, MaterializeError> {
    let invalid = MaterializeError::InvalidRange { start: start_year, end: end_year };
    if start_year > end_year {
        return Err(invalid);
    }
    let window_start = NaiveDate::from_ymd_opt(start_year, 1, 1).ok_or(invalid.clone())?;
    let window_end = NaiveDate::from_ymd_opt(end_year, 12, 31).ok_or(invalid)?;

    let margin = options.lunar_margin_years as i32;
    let lunar_years =
        calendar.from_gregorian(window_start).year - margin..=calendar.from_gregorian(window_end).year + margin;

    tracing::info!(
        "Materializing {} definitions for {}..={} (lunar years {}..={})",
        definitions.len(),
        start_year,
        end_year,
        lunar_years.start(),
        lunar_years.end()
    );

    let mut holidays = Vec::new();
    for definition in definitions {
        let dates: Vec<NaiveDate> = match definition.rule {
            RecurrenceRule::Gregorian { month, day } => (start_year..=end_year)
                .filter_map(|year| {
                    let date = NaiveDate::from_ymd_opt(year, month, day);
                    if date.is_none() {
                        tracing::debug!("Skipping {}: {}-{:02}-{:02} does not exist", definition.name, year, month, day);
                    }
                    date
                })
                .collect(),
            RecurrenceRule::Lunar { month, day } => lunar_years
                .clone()
                .filter_map(|year| match calendar.to_gregorian(HijriDate::new(year, month, day)) {
                    Ok(date) => Some(date),
                    Err(e) => {
                        tracing::debug!("Skipping {}: {}", definition.name, e);
                        None
                    }
                })
                .collect(),
        };

        holidays.extend(
            dates
                .into_iter()
                .filter(|date| (window_start..=window_end).contains(date))
                .map(|date| MaterializedHoliday {
                    name: definition.name.clone(),
                    local_name: definition.local_name.clone(),
                    date,
                    country_code: options.country_code.clone(),
                    kind: options.kind.clone(),
                    description: definition.description.clone(),
                    hijri_date: Some(format_hijri(calendar.from_gregorian(date), options.display_locale)),
                }),
        );
    }

    holidays.sort_by_key(|holiday| holiday.date);

    tracing::info!("Materialized {} holidays", holidays.len());
    Ok(holidays)
}
