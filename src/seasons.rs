use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::calendar::EventCategory;
use crate::calendar::input::NewEvent;

pub const SEASON_SOURCE: &str = "season-seed";

#[derive(Debug, Error)]
pub enum SeasonError {
    #[error("Failed to read season file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse season file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Season {name:?} in {year} ends before it starts")]
    InvertedSeason { year: i32, name: SeasonName },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonName {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl SeasonName {
    pub fn label(self) -> &'static str {
        match self {
            SeasonName::Spring => "Spring",
            SeasonName::Summer => "Summer",
            SeasonName::Autumn => "Autumn",
            SeasonName::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub name: SeasonName,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Season {
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start_date..=self.end_date).contains(&date)
    }

    pub fn length_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Fraction of the season elapsed, 0 on the first day and 1 on the last.
    pub fn progress(&self, today: NaiveDate) -> f64 {
        let span = (self.end_date - self.start_date).num_days();
        if span <= 0 {
            return 1.0;
        }
        let elapsed = (today - self.start_date).num_days();
        (elapsed as f64 / span as f64).clamp(0.0, 1.0)
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days().max(0)
    }
}

/// Seasons keyed by the year in which they start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonTable {
    years: BTreeMap<String, Vec<Season>>,
}

impl SeasonTable {
    pub fn from_json(content: &str) -> Result<Self, SeasonError> {
        let table: SeasonTable = serde_json::from_str(content)?;
        for (year, seasons) in &table.years {
            if let Some(season) = seasons.iter().find(|s| s.end_date < s.start_date) {
                return Err(SeasonError::InvertedSeason {
                    year: year.parse().unwrap_or_default(),
                    name: season.name,
                });
            }
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, SeasonError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Astronomical seasons on their usual equinox and solstice dates. Winter
    /// runs into the following year.
    pub fn approximate(years: impl IntoIterator<Item = i32>) -> Self {
        let mut table = SeasonTable::default();
        for year in years {
            let seasons = [
                (SeasonName::Spring, (year, 3, 20), (year, 6, 20)),
                (SeasonName::Summer, (year, 6, 21), (year, 9, 21)),
                (SeasonName::Autumn, (year, 9, 22), (year, 12, 20)),
                (SeasonName::Winter, (year, 12, 21), (year + 1, 3, 19)),
            ]
            .into_iter()
            .filter_map(|(name, (sy, sm, sd), (ey, em, ed))| {
                Some(Season {
                    name,
                    start_date: NaiveDate::from_ymd_opt(sy, sm, sd)?,
                    end_date: NaiveDate::from_ymd_opt(ey, em, ed)?,
                })
            })
            .collect();
            table.years.insert(year.to_string(), seasons);
        }
        table
    }

    pub fn seasons(&self) -> impl Iterator<Item = &Season> + '_ {
        self.years.values().flatten()
    }

    /// Looks in `today`'s year and the one before, since winter straddles
    /// the new year.
    pub fn current_season(&self, today: NaiveDate) -> Option<&Season> {
        let year = today.year();
        [year, year - 1]
            .iter()
            .filter_map(|y| self.years.get(&y.to_string()))
            .flatten()
            .find(|season| season.contains(today))
    }
}

/// All-day public events marking the first day of each season.
pub fn season_start_events(table: &SeasonTable) -> Vec<NewEvent> {
    table
        .seasons()
        .filter_map(|season| {
            let start = season.start_date.and_hms_opt(0, 0, 0)?.and_utc();
            let end: DateTime<Utc> = season.start_date.succ_opt()?.and_hms_opt(0, 0, 0)?.and_utc();
            Some(NewEvent {
                title: format!("{} Starts", season.name.label()),
                description: Some(format!(
                    "{} runs until {}.",
                    season.name.label(),
                    season.end_date.format("%Y-%m-%d")
                )),
                start,
                end,
                all_day: true,
                location: None,
                category: EventCategory::Other,
                reminders: vec![],
            })
        })
        .collect()
}
