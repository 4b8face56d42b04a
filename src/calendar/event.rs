use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::visibility::{OwnedRecord, Owner};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub category: EventCategory,
    pub reminders: Vec<Reminder>,
    pub owner: Owner,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    National,
    Religious,
    Family,
    #[default]
    Personal,
    Other,
}

impl EventCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::National => "national",
            EventCategory::Religious => "religious",
            EventCategory::Family => "family",
            EventCategory::Personal => "personal",
            EventCategory::Other => "other",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "national" => Ok(EventCategory::National),
            "religious" => Ok(EventCategory::Religious),
            "family" => Ok(EventCategory::Family),
            "personal" => Ok(EventCategory::Personal),
            "other" => Ok(EventCategory::Other),
            _ => Err(format!("Unknown category '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes_before: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Push,
    Sms,
}

impl Event {
    pub fn is_public(&self) -> bool {
        self.owner == Owner::Public
    }
}

impl OwnedRecord for Event {
    fn owner(&self) -> &Owner {
        &self.owner
    }
}
