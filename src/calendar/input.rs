//! Boundary validation for event and todo payloads.
//!
//! Drafts mirror what a form or JSON body carries: loosely typed strings.
//! Nothing downstream of [`Draft::validate`] sees an unvalidated value.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::event::{EventCategory, Reminder, ReminderMethod};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reminders: Vec<ReminderDraft>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderDraft {
    pub method: String,
    pub minutes_before: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_done: Option<bool>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Draft {
    Event(EventDraft),
    Todo(TodoDraft),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub category: EventCategory,
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub is_done: bool,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidDraft {
    Event(NewEvent),
    Todo(NewTodo),
}

impl Draft {
    pub fn from_json(payload: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(payload).map_err(|e| ValidationError::new("payload", e.to_string()))
    }

    pub fn validate(self) -> Result<ValidDraft, ValidationError> {
        match self {
            Draft::Event(draft) => draft.validate().map(ValidDraft::Event),
            Draft::Todo(draft) => draft.validate().map(ValidDraft::Todo),
        }
    }
}

impl EventDraft {
    pub fn validate(self) -> Result<NewEvent, ValidationError> {
        let title = required_title(&self.title)?;
        let start = parse_timestamp("start", &self.start)?;
        let end = parse_timestamp("end", &self.end)?;
        if start >= end {
            return Err(ValidationError::new("end", "End time must be after start time"));
        }

        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => EventCategory::default(),
            Some(name) => name
                .parse()
                .map_err(|message: String| ValidationError::new("category", message))?,
        };

        let reminders = self
            .reminders
            .iter()
            .enumerate()
            .map(|(i, reminder)| reminder.validate(i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewEvent {
            title,
            description: non_blank(self.description),
            start,
            end,
            all_day: self.all_day,
            location: non_blank(self.location),
            category,
            reminders,
        })
    }
}

impl ReminderDraft {
    fn validate(&self, index: usize) -> Result<Reminder, ValidationError> {
        let method = match self.method.as_str() {
            "email" => ReminderMethod::Email,
            "push" => ReminderMethod::Push,
            "sms" => ReminderMethod::Sms,
            other => {
                return Err(ValidationError::new(
                    format!("reminders[{index}].method"),
                    format!("Unknown reminder method '{other}'"),
                ));
            }
        };

        if self.minutes_before <= 0 {
            return Err(ValidationError::new(
                format!("reminders[{index}].minutes_before"),
                "Minutes must be positive",
            ));
        }
        let minutes_before = u32::try_from(self.minutes_before).map_err(|_| {
            ValidationError::new(format!("reminders[{index}].minutes_before"), "Minutes out of range")
        })?;

        Ok(Reminder { method, minutes_before })
    }
}

impl TodoDraft {
    pub fn validate(self) -> Result<NewTodo, ValidationError> {
        let title = required_title(&self.title)?;
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(parse_timestamp("date", text)?),
        };

        Ok(NewTodo {
            title,
            description: non_blank(self.description),
            is_done: self.is_done.unwrap_or(false),
            date,
        })
    }
}

pub fn parse_iso_date(field: &str, text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::new(field, format!("'{}' is not a YYYY-MM-DD date", text)))
}

/// Accepts RFC 3339 timestamps, or plain dates taken as midnight UTC.
pub fn parse_timestamp(field: &str, text: &str) -> Result<DateTime<Utc>, ValidationError> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    parse_iso_date(field, text)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::new(field, format!("'{}' is not a valid timestamp", text)))
}

fn required_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("title", "Title is required"));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
