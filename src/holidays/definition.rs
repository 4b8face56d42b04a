use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "calendar", rename_all = "lowercase")]
pub enum RecurrenceRule {
    Gregorian { month: u32, day: u32 },
    Lunar { month: u32, day: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayDefinition {
    pub name: String,
    pub local_name: String,
    pub rule: RecurrenceRule,
    pub description: String,
}

impl HolidayDefinition {
    pub fn lunar(name: &str, local_name: &str, month: u32, day: u32, description: &str) -> Self {
        Self {
            name: name.to_string(),
            local_name: local_name.to_string(),
            rule: RecurrenceRule::Lunar { month, day },
            description: description.to_string(),
        }
    }

    pub fn gregorian(name: &str, local_name: &str, month: u32, day: u32, description: &str) -> Self {
        Self {
            name: name.to_string(),
            local_name: local_name.to_string(),
            rule: RecurrenceRule::Gregorian { month, day },
            description: description.to_string(),
        }
    }
}

/// Tag stored alongside each holiday row. Re-seeding deletes by tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HolidayKind {
    Public,
    Religious,
    Season,
    Other(String),
}

impl HolidayKind {
    pub fn as_str(&self) -> &str {
        match self {
            HolidayKind::Public => "public",
            HolidayKind::Religious => "religious",
            HolidayKind::Season => "season",
            HolidayKind::Other(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "public" | "Public" => HolidayKind::Public,
            "religious" => HolidayKind::Religious,
            "season" => HolidayKind::Season,
            other => HolidayKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for HolidayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HolidayKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HolidayKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(HolidayKind::from_tag(&tag))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedHoliday {
    pub name: String,
    pub local_name: String,
    pub date: NaiveDate,
    pub country_code: String,
    #[serde(rename = "type")]
    pub kind: HolidayKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hijri_date: Option<String>,
}
