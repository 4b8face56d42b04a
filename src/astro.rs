use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AstroError {
    #[error("Failed to read astro file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse astro file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("House {name:?} lists {signs} zodiac signs but {days} day counts")]
    MismatchedZodiac { name: String, signs: usize, days: usize },
}

/// One entry of the seed file, in the file's snake_case shape. File order is
/// the display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAstroHouse {
    pub season: String,
    pub common_name: String,
    #[serde(default)]
    pub english_name: Option<String>,
    pub start_date: String,
    pub star_name: String,
    pub star_days: u32,
    #[serde(default, rename = "zodiac_sign")]
    pub zodiac_signs: Option<Vec<String>>,
    #[serde(default)]
    pub zodiac_days: Option<Vec<u32>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A stored house. `id` follows seed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AstroHouse {
    pub id: i64,
    pub season: String,
    pub common_name: String,
    pub english_name: Option<String>,
    pub start_date: String,
    pub star_name: String,
    pub star_days: u32,
    pub zodiac_signs: Vec<String>,
    pub zodiac_days: Vec<u32>,
    pub notes: Option<String>,
}

impl AstroHouse {
    /// `"Capricorn (5 days), Aquarius (8 days)"`, or `None` without signs.
    pub fn zodiac_summary(&self) -> Option<String> {
        if self.zodiac_signs.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .zodiac_signs
            .iter()
            .enumerate()
            .map(|(i, sign)| match self.zodiac_days.get(i) {
                Some(days) => format!("{} ({} days)", sign, days),
                None => format!("{} (? days)", sign),
            })
            .collect();
        Some(parts.join(", "))
    }
}

pub fn parse_astro_houses(content: &str) -> Result<Vec<NewAstroHouse>, AstroError> {
    let houses: Vec<NewAstroHouse> = serde_json::from_str(content)?;
    for house in &houses {
        let signs = house.zodiac_signs.as_ref().map_or(0, Vec::len);
        let days = house.zodiac_days.as_ref().map_or(0, Vec::len);
        if signs != days {
            return Err(AstroError::MismatchedZodiac {
                name: house.common_name.clone(),
                signs,
                days,
            });
        }
    }
    Ok(houses)
}

pub fn load_astro_houses(path: &Path) -> Result<Vec<NewAstroHouse>, AstroError> {
    let content = std::fs::read_to_string(path)?;
    parse_astro_houses(&content)
}
