use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

use super::definition::{HolidayKind, MaterializedHoliday};

pub const DEFAULT_BASE_URL: &str = "https://date.nager.at/api/v3";

static COUNTRY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2}$").expect("country code pattern is valid"));

#[derive(Debug, Error)]
pub enum NagerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid country code: {0}")]
    InvalidCountryCode(String),
    #[error("Unknown country: {0}")]
    UnknownCountry(String),
    #[error("Request error: {0}")]
    Request(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicHoliday {
    date: NaiveDate,
    local_name: String,
    name: String,
    country_code: String,
    #[serde(default)]
    types: Vec<String>,
}

impl From<PublicHoliday> for MaterializedHoliday {
    fn from(holiday: PublicHoliday) -> Self {
        let kind = holiday
            .types
            .first()
            .map(|tag| HolidayKind::from_tag(tag))
            .unwrap_or(HolidayKind::Public);
        MaterializedHoliday {
            name: holiday.name,
            local_name: holiday.local_name.clone(),
            date: holiday.date,
            country_code: holiday.country_code,
            kind,
            description: holiday.local_name,
            hijri_date: None,
        }
    }
}

#[async_trait]
pub trait PublicHolidaySource {
    async fn fetch(&self, year: i32, country_code: &str) -> Result<Vec<MaterializedHoliday>, NagerError>;
}

pub struct NagerClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for NagerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NagerClient {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

pub fn normalize_country_code(code: &str) -> Result<String, NagerError> {
    let code = code.trim();
    if !COUNTRY_CODE.is_match(code) {
        return Err(NagerError::InvalidCountryCode(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

#[async_trait]
impl PublicHolidaySource for NagerClient {
    async fn fetch(&self, year: i32, country_code: &str) -> Result<Vec<MaterializedHoliday>, NagerError> {
        let country_code = normalize_country_code(country_code)?;
        let url = format!("{}/PublicHolidays/{}/{}", self.base_url, year, country_code);

        tracing::info!("Fetching public holidays for {} in {}", country_code, year);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        tracing::info!("Public holidays response status: {}", status);

        if status == 404 {
            tracing::error!("Unknown country: {}", country_code);
            return Err(NagerError::UnknownCountry(country_code));
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed to fetch holidays. Status: {}, Body: {}", status, body);
            return Err(NagerError::Request(format!("Status {}: {}", status, body)));
        }

        let holidays: Vec<PublicHoliday> = response.json().await?;
        let holidays: Vec<MaterializedHoliday> = holidays.into_iter().map(Into::into).collect();

        tracing::info!("Fetched {} public holidays", holidays.len());
        Ok(holidays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_has_default_base_url() {
        let client = NagerClient::new();

        assert_eq!(client.base_url(), "https://date.nager.at/api/v3");
    }

    #[test]
    fn custom_base_url_drops_trailing_slash() {
        let client = NagerClient::new().with_base_url("http://localhost:8080/");

        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn country_code_is_uppercased() {
        assert_eq!(normalize_country_code(" ma ").unwrap(), "MA");
    }

    #[test]
    fn country_code_must_be_two_letters() {
        assert!(matches!(normalize_country_code("MAR"), Err(NagerError::InvalidCountryCode(_))));
        assert!(matches!(normalize_country_code("M1"), Err(NagerError::InvalidCountryCode(_))));
    }

    #[test]
    fn kind_comes_from_first_type() {
        let raw = r#"{"date":"2025-07-30","localName":"عيد العرش","name":"Throne Day",
            "countryCode":"MA","fixed":true,"global":true,"counties":null,
            "launchYear":null,"types":["Public","Bank"]}"#;
        let holiday: MaterializedHoliday = serde_json::from_str::<PublicHoliday>(raw).unwrap().into();

        assert_eq!(holiday.kind, HolidayKind::Public);
        assert_eq!(holiday.description, "عيد العرش");
        assert_eq!(holiday.date, NaiveDate::from_ymd_opt(2025, 7, 30).unwrap());
    }

    #[test]
    fn missing_types_default_to_public() {
        let raw = r#"{"date":"2025-01-01","localName":"Nouvel an","name":"New Year's Day","countryCode":"FR"}"#;
        let holiday: MaterializedHoliday = serde_json::from_str::<PublicHoliday>(raw).unwrap().into();

        assert_eq!(holiday.kind, HolidayKind::Public);
    }
}
