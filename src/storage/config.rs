use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calendar::{Locale, LocaleError};
use crate::holidays::nager::DEFAULT_BASE_URL;
use crate::visibility::Caller;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error(transparent)]
    Locale(#[from] LocaleError),
    #[error("Invalid first_day_of_week: {0}")]
    InvalidWeekday(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub general: GeneralConfig,
    pub ui: UiConfig,
    pub holidays: HolidaysConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    pub locale: String,
    pub country_code: String,
    pub database: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// `"locale"` or a weekday name such as `"Monday"`.
    pub first_day_of_week: String,
    pub date_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HolidaysConfig {
    pub nager_base_url: String,
    pub range_start_year: i32,
    pub range_end_year: i32,
    pub lunar_margin_years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default)]
    pub user: String,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        Self::load_or_create_at(&Self::config_path())
    }

    pub fn load_or_create_at(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            Ok(config)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taqwim")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn locale(&self) -> Result<Locale, ConfigError> {
        Ok(self.general.locale.parse()?)
    }

    pub fn week_start(&self) -> Result<Weekday, ConfigError> {
        let value = self.ui.first_day_of_week.trim();
        if value.eq_ignore_ascii_case("locale") {
            return Ok(self.locale()?.week_start());
        }
        value
            .parse::<Weekday>()
            .map_err(|_| ConfigError::InvalidWeekday(value.to_string()))
    }

    pub fn caller(&self) -> Caller {
        Caller::from_token(Some(&self.session.user))
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = Self::config_dir();

        Self {
            general: GeneralConfig {
                locale: "en-US".to_string(),
                country_code: "MA".to_string(),
                database: config_dir.join("taqwim.db"),
            },
            ui: UiConfig {
                first_day_of_week: "locale".to_string(),
                date_format: "%Y-%m-%d".to_string(),
            },
            holidays: HolidaysConfig {
                nager_base_url: DEFAULT_BASE_URL.to_string(),
                range_start_year: 2025,
                range_end_year: 2035,
                lunar_margin_years: 1,
                seasons_file: None,
            },
            session: SessionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::UserId;

    #[test]
    fn default_config_covers_2025_to_2035() {
        let config = Config::default();
        assert_eq!(config.holidays.range_start_year, 2025);
        assert_eq!(config.holidays.range_end_year, 2035);
    }

    #[test]
    fn default_week_start_follows_locale() {
        let config = Config::default();
        assert_eq!(config.week_start().unwrap(), Weekday::Sun);
    }

    #[test]
    fn default_caller_is_anonymous() {
        assert_eq!(Config::default().caller(), Caller::Anonymous);
    }

    #[test]
    fn parse_valid_toml_config() {
        let toml_content = r#"
            [general]
            locale = "fr-FR"
            country_code = "FR"
            database = "/tmp/taqwim.db"

            [ui]
            first_day_of_week = "locale"
            date_format = "%d/%m/%Y"

            [holidays]
            nager_base_url = "http://localhost:9000"
            range_start_year = 2024
            range_end_year = 2026
            lunar_margin_years = 2

            [session]
            user = "user-42"
        "#;

        let config = Config::from_toml(toml_content).unwrap();

        assert_eq!(config.locale().unwrap(), Locale::Fr);
        assert_eq!(config.week_start().unwrap(), Weekday::Mon);
        assert_eq!(config.holidays.lunar_margin_years, 2);
        assert_eq!(config.caller(), Caller::User(UserId::new("user-42")));
        assert_eq!(config.holidays.seasons_file, None);
    }

    #[test]
    fn explicit_weekday_overrides_locale() {
        let mut config = Config::default();
        config.ui.first_day_of_week = "Monday".to_string();
        assert_eq!(config.week_start().unwrap(), Weekday::Mon);

        config.ui.first_day_of_week = "Someday".to_string();
        assert!(matches!(config.week_start(), Err(ConfigError::InvalidWeekday(_))));
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid toml";
        let result = Config::from_toml(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn load_or_create_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create_at(&path).unwrap();
        assert!(path.exists());

        let loaded = Config::load_or_create_at(&path).unwrap();
        assert_eq!(created, loaded);
    }
}
