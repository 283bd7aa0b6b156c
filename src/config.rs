use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::owm::BASE_URL;
use crate::weather::{Location, Units};

const API_KEY_PLACEHOLDER: &str = "YOUR_OPENWEATHERMAP_API_KEY";
const API_KEY_ENV: &str = "OWM_API_KEY";

/// A single problem found while validating the config.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default = "default_cities")]
    pub cities: Vec<Location>,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// OpenWeatherMap credential. `OWM_API_KEY` takes precedence.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl ApiConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != API_KEY_PLACEHOLDER
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Name of the city shown at start-up
    pub default_city: Option<String>,

    #[serde(default)]
    pub night: bool,

    #[serde(default)]
    pub units: Units,

    /// 0 disables periodic refresh
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_city: None,
            night: false,
            units: Units::Metric,
            refresh_minutes: default_refresh_minutes(),
        }
    }
}

fn default_api_key() -> String {
    API_KEY_PLACEHOLDER.to_string()
}

fn default_base_url() -> String {
    BASE_URL.to_string()
}

fn default_refresh_minutes() -> u32 {
    15
}

fn default_cities() -> Vec<Location> {
    vec![
        Location::new("Muzaffarpur", 26.1209, 85.3647),
        Location::new("New Delhi", 28.6139, 77.2090),
        Location::new("Mumbai", 19.0760, 72.8777),
        Location::new("Bengaluru", 12.9716, 77.5946),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cities: default_cities(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("citywx").join("config.toml"))
    }

    /// Loads the config from `path`, or from the default location. A missing
    /// default file is created with defaults; a missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::read(&path)?
                } else {
                    let config = Self::default();
                    config.save(&path)?;
                    tracing::info!("Wrote default config to {}", path.display());
                    config
                }
            }
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.api.api_key = key;
            }
        }

        Ok(config)
    }

    /// Rejects a config with validation errors; warnings are logged.
    pub fn check(&self) -> Result<()> {
        let validation = self.validate();
        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }
        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !self.api.is_configured() {
            result.add_warning(
                "api.api_key",
                format!("API key not configured - set it in the config or {API_KEY_ENV}"),
            );
        }

        if let Err(e) = Url::parse(&self.api.base_url) {
            result.add_error("api.base_url", format!("Invalid URL: {e}"));
        }

        if self.cities.is_empty() {
            result.add_error("cities", "At least one city is required");
        }
        for (i, city) in self.cities.iter().enumerate() {
            if !(-90.0..=90.0).contains(&city.latitude) {
                result.add_error(
                    format!("cities[{i}].latitude"),
                    format!("{} is outside [-90, 90]", city.latitude),
                );
            }
            if !(-180.0..=180.0).contains(&city.longitude) {
                result.add_error(
                    format!("cities[{i}].longitude"),
                    format!("{} is outside [-180, 180]", city.longitude),
                );
            }
        }

        if let Some(name) = &self.ui.default_city {
            if self.city_index(name).is_none() {
                result.add_warning(
                    "ui.default_city",
                    format!("Unknown city {name:?}, using {}", self.first_city_name()),
                );
            }
        }

        if self.ui.refresh_minutes > 1440 {
            result.add_warning(
                "ui.refresh_minutes",
                "Refresh interval is more than 24 hours",
            );
        }

        result
    }

    /// Case-insensitive lookup by city name.
    pub fn city_index(&self, name: &str) -> Option<usize> {
        self.cities
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn start_city(&self) -> usize {
        self.ui
            .default_city
            .as_deref()
            .and_then(|name| self.city_index(name))
            .unwrap_or(0)
    }

    fn first_city_name(&self) -> &str {
        self.cities.first().map(|c| c.name.as_str()).unwrap_or("--")
    }
}
