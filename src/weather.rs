use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn toggle(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }
}

/// A named place the user can pick from the city list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

/// Current conditions, temperature in degrees Celsius.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub icon: String,
}

/// One 3-hour forecast point.
#[derive(Clone, Debug, PartialEq)]
pub struct ForecastSample {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub temperature: f64,
    pub icon: String,
}

/// The sample chosen to represent a calendar day.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub sample: ForecastSample,
}

impl DailyForecast {
    /// Upper-case short weekday, e.g. `TUE`.
    pub fn weekday(&self) -> String {
        self.date.format("%a").to_string().to_uppercase()
    }
}

/// What the screen shows for one city. Each update produces a new snapshot;
/// fields are replaced whole, never merged.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub location: Location,
    pub current: Option<CurrentWeather>,
    pub daily: Vec<DailyForecast>,
}

impl Snapshot {
    pub fn empty(location: Location) -> Self {
        Self {
            location,
            current: None,
            daily: Vec::new(),
        }
    }

    pub fn relocated(&self, location: Location) -> Self {
        Self {
            location,
            ..self.clone()
        }
    }

    pub fn with_current(&self, current: CurrentWeather) -> Self {
        Self {
            current: Some(current),
            ..self.clone()
        }
    }

    pub fn with_daily(&self, daily: Vec<DailyForecast>) -> Self {
        Self {
            daily,
            ..self.clone()
        }
    }
}
