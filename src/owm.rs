use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::weather::Location;

pub const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where requests go and the credential they carry.
#[derive(Clone, Debug)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: String,
}

impl Endpoint {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn url(&self, path: &str, location: &Location) -> Result<Url, FetchError> {
        let url = Url::parse_with_params(
            &format!("{}/{path}", self.base_url),
            &[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ],
        )?;
        Ok(url)
    }
}

#[derive(Deserialize, Debug)]
pub struct Main {
    pub temp: f64,
}

#[derive(Deserialize, Debug)]
pub struct Condition {
    pub icon: String,
}

fn first_icon(weather: &[Condition]) -> String {
    weather
        .first()
        .map(|c| c.icon.clone())
        .unwrap_or_default()
}

pub mod current {
    use super::*;
    use crate::weather::CurrentWeather;

    #[derive(Deserialize, Debug)]
    pub struct Response {
        pub main: Main,

        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    impl Response {
        pub fn from_location(
            client: &Client,
            endpoint: &Endpoint,
            location: &Location,
        ) -> Result<Self, FetchError> {
            get_web_json(client, endpoint.url("weather", location)?)
        }

        pub fn into_current(self) -> CurrentWeather {
            CurrentWeather {
                temperature: self.main.temp,
                icon: first_icon(&self.weather),
            }
        }
    }
}

pub mod forecast {
    use super::*;
    use crate::weather::ForecastSample;

    #[derive(Deserialize, Debug)]
    pub struct Response {
        pub list: Vec<Entry>,
    }

    impl Response {
        pub fn from_location(
            client: &Client,
            endpoint: &Endpoint,
            location: &Location,
        ) -> Result<Self, FetchError> {
            get_web_json(client, endpoint.url("forecast", location)?)
        }

        pub fn into_samples(self) -> Vec<ForecastSample> {
            self.list
                .into_iter()
                .map(|entry| ForecastSample {
                    timestamp: entry.dt,
                    temperature: entry.main.temp,
                    icon: first_icon(&entry.weather),
                })
                .collect()
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct Entry {
        pub dt: i64,

        pub main: Main,

        #[serde(default)]
        pub weather: Vec<Condition>,
    }
}

pub fn client() -> Result<Client, FetchError> {
    Ok(Client::builder().user_agent("citywx").build()?)
}

fn get_web_json<T: DeserializeOwned>(client: &Client, url: Url) -> Result<T, FetchError> {
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    let body = response.text()?;
    Ok(serde_json::from_str(&body)?)
}
