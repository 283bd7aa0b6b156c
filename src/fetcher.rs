//! Runs the two provider calls for a city selection off the UI thread.
//! Results come back on an mpsc channel tagged with the selection they
//! belong to.

use std::sync::mpsc::Sender;
use std::thread;

use reqwest::blocking::Client;

use crate::owm::{self, Endpoint, FetchError};
use crate::weather::{CurrentWeather, ForecastSample, Location};

/// Identifies one city selection. A new tag is minted for every selection
/// and refresh; messages carrying an older tag are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub generation: u64,
    pub city: usize,
}

#[derive(Debug)]
pub enum FetchMessage {
    Current {
        selection: Selection,
        result: Result<CurrentWeather, FetchError>,
    },
    Forecast {
        selection: Selection,
        result: Result<Vec<ForecastSample>, FetchError>,
    },
}

impl FetchMessage {
    pub fn selection(&self) -> Selection {
        match self {
            FetchMessage::Current { selection, .. } | FetchMessage::Forecast { selection, .. } => {
                *selection
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    endpoint: Endpoint,
}

impl Fetcher {
    pub fn new(endpoint: Endpoint) -> Result<Self, FetchError> {
        Ok(Self {
            client: owm::client()?,
            endpoint,
        })
    }

    /// Starts both requests; neither waits on the other.
    pub fn request(&self, selection: Selection, location: &Location, tx: &Sender<FetchMessage>) {
        tracing::debug!(
            city = %location.name,
            generation = selection.generation,
            "requesting weather"
        );

        let (client, endpoint, loc, tx_current) = (
            self.client.clone(),
            self.endpoint.clone(),
            location.clone(),
            tx.clone(),
        );
        thread::spawn(move || {
            let result = owm::current::Response::from_location(&client, &endpoint, &loc)
                .map(owm::current::Response::into_current);
            if let Err(e) = &result {
                tracing::warn!(city = %loc.name, error = %e, "current weather request failed");
            }
            let _ = tx_current.send(FetchMessage::Current { selection, result });
        });

        let (client, endpoint, loc, tx_forecast) = (
            self.client.clone(),
            self.endpoint.clone(),
            location.clone(),
            tx.clone(),
        );
        thread::spawn(move || {
            let result = owm::forecast::Response::from_location(&client, &endpoint, &loc)
                .map(owm::forecast::Response::into_samples);
            if let Err(e) = &result {
                tracing::warn!(city = %loc.name, error = %e, "forecast request failed");
            }
            let _ = tx_forecast.send(FetchMessage::Forecast { selection, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(flavor = "multi_thread")]
    async fn test_one_failure_does_not_block_the_other() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(
                    r#"{"list": [{"dt": 1717502400, "main": {"temp": 30.1}, "weather": [{"icon": "01d"}]}]}"#,
                ),
            )
            .mount(&server)
            .await;

        let endpoint = Endpoint::new(&server.uri(), "secret");
        let messages = tokio::task::spawn_blocking(move || {
            let fetcher = Fetcher::new(endpoint).unwrap();
            let (tx, rx) = mpsc::channel();
            let selection = Selection {
                generation: 7,
                city: 2,
            };
            fetcher.request(selection, &Location::new("Mumbai", 19.076, 72.8777), &tx);
            let first = rx.recv_timeout(Duration::from_secs(10)).unwrap();
            let second = rx.recv_timeout(Duration::from_secs(10)).unwrap();
            vec![first, second]
        })
        .await
        .unwrap();

        assert!(messages.iter().all(|m| m.selection().generation == 7));
        let mut saw_current = false;
        let mut saw_forecast = false;
        for message in messages {
            match message {
                FetchMessage::Current { result, .. } => {
                    saw_current = true;
                    assert!(matches!(result, Err(FetchError::Status(_))));
                }
                FetchMessage::Forecast { result, .. } => {
                    saw_forecast = true;
                    assert_eq!(result.unwrap().len(), 1);
                }
            }
        }
        assert!(saw_current && saw_forecast);
    }
}
