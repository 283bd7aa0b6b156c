//! Reduces the 3-hourly forecast list to one entry per calendar day.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};

use crate::weather::{DailyForecast, ForecastSample};

/// Number of days shown after today.
pub const DAYS: usize = 5;

/// Buckets `samples` by calendar day in `tz`, drops the first (current,
/// usually partial) day and keeps the earliest sample of each of the next
/// [`DAYS`] days. Output is strictly increasing by date.
///
/// Samples whose timestamp cannot be represented in `tz` are ignored.
pub fn daily_forecast<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailyForecast> {
    let mut days: BTreeMap<NaiveDate, &ForecastSample> = BTreeMap::new();
    for sample in samples {
        let Some(local) = tz.timestamp_opt(sample.timestamp, 0).single() else {
            tracing::debug!(timestamp = sample.timestamp, "skipping unrepresentable sample");
            continue;
        };
        days.entry(local.date_naive())
            .and_modify(|first| {
                if sample.timestamp < first.timestamp {
                    *first = sample;
                }
            })
            .or_insert(sample);
    }

    days.into_iter()
        .skip(1)
        .take(DAYS)
        .map(|(date, sample)| DailyForecast {
            date,
            sample: sample.clone(),
        })
        .collect()
}
