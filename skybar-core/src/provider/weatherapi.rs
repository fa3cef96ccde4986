use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{WeatherData, WeatherRequest},
};

use super::WeatherProvider;

const PROVIDER: &str = "weatherapi";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    code: i64,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: u8,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn fetch_current_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherData, FetchError> {
        let url = "http://api.weatherapi.com/v1/current.json";

        let res = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("q", request.city.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport { provider: PROVIDER, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { provider: PROVIDER, source })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                provider: PROVIDER,
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: WaResponse = serde_json::from_str(&body)
            .map_err(|source| FetchError::Payload { provider: PROVIDER, source })?;

        let ts = parsed.current.last_updated_epoch.or(parsed.location.localtime_epoch);
        let observation_time = ts.and_then(unix_to_utc).unwrap_or_else(Utc::now);

        let location_name = format!("{}, {}", parsed.location.name, parsed.location.country);

        Ok(WeatherData {
            provider: PROVIDER.to_string(),
            location_name,
            temperature_c: parsed.current.temp_c,
            units: request.units,
            // WeatherAPI identifies conditions by numeric code; keep it opaque.
            icon: parsed.current.condition.code.to_string(),
            condition: parsed.current.condition.text,
            humidity_pct: parsed.current.humidity,
            observation_time,
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_response_maps_to_snapshot_fields() {
        let body = r#"{
            "location": {
                "name": "Lucerne",
                "country": "Switzerland",
                "localtime_epoch": 1700000100
            },
            "current": {
                "temp_c": 14.2,
                "humidity": 70,
                "condition": { "text": "Partly cloudy", "code": 1003 },
                "last_updated_epoch": 1700000000
            }
        }"#;

        let parsed: WaResponse = serde_json::from_str(body).expect("valid payload");
        assert_eq!(parsed.location.name, "Lucerne");
        assert_eq!(parsed.current.condition.code, 1003);
        assert_eq!(parsed.current.last_updated_epoch, Some(1700000000));
    }

    #[test]
    fn epoch_fields_are_optional() {
        let body = r#"{
            "location": { "name": "Lucerne", "country": "Switzerland" },
            "current": {
                "temp_c": 14.2,
                "humidity": 70,
                "condition": { "text": "Partly cloudy", "code": 1003 }
            }
        }"#;

        let parsed: WaResponse = serde_json::from_str(body).expect("valid payload");
        assert!(parsed.current.last_updated_epoch.is_none());
        assert!(parsed.location.localtime_epoch.is_none());
    }
}
