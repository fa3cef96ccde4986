use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{WeatherData, WeatherRequest},
};

use super::WeatherProvider;

const PROVIDER: &str = "openweather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherData, FetchError> {
        let url = "https://api.openweathermap.org/data/2.5/weather";

        // Always query metric; unit conversion is a render-time concern.
        let res = self
            .http
            .get(url)
            .query(&[
                ("q", request.city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
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

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|source| FetchError::Payload { provider: PROVIDER, source })?;

        let observation_time = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);

        let (condition, icon) = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        Ok(WeatherData {
            provider: PROVIDER.to_string(),
            location_name: parsed.name,
            temperature_c: parsed.main.temp,
            units: request.units,
            icon,
            condition,
            humidity_pct: parsed.main.humidity,
            observation_time,
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_response_maps_to_snapshot_fields() {
        let body = r#"{
            "name": "Lucerne",
            "dt": 1700000000,
            "main": { "temp": 20.0, "humidity": 55 },
            "weather": [ { "description": "clear sky", "icon": "01d" } ]
        }"#;

        let parsed: OwCurrentResponse = serde_json::from_str(body).expect("valid payload");
        assert_eq!(parsed.name, "Lucerne");
        assert_eq!(parsed.main.temp, 20.0);
        assert_eq!(parsed.weather[0].icon, "01d");
    }

    #[test]
    fn missing_weather_entry_is_tolerated() {
        let body = r#"{
            "name": "Lucerne",
            "dt": 1700000000,
            "main": { "temp": 3.5, "humidity": 81 },
            "weather": []
        }"#;

        let parsed: OwCurrentResponse = serde_json::from_str(body).expect("valid payload");
        assert!(parsed.weather.is_empty());
    }

    #[test]
    fn truncates_long_error_bodies() {
        let long = "x".repeat(500);
        let short = truncate_body(&long);
        assert!(short.len() <= 203);
        assert!(short.ends_with("..."));
    }
}
