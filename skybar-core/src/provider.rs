use crate::{
    Config, FetchError, WeatherData, WeatherRequest,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;
pub mod weatherapi;

/// Identity of a pluggable weather provider.
///
/// Selection is by numeric id in the settings store; the string form names
/// the provider's section in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderId {
    #[default]
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    /// Numeric id as stored in the settings store.
    pub fn index(&self) -> u8 {
        match self {
            ProviderId::OpenWeather => 0,
            ProviderId::WeatherApi => 1,
        }
    }

    pub fn from_index(index: u8) -> anyhow::Result<ProviderId> {
        match index {
            0 => Ok(ProviderId::OpenWeather),
            1 => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider id '{index}'. Supported ids: 0 (openweather), 1 (weatherapi)."
            )),
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

/// A source of current weather conditions.
///
/// Implementations are stateless with respect to the request: city and units
/// arrive with every call, so a settings change simply shows up in the next
/// fetch.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherData, FetchError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `skybar configure {id}` and enter your API key."
        )
    })?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => Box::new(OpenWeatherProvider::new(api_key.to_owned())),
        ProviderId::WeatherApi => Box::new(WeatherApiProvider::new(api_key.to_owned())),
    };

    Ok(boxed)
}

/// Construct the selected provider from config, using the stored numeric id.
pub fn configured_provider(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.provider_id()?;
    provider_from_config(id, config)
}
