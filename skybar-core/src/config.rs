use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::model::Units;
use crate::provider::ProviderId;

/// City shown when the settings store has no value.
pub const DEFAULT_CITY: &str = "Lucerne, CH";

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Resolved widget settings: every field is concrete, fallbacks applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub city: String,
    pub units: Units,
    pub provider: ProviderId,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            city: DEFAULT_CITY.to_string(),
            units: Units::Metric,
            provider: ProviderId::default(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// City shown in the widget; free text, passed through to the provider.
    pub city: Option<String>,

    /// "metric" or "imperial"; anything else reads as metric.
    pub units: Option<String>,

    /// Numeric provider id. 0 = openweather, 1 = weatherapi.
    pub provider: Option<u8>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// City with the documented fallback applied.
    pub fn city(&self) -> String {
        self.city.clone().unwrap_or_else(|| DEFAULT_CITY.to_string())
    }

    /// Units with the documented fallback (metric) applied.
    pub fn units(&self) -> Units {
        self.units.as_deref().map(Units::parse).unwrap_or_default()
    }

    /// Return the selected provider as a strongly-typed ProviderId.
    ///
    /// An absent value falls back to the default provider; a present but
    /// out-of-range id is an error.
    pub fn provider_id(&self) -> Result<ProviderId> {
        match self.provider {
            None => Ok(ProviderId::default()),
            Some(index) => ProviderId::from_index(index),
        }
    }

    /// All widget settings resolved in one go.
    pub fn settings(&self) -> Result<Settings> {
        Ok(Settings {
            city: self.city(),
            units: self.units(),
            provider: self.provider_id()?,
        })
    }

    pub fn has_provider(&self, id: ProviderId) -> bool {
        self.providers.contains_key(id.as_str())
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store the selected provider as its numeric id.
    pub fn set_provider(&mut self, id: ProviderId) {
        self.provider = Some(id.index());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skybar", "skybar")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Convenience helper: set/replace a provider API key and optionally make
    /// that provider the selected one.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.provider.is_none() {
            self.provider = Some(provider_id.index());
        }
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}
