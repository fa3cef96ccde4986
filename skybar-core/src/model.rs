use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit system used when rendering a weather snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Parse a stored units value. Anything other than "imperial" means
    /// metric, so the parse is total over arbitrary input.
    pub fn parse(value: &str) -> Units {
        if value.eq_ignore_ascii_case("imperial") {
            Units::Imperial
        } else {
            Units::Metric
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the scheduler hands a provider for one fetch cycle.
#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub city: String,
    pub units: Units,
}

/// One immutable weather snapshot, produced by a successful provider fetch.
///
/// The temperature is always stored in Celsius; `units` only tags how the
/// snapshot should be rendered. Switching unit systems is therefore a local
/// re-render, never a new fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherData {
    pub provider: String,
    pub location_name: String,
    pub temperature_c: f64,
    pub units: Units,
    /// Opaque icon identifier, e.g. OpenWeather's "01d". Rendering it is the
    /// consumer's concern.
    pub icon: String,
    pub condition: String,
    pub humidity_pct: u8,
    pub observation_time: DateTime<Utc>,
}

impl WeatherData {
    /// The same snapshot re-tagged for a different unit system.
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Temperature in the snapshot's display units.
    pub fn temperature(&self) -> f64 {
        match self.units {
            Units::Metric => self.temperature_c,
            Units::Imperial => self.temperature_c * 9.0 / 5.0 + 32.0,
        }
    }

    /// Rendered temperature, e.g. "20°C" or "68°F".
    pub fn temperature_string(&self) -> String {
        let symbol = match self.units {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        };
        format!("{:.0}{symbol}", self.temperature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(temp_c: f64, units: Units) -> WeatherData {
        WeatherData {
            provider: "openweather".to_string(),
            location_name: "Lucerne, CH".to_string(),
            temperature_c: temp_c,
            units,
            icon: "01d".to_string(),
            condition: "clear sky".to_string(),
            humidity_pct: 40,
            observation_time: Utc::now(),
        }
    }

    #[test]
    fn units_parse_is_total() {
        assert_eq!(Units::parse("imperial"), Units::Imperial);
        assert_eq!(Units::parse("IMPERIAL"), Units::Imperial);
        assert_eq!(Units::parse("metric"), Units::Metric);
        assert_eq!(Units::parse("garbage"), Units::Metric);
        assert_eq!(Units::parse(""), Units::Metric);
    }

    #[test]
    fn metric_rendering() {
        let data = snapshot(20.4, Units::Metric);
        assert_eq!(data.temperature_string(), "20°C");
    }

    #[test]
    fn imperial_rendering_converts_locally() {
        let data = snapshot(20.0, Units::Metric).with_units(Units::Imperial);
        assert_eq!(data.temperature(), 68.0);
        assert_eq!(data.temperature_string(), "68°F");
        // the canonical reading is untouched
        assert_eq!(data.temperature_c, 20.0);
    }

    #[test]
    fn with_units_round_trip() {
        let data = snapshot(-5.0, Units::Imperial).with_units(Units::Metric);
        assert_eq!(data.temperature_string(), "-5°C");
    }
}
