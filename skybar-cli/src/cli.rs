use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};

use skybar_core::{
    Config, DEFAULT_REFRESH_INTERVAL, FetchError, ProviderId, RefreshScheduler, ResultSink,
    WeatherData, WeatherRequest, provider,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skybar", version, about = "Weather widget CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        /// Prompts for a choice when omitted.
        provider: Option<String>,
    },

    /// Show current weather once and exit.
    Show {
        /// City, e.g. "Lucerne, CH". Defaults to the configured city.
        city: Option<String>,

        /// "metric" or "imperial". Defaults to the configured units.
        #[arg(long)]
        units: Option<String>,
    },

    /// Keep refreshing on the widget schedule, printing each update, until
    /// Ctrl-C.
    Watch {
        /// Override the refresh interval (seconds).
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(provider),
            Command::Show { city, units } => show(city, units).await,
            Command::Watch { interval_secs } => watch(interval_secs).await,
        }
    }
}

fn configure(provider: Option<String>) -> anyhow::Result<()> {
    let id = match provider {
        Some(name) => ProviderId::try_from(name.as_str())?,
        None => inquire::Select::new("Provider:", ProviderId::all().to_vec())
            .prompt()
            .context("Provider selection aborted")?,
    };

    let api_key = inquire::Password::new("API key:")
        .without_confirmation()
        .prompt()
        .context("API key entry aborted")?;

    let mut config = Config::load()?;
    config.upsert_provider_api_key(id, api_key);
    config.save()?;

    println!("Saved credentials for '{id}' to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: Option<String>, units: Option<String>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut settings = config.settings()?;

    if let Some(city) = city {
        settings.city = city;
    }
    if let Some(units) = units {
        settings.units = skybar_core::Units::parse(&units);
    }

    let provider = provider::configured_provider(&config)?;
    let request = WeatherRequest { city: settings.city, units: settings.units };
    let data = provider.fetch_current_weather(&request).await?;

    print_snapshot(&data);
    Ok(())
}

async fn watch(interval_secs: Option<u64>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let settings = config.settings()?;
    let provider = provider::configured_provider(&config)?;

    let interval = interval_secs.map_or(DEFAULT_REFRESH_INTERVAL, Duration::from_secs);

    println!(
        "Watching weather for {} (every {} seconds, Ctrl-C to stop)",
        settings.city,
        interval.as_secs()
    );

    let handle = RefreshScheduler::spawn(provider, Box::new(ConsoleSink), settings, interval);

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    handle.shutdown().await;

    println!("Stopped.");
    Ok(())
}

fn print_snapshot(data: &WeatherData) {
    let observed = data.observation_time.with_timezone(&Local);
    println!("{} ({})", data.location_name, data.provider);
    println!("  {}  {}", data.temperature_string(), data.condition);
    println!("  humidity: {}%", data.humidity_pct);
    println!("  observed: {}", observed.format("%Y-%m-%d %H:%M"));
}

/// Prints each refresh as a single line, widget-style.
struct ConsoleSink;

impl ResultSink for ConsoleSink {
    fn on_data(&self, data: &WeatherData) {
        let observed = data.observation_time.with_timezone(&Local);
        println!(
            "[{}] {}  {}  {} ({}% humidity)",
            observed.format("%H:%M"),
            data.location_name,
            data.temperature_string(),
            data.condition,
            data.humidity_pct
        );
    }

    fn on_fetch_error(&self, err: &FetchError) {
        eprintln!("fetch failed: {err}");
    }
}
