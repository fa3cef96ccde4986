use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    config::Settings,
    listener::ConfigListener,
    model::{Units, WeatherData, WeatherRequest},
    provider::WeatherProvider,
    sink::ResultSink,
};

/// Deliberately long poll cadence: current conditions for a widget, not a
/// live forecast feed.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 3600);

#[derive(Debug)]
pub(crate) enum Command {
    SetUnits(Units),
    SetCity(String),
    Stop,
}

/// Drives the repeating fetch-then-wait cycle for one provider instance.
///
/// All mutable state (city, units, cached snapshot) lives inside the spawned
/// task; configuration changes and stop requests are marshalled in through a
/// channel, so fetches, deliveries, and reconfiguration are serialized and at
/// most one fetch is ever in flight.
pub struct RefreshScheduler {
    provider: Box<dyn WeatherProvider>,
    sink: Box<dyn ResultSink>,
    city: String,
    units: Units,
    interval: Duration,
    cached: Option<WeatherData>,
    stopped: Arc<AtomicBool>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl RefreshScheduler {
    /// Spawn the refresh task: one immediate fetch attempt, then one attempt
    /// per `interval` until stopped.
    pub fn spawn(
        provider: Box<dyn WeatherProvider>,
        sink: Box<dyn ResultSink>,
        settings: Settings,
        interval: Duration,
    ) -> SchedulerHandle {
        let stopped = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::unbounded_channel();

        let scheduler = RefreshScheduler {
            provider,
            sink,
            city: settings.city,
            units: settings.units,
            interval,
            cached: None,
            stopped: Arc::clone(&stopped),
            commands: rx,
        };

        let task = tokio::spawn(scheduler.run());

        SchedulerHandle { stopped, commands: tx, task }
    }

    async fn run(mut self) {
        debug!(
            city = %self.city,
            interval_secs = self.interval.as_secs(),
            "refresh loop starting"
        );

        while !self.is_stopped() {
            self.tick().await;
            if self.is_stopped() {
                break;
            }
            if !self.wait_for_next_cycle().await {
                break;
            }
        }

        debug!("refresh loop exited");
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// One fetch cycle. Guaranteed no-op once the scheduler has been stopped,
    /// even if the cycle was already queued when stop landed.
    async fn tick(&mut self) {
        if self.is_stopped() {
            return;
        }

        let request = WeatherRequest { city: self.city.clone(), units: self.units };
        match self.provider.fetch_current_weather(&request).await {
            Ok(data) => {
                // stop may have landed while the fetch was in flight
                if self.is_stopped() {
                    return;
                }
                self.sink.on_data(&data);
                self.cached = Some(data);
            }
            Err(err) => {
                warn!(error = %err, city = %request.city, "weather fetch failed, retrying next cycle");
                self.sink.on_fetch_error(&err);
            }
        }
    }

    /// Wait out one interval, applying configuration changes as they arrive.
    /// Returns false when the loop should exit.
    async fn wait_for_next_cycle(&mut self) -> bool {
        let deadline = tokio::time::sleep(self.interval);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => return true,
                cmd = self.commands.recv() => match cmd {
                    Some(Command::SetUnits(units)) => self.apply_units(units),
                    Some(Command::SetCity(city)) => self.city = city,
                    // a dropped handle can never be stopped again, so a
                    // closed channel counts as stop
                    Some(Command::Stop) | None => {
                        self.stopped.store(true, Ordering::SeqCst);
                        return false;
                    }
                },
            }
        }
    }

    /// A units change re-renders the cached snapshot; it never fetches. With
    /// nothing cached yet the new setting is only stored.
    fn apply_units(&mut self, units: Units) {
        self.units = units;
        if let Some(cached) = self.cached.take() {
            let data = cached.with_units(units);
            self.sink.on_data(&data);
            self.cached = Some(data);
        }
    }
}

/// Owner-side handle to a spawned [`RefreshScheduler`].
pub struct SchedulerHandle {
    stopped: Arc<AtomicBool>,
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the scheduler. The stopped state is visible immediately, so a
    /// cycle that was already queued does no further work; stopping is
    /// terminal and idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        // wake the task so it exits without waiting out the interval
        let _ = self.commands.send(Command::Stop);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Handle for feeding configuration changes into the running scheduler.
    pub fn config_listener(&self) -> ConfigListener {
        ConfigListener::new(self.commands.clone())
    }

    /// Stop and wait for the refresh task to wind down.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.task.await;
    }
}
