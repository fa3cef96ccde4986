use crate::{error::FetchError, model::WeatherData};

/// Receives weather snapshots from the refresh scheduler.
///
/// Both callbacks run inline on the scheduler's own task, one at a time, so
/// implementations must not block for long: the next scheduling decision
/// waits on them.
pub trait ResultSink: Send + Sync {
    /// Called once per successful fetch, and once more whenever a units
    /// change re-renders the cached snapshot.
    fn on_data(&self, data: &WeatherData);

    /// Called when a fetch cycle fails. The scheduler retries on its normal
    /// cadence either way; most consumers can leave this as the no-op.
    fn on_fetch_error(&self, _err: &FetchError) {}
}
