use tokio::sync::mpsc;

use crate::model::Units;
use crate::scheduler::Command;

/// Applies external configuration changes to a running scheduler, one typed
/// method per recognized setting.
///
/// Provider selection is deliberately absent: exactly one provider instance
/// is live per scheduler, so switching providers means rebuilding the
/// scheduler with a new instance.
#[derive(Debug, Clone)]
pub struct ConfigListener {
    commands: mpsc::UnboundedSender<Command>,
}

impl ConfigListener {
    pub(crate) fn new(commands: mpsc::UnboundedSender<Command>) -> Self {
        Self { commands }
    }

    /// Switch unit systems. The cached snapshot, if any, is re-rendered under
    /// the new units without a network fetch.
    pub fn on_units_changed(&self, units: Units) {
        let _ = self.commands.send(Command::SetUnits(units));
    }

    /// Change the city. Takes effect on the next scheduled fetch; edits made
    /// keystroke-by-keystroke in a settings UI never burst out requests.
    pub fn on_city_changed(&self, city: impl Into<String>) {
        let _ = self.commands.send(Command::SetCity(city.into()));
    }
}
