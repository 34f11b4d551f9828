// Controller state and the fan-out trigger

use super::{ConnectionRegistry, Settings};
use parking_lot::Mutex;

/// Owns the settings state and the registry of channels observing it.
///
/// A state change is the only fan-out trigger: `apply` merges incoming
/// keys over the current settings and then pushes the new snapshot to
/// every registered channel, including the channel the change came from.
pub struct Controller {
    settings: Mutex<Settings>,
    registry: ConnectionRegistry,
}

impl Controller {
    pub fn new(initial: Settings) -> Self {
        Self {
            settings: Mutex::new(initial),
            registry: ConnectionRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Clone of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.settings.lock().clone()
    }

    /// Merge `update` over current settings and broadcast the result.
    /// Keys not present in `update` keep their values.
    pub fn apply(&self, update: Settings) {
        let snapshot = {
            let mut settings = self.settings.lock();
            for (key, value) in update {
                log::debug!("Setting {key} = {value}");
                settings.insert(key, value);
            }
            settings.clone()
        };

        self.registry.notify_all(&snapshot);
    }
}
