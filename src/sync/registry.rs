// Observer registry fanning controller updates out to live channels

use super::Settings;
use crate::error::Error;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Opaque handle identifying one registered channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

impl ChannelId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "channel#{}", self.0)
    }
}

type UpdateFn = Arc<dyn Fn(&Settings) -> Result<(), Error> + Send + Sync>;

/// Set of live update callbacks, one per open channel.
///
/// Registration is idempotent per id. Fan-out takes a snapshot of the set
/// before invoking anything, so a callback may unregister itself (or any
/// other entry) mid-broadcast without corrupting the set or affecting
/// delivery to the rest. The lock is never held across a callback.
#[derive(Default)]
pub struct ConnectionRegistry {
    subscribers: Mutex<HashMap<ChannelId, UpdateFn>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an update callback under `id`. Re-registering the same id
    /// replaces the previous entry; one id never fires twice per fan-out.
    pub fn register<F>(&self, id: ChannelId, callback: F)
    where
        F: Fn(&Settings) -> Result<(), Error> + Send + Sync + 'static,
    {
        let previous = self.subscribers.lock().insert(id, Arc::new(callback));
        if previous.is_some() {
            log::debug!("Re-registered {id}, replacing previous callback");
        } else {
            log::debug!("Registered {id}");
        }
    }

    /// Remove the callback registered under `id`. Safe when absent, and
    /// safe to call from within a fan-out.
    pub fn unregister(&self, id: ChannelId) {
        if self.subscribers.lock().remove(&id).is_some() {
            log::debug!("Unregistered {id}");
        }
    }

    /// Number of currently registered channels.
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }

    /// Deliver `settings` to every currently registered callback.
    ///
    /// No ordering guarantee across channels. A failing callback is
    /// logged and does not block delivery to the remaining ones.
    pub fn notify_all(&self, settings: &Settings) {
        let snapshot: Vec<(ChannelId, UpdateFn)> = self
            .subscribers
            .lock()
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        log::debug!("Notifying {} channel(s)", snapshot.len());

        for (id, callback) in snapshot {
            if let Err(e) = callback(settings) {
                log::info!("Dropping update for {id}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(key: &str, value: &str) -> Settings {
        let mut s = Settings::new();
        s.insert(key.to_string(), value.to_string());
        s
    }

    #[test]
    fn test_register_notify_unregister() {
        let registry = ConnectionRegistry::new();
        let id = ChannelId::next();
        let hits = Arc::new(Mutex::new(0));

        let h = Arc::clone(&hits);
        registry.register(id, move |_| {
            *h.lock() += 1;
            Ok(())
        });

        registry.notify_all(&settings_with("gain", "5"));
        assert_eq!(*hits.lock(), 1);

        registry.unregister(id);
        registry.notify_all(&settings_with("gain", "6"));
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_duplicate_registration_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let id = ChannelId::next();
        let hits = Arc::new(Mutex::new(0));

        for _ in 0..2 {
            let h = Arc::clone(&hits);
            registry.register(id, move |_| {
                *h.lock() += 1;
                Ok(())
            });
        }

        assert_eq!(registry.len(), 1);
        registry.notify_all(&Settings::new());
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_unregister_from_own_callback_mid_fanout() {
        let registry = Arc::new(ConnectionRegistry::new());
        let self_removing = ChannelId::next();
        let bystander = ChannelId::next();
        let bystander_hits = Arc::new(Mutex::new(0));

        let r = Arc::clone(&registry);
        registry.register(self_removing, move |_| {
            r.unregister(self_removing);
            Ok(())
        });

        let h = Arc::clone(&bystander_hits);
        registry.register(bystander, move |_| {
            *h.lock() += 1;
            Ok(())
        });

        registry.notify_all(&Settings::new());
        assert_eq!(*bystander_hits.lock(), 1);
        assert_eq!(registry.len(), 1);

        // The removed channel never fires again
        registry.notify_all(&Settings::new());
        assert_eq!(*bystander_hits.lock(), 2);
    }

    #[test]
    fn test_failing_callback_does_not_block_the_rest() {
        let registry = ConnectionRegistry::new();
        let delivered = Arc::new(Mutex::new(0));

        registry.register(ChannelId::next(), |_| Err(Error::Delivery));
        for _ in 0..9 {
            let d = Arc::clone(&delivered);
            registry.register(ChannelId::next(), move |_| {
                *d.lock() += 1;
                Ok(())
            });
        }

        registry.notify_all(&settings_with("gain", "5"));
        assert_eq!(*delivered.lock(), 9);
    }

    #[test]
    fn test_unregister_absent_id_is_noop() {
        let registry = ConnectionRegistry::new();
        registry.unregister(ChannelId::next());
        assert!(registry.is_empty());
    }
}
