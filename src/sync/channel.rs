// Per-connection settings channel

use super::{decode, encode, ChannelId, Controller, Settings};
use crate::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// What a channel does with non-probe messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Echo-only: non-probe content is ignored.
    Echo,
    /// Forward non-probe messages to the controller as new settings.
    Set,
}

/// One persistent duplex connection carrying settings traffic.
///
/// Lifecycle is Closed -> Open -> Closed, terminal. While open the channel
/// is registered with its controller's registry and receives every
/// broadcast; an empty inbound mapping is the probe sentinel and bounces
/// the current settings straight back without touching the controller.
pub struct SettingsChannel {
    id: ChannelId,
    mode: ChannelMode,
    controller: Arc<Controller>,
    outbound: mpsc::UnboundedSender<String>,
    open: Arc<AtomicBool>,
}

impl SettingsChannel {
    /// Create a channel in the Closed state. `outbound` is where
    /// serialized frames are queued for the transport to send.
    pub fn new(
        mode: ChannelMode,
        controller: Arc<Controller>,
        outbound: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            id: ChannelId::next(),
            mode,
            controller,
            outbound,
            open: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Transition to Open and register with the controller's registry.
    ///
    /// The registered callback captures only the outbound queue and the
    /// open flag, so broadcasting to a channel that closed concurrently
    /// fails as a per-recipient delivery error, never a crash.
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);

        let outbound = self.outbound.clone();
        let open = Arc::clone(&self.open);
        self.controller.registry().register(self.id, move |settings| {
            if !open.load(Ordering::SeqCst) {
                return Err(Error::Delivery);
            }
            outbound.send(encode(settings)).map_err(|_| Error::Delivery)
        });

        log::debug!("Opened {} ({:?})", self.id, self.mode);
    }

    /// Transition to Closed and unregister; terminal. Later broadcasts
    /// never reach this channel again.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.controller.registry().unregister(self.id);
            log::debug!("Closed {}", self.id);
        }
    }

    /// Handle one inbound text frame.
    ///
    /// A malformed payload surfaces as a decode error for the framing
    /// owner to log; the payload is dropped and the channel stays open.
    /// The empty mapping is a probe: current settings go back to this
    /// channel only, with no controller mutation and no fan-out. Anything
    /// else is forwarded according to the channel mode; a `Set` channel's
    /// originator sees its own update come back through the normal
    /// broadcast, not a direct reply.
    pub fn handle_frame(&self, raw: &str) -> Result<(), Error> {
        if !self.is_open() {
            log::debug!("Dropping frame received on closed {}", self.id);
            return Ok(());
        }

        let msg = decode(raw)?;
        log::debug!("{} received {} key(s)", self.id, msg.len());

        if msg.is_empty() {
            // Probe: bounce back current settings, suppress further handling
            if let Err(e) = self.send_settings(&self.controller.snapshot()) {
                log::info!("Probe reply on {} failed: {e}", self.id);
            }
            return Ok(());
        }

        match self.mode {
            ChannelMode::Echo => {}
            ChannelMode::Set => self.controller.apply(msg),
        }

        Ok(())
    }

    /// Serialize and queue `settings` for this channel alone.
    pub fn send_settings(&self, settings: &Settings) -> Result<(), Error> {
        if !self.is_open() {
            return Err(Error::Delivery);
        }
        self.outbound
            .send(encode(settings))
            .map_err(|_| Error::Delivery)
    }
}

impl Drop for SettingsChannel {
    fn drop(&mut self) {
        // A discarded channel must not leave a dangling callback behind
        self.close();
    }
}
