//! Key event read loop
//!
//! Reads 3-byte packets from the accessory's bulk IN endpoint, translates the
//! Android key codes and injects them into the host. Read timeouts only mean
//! no key was touched; any other read failure ends the session.
//!
//! Keys still held when the session ends, for whatever reason, are released
//! on a best-effort basis so nothing stays stuck on the host.

use crate::error::{AccessoryError, Result};
use crate::input::KeyInjector;
use crate::negotiator::AccessorySession;
use crate::usb::AccessoryDevice;
use common::ShutdownSignal;
use protocol::{KEY_PACKET_LEN, KeyAction, KeyEvent, keycode};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Bound on a single bulk read
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// One connection session
pub struct EventReader<'k, D, K> {
    session: AccessorySession<D>,
    keyboard: &'k mut K,
    read_timeout: Duration,
    shutdown: ShutdownSignal,
    /// Host codes pressed and not yet released
    held: BTreeSet<u16>,
}

impl<'k, D: AccessoryDevice, K: KeyInjector> EventReader<'k, D, K> {
    pub fn new(
        session: AccessorySession<D>,
        keyboard: &'k mut K,
        read_timeout: Duration,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            session,
            keyboard,
            read_timeout,
            shutdown,
            held: BTreeSet::new(),
        }
    }

    /// Read until the device goes away or shutdown is requested
    ///
    /// Returns `Ok(())` only on shutdown. A failed read is returned once as
    /// [`AccessoryError::ConnectionLost`].
    pub fn run(mut self) -> Result<()> {
        let result = self.read_loop();
        self.release_held();
        result
    }

    fn read_loop(&mut self) -> Result<()> {
        let inbound = self.session.endpoints.inbound;
        info!("Reading key events from endpoint {:#04x}", inbound);

        loop {
            if self.shutdown.is_triggered() {
                debug!("Shutdown requested, leaving read loop");
                return Ok(());
            }

            let mut buf = [0u8; KEY_PACKET_LEN];
            match self
                .session
                .device
                .read_bulk(inbound, &mut buf, self.read_timeout)
            {
                Ok(len) => self.handle_packet(&buf[..len])?,
                Err(rusb::Error::Timeout) => continue,
                Err(e) => return Err(AccessoryError::ConnectionLost(e)),
            }
        }
    }

    fn handle_packet(&mut self, packet: &[u8]) -> Result<()> {
        let event = match KeyEvent::parse(packet) {
            Ok(event) => event,
            Err(e) => {
                debug!("Dropping packet {:02x?}: {}", packet, e);
                return Ok(());
            }
        };

        match event.action {
            KeyAction::Down => debug!("Key down {}", event.key_code),
            KeyAction::Up => debug!("Key up {}", event.key_code),
        }

        match keycode::translate(event.key_code) {
            Some(host_code) => {
                let pressed = event.action.is_press();
                if pressed {
                    self.held.insert(host_code);
                }
                self.keyboard.key_transition(host_code, pressed)?;
                if !pressed {
                    self.held.remove(&host_code);
                }
            }
            None => trace!("No host key for key code {}", event.key_code),
        }

        Ok(())
    }

    fn release_held(&mut self) {
        if self.held.is_empty() {
            return;
        }

        for code in std::mem::take(&mut self.held) {
            debug!("Releasing held key {}", code);
            if let Err(e) = self.keyboard.write_key(code, false) {
                warn!("Failed to release key {}: {}", code, e);
            }
        }
        if let Err(e) = self.keyboard.sync() {
            warn!("Failed to sync key releases: {}", e);
        }
    }
}
