//! Process-wide lifecycle
//!
//! Probes once at startup in case the device is already plugged in, then
//! negotiates again on every USB "add" notification. A session runs to
//! completion before the next notification is looked at. Negotiation and
//! read failures are logged and never end the process.

use crate::error::AccessoryError;
use crate::input::KeyInjector;
use crate::negotiator::{Clock, ConnectionState, Negotiator};
use crate::reader::EventReader;
use crate::usb::UsbBus;
use common::{HotplugReceiver, ShutdownSignal};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How a single attach attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// No device with the target vendor ID
    NotFound,
    /// The handshake or endpoint resolution failed
    NegotiationFailed,
    /// The device stopped answering, usually because it was unplugged
    ConnectionLost,
    /// The virtual keyboard rejected an event
    InputFailed,
    /// Shutdown was requested while reading
    Shutdown,
}

pub struct Supervisor<B, C, K> {
    negotiator: Negotiator<B, C>,
    keyboard: K,
    notifications: HotplugReceiver,
    read_timeout: Duration,
    shutdown: ShutdownSignal,
    state: ConnectionState,
    sessions: u64,
}

impl<B: UsbBus, C: Clock, K: KeyInjector> Supervisor<B, C, K> {
    pub fn new(
        negotiator: Negotiator<B, C>,
        keyboard: K,
        notifications: HotplugReceiver,
        read_timeout: Duration,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            negotiator,
            keyboard,
            notifications,
            read_timeout,
            shutdown,
            state: ConnectionState::NotFound,
            sessions: 0,
        }
    }

    /// Run until shutdown or until the notification queue closes
    pub fn run(&mut self) {
        info!(
            "Waiting for devices with vendor ID {:#06x}",
            self.negotiator.vendor_id()
        );

        // The device may have been attached before we started
        if self.handle_attached_device() == SessionOutcome::Shutdown {
            return;
        }

        while let Some(event) = self.notifications.recv() {
            if self.shutdown.is_triggered() {
                break;
            }

            if !event.is_usb_add() {
                debug!(
                    "Ignoring {} on {} (bus={}, addr={})",
                    event.action.as_str(),
                    event.subsystem,
                    event.bus,
                    event.address
                );
                continue;
            }

            info!(
                "Device connected: {:04x}:{:04x} (bus={}, addr={})",
                event.vendor_id, event.product_id, event.bus, event.address
            );
            if self.handle_attached_device() == SessionOutcome::Shutdown {
                break;
            }
        }

        info!("Supervisor stopped after {} session(s)", self.sessions);
    }

    /// Negotiate with whatever is attached and read until it goes away
    pub fn handle_attached_device(&mut self) -> SessionOutcome {
        if self.shutdown.is_triggered() {
            return SessionOutcome::Shutdown;
        }

        let session = match self.negotiator.negotiate() {
            Ok(session) => session,
            Err(e @ AccessoryError::DeviceNotFound { .. }) => {
                self.state = self.negotiator.state();
                info!("{}", e);
                return SessionOutcome::NotFound;
            }
            Err(e) => {
                self.state = self.negotiator.state();
                warn!("Accessory negotiation failed: {}", e);
                return SessionOutcome::NegotiationFailed;
            }
        };

        self.sessions += 1;
        self.state = ConnectionState::Reading;

        let reader = EventReader::new(
            session,
            &mut self.keyboard,
            self.read_timeout,
            self.shutdown.clone(),
        );

        match reader.run() {
            Ok(()) => {
                self.state = ConnectionState::Closed;
                SessionOutcome::Shutdown
            }
            Err(AccessoryError::ConnectionLost(e)) => {
                self.state = ConnectionState::Closed;
                warn!("Failed to read input, connection lost: {}", e);
                SessionOutcome::ConnectionLost
            }
            Err(e) => {
                self.state = ConnectionState::Failed;
                warn!("Session ended: {}", e);
                SessionOutcome::InputFailed
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Number of sessions that reached the read loop
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    pub fn keyboard(&self) -> &K {
        &self.keyboard
    }

    pub fn negotiator(&self) -> &Negotiator<B, C> {
        &self.negotiator
    }
}
