//! USB hot-plug monitor
//!
//! Runs on a dedicated thread and pushes [`HotplugEvent`]s into the queue the
//! supervisor consumes. With libusb hot-plug support the thread just pumps
//! `handle_events()` and the registered callback does the work; without it
//! the bus is polled and consecutive snapshots are diffed.

use common::{DeviceAction, HotplugEvent, HotplugSender, ShutdownSignal};
use rusb::{Context, Device, Hotplug, HotplugBuilder, Registration, UsbContext};
use std::collections::HashMap;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long one `handle_events()` call may block before the stop flag is checked
const EVENT_LOOP_TIMEOUT: Duration = Duration::from_millis(100);

/// Bus scan interval when libusb cannot deliver hot-plug callbacks
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Devices present on the bus, (bus, address) -> (vid, pid)
type BusSnapshot = HashMap<(u8, u8), (u16, u16)>;

/// Handle to the monitor thread
pub struct HotplugMonitor {
    thread: Option<JoinHandle<()>>,
    stop: ShutdownSignal,
}

impl HotplugMonitor {
    /// Start watching the bus
    ///
    /// The thread exits once `stop` is triggered or the queue is closed.
    pub fn start(sender: HotplugSender, stop: ShutdownSignal) -> common::Result<Self> {
        let context = Context::new().map_err(|e| common::Error::Usb(e.to_string()))?;

        let builder = std::thread::Builder::new();
        let thread_stop = stop.clone();

        let thread = if rusb::has_hotplug() {
            let registration = HotplugBuilder::new()
                .enumerate(false) // the supervisor probes once at startup
                .register(&context, Box::new(HotplugCallback::new(sender)))
                .map_err(|e| common::Error::Usb(e.to_string()))?;

            debug!("Hot-plug callbacks registered");
            builder
                .name("usb-hotplug".to_string())
                .spawn(move || run_event_loop(context, registration, thread_stop))?
        } else {
            warn!("libusb has no hot-plug support here, polling the bus instead");
            builder
                .name("usb-poll".to_string())
                .spawn(move || run_poll_loop(context, sender, thread_stop))?
        };

        Ok(Self {
            thread: Some(thread),
            stop,
        })
    }

    /// Stop the thread and wait for it
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.trigger();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            error!("Hot-plug monitor thread panicked");
        }
    }
}

impl Drop for HotplugMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_event_loop(context: Context, registration: Registration<Context>, stop: ShutdownSignal) {
    info!("Hot-plug monitor started");

    while !stop.is_triggered() {
        match context.handle_events(Some(EVENT_LOOP_TIMEOUT)) {
            Ok(()) => {}
            Err(rusb::Error::Interrupted) => {
                debug!("USB event handling interrupted");
            }
            Err(e) => {
                // Transient, don't let it kill the monitor
                warn!("Error handling USB events: {}", e);
                std::thread::sleep(EVENT_LOOP_TIMEOUT);
            }
        }
    }

    drop(registration);
    info!("Hot-plug monitor stopped");
}

fn run_poll_loop(context: Context, sender: HotplugSender, stop: ShutdownSignal) {
    info!("Bus polling started");
    let mut previous = snapshot(&context).unwrap_or_default();

    while !stop.is_triggered() && !sender.is_closed() {
        std::thread::sleep(POLL_INTERVAL);

        let current = match snapshot(&context) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to enumerate USB devices: {}", e);
                continue;
            }
        };

        for event in diff_snapshots(&previous, &current) {
            if !deliver(&sender, event) {
                return;
            }
        }
        previous = current;
    }

    info!("Bus polling stopped");
}

fn snapshot(context: &Context) -> rusb::Result<BusSnapshot> {
    let devices = context.devices()?;
    Ok(devices
        .iter()
        .filter_map(|device| {
            let desc = device.device_descriptor().ok()?;
            Some((
                (device.bus_number(), device.address()),
                (desc.vendor_id(), desc.product_id()),
            ))
        })
        .collect())
}

/// Events turning `previous` into `current`: removals first, then additions
fn diff_snapshots(previous: &BusSnapshot, current: &BusSnapshot) -> Vec<HotplugEvent> {
    let mut removed: Vec<HotplugEvent> = previous
        .iter()
        .filter(|(key, ids)| current.get(key) != Some(ids))
        .map(|(&(bus, address), &(vid, pid))| {
            HotplugEvent::usb(DeviceAction::Remove, vid, pid, bus, address)
        })
        .collect();

    let mut added: Vec<HotplugEvent> = current
        .iter()
        .filter(|(key, ids)| previous.get(key) != Some(ids))
        .map(|(&(bus, address), &(vid, pid))| {
            HotplugEvent::usb(DeviceAction::Add, vid, pid, bus, address)
        })
        .collect();

    removed.sort_by_key(|e| (e.bus, e.address));
    added.sort_by_key(|e| (e.bus, e.address));
    removed.extend(added);
    removed
}

/// Queue `event` without blocking the monitor thread
///
/// A full queue drops the event. Returns `false` once the queue is closed.
fn deliver(sender: &HotplugSender, event: HotplugEvent) -> bool {
    match sender.try_send(event) {
        Ok(()) => true,
        Err(common::Error::ChannelFull) => {
            warn!("Hot-plug queue full, dropping event");
            true
        }
        Err(e) => {
            debug!("Hot-plug queue closed: {}", e);
            false
        }
    }
}

/// Hot-plug callback handler
///
/// Invoked from `handle_events()` on the monitor thread; translates libusb
/// notifications into queue events.
struct HotplugCallback {
    sender: HotplugSender,
}

impl HotplugCallback {
    fn new(sender: HotplugSender) -> Self {
        Self { sender }
    }

    fn forward<T: UsbContext>(&self, action: DeviceAction, device: &Device<T>) {
        let (vendor_id, product_id) = device
            .device_descriptor()
            .map(|d| (d.vendor_id(), d.product_id()))
            .unwrap_or((0, 0));

        debug!(
            "Hot-plug callback: {} (bus={}, addr={}, vid={:#06x}, pid={:#06x})",
            action.as_str(),
            device.bus_number(),
            device.address(),
            vendor_id,
            product_id
        );

        let event = HotplugEvent::usb(
            action,
            vendor_id,
            product_id,
            device.bus_number(),
            device.address(),
        );
        deliver(&self.sender, event);
    }
}

impl<T: UsbContext> Hotplug<T> for HotplugCallback {
    fn device_arrived(&mut self, device: Device<T>) {
        self.forward(DeviceAction::Add, &device);
    }

    fn device_left(&mut self, device: Device<T>) {
        self.forward(DeviceAction::Remove, &device);
    }
}
