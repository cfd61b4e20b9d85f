//! aoa-keyboard-bridge
//!
//! Uses an Android device attached over USB as a keyboard for this host.

use anyhow::{Context, Result};
use bridge::config::BridgeConfig;
use bridge::usb::{HotplugMonitor, RusbBus};
use bridge::{Negotiator, Supervisor, SystemClock, VirtualKeyboard};
use clap::Parser;
use common::{ShutdownSignal, create_hotplug_channel, setup_logging};
use protocol::parse_vendor_id;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "aoa-keyboard-bridge")]
#[command(
    author,
    version,
    about = "Use an Android device as a USB keyboard for this host"
)]
#[command(long_about = "
Switches an attached Android device into Android Open Accessory mode and
injects the key events it sends into a virtual keyboard on this host.
Devices attached later are picked up automatically.

EXAMPLES:
    # Wait for a Google device (vendor ID 18d1)
    aoa-keyboard-bridge

    # Wait for a Samsung device
    aoa-keyboard-bridge 04e8

    # Show devices with the configured vendor ID and exit
    aoa-keyboard-bridge --list-devices

CONFIGURATION:
    The bridge looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/aoa-keyboard-bridge/bridge.toml
    3. /etc/aoa-keyboard-bridge/bridge.toml
    4. Built-in defaults

Creating the virtual keyboard needs write access to /dev/uinput.
")]
struct Args {
    /// USB vendor ID of the device, hexadecimal (overrides the config file)
    #[arg(value_name = "VENDOR_ID")]
    vendor_id: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// List devices with the target vendor ID and exit
    #[arg(long)]
    list_devices: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --save-config flag early (before loading config)
    if args.save_config {
        let config = BridgeConfig::default();
        let path = BridgeConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    // Load configuration first (to get log level from config if not specified)
    let config = if let Some(ref path) = args.config {
        BridgeConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        BridgeConfig::load_or_default()
    };

    // Use CLI log level if specified, otherwise use config value
    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.bridge.log_level);
    BridgeConfig::validate_log_level(log_level)?;

    setup_logging(log_level).context("Failed to setup logging")?;

    let vendor_id = match args.vendor_id.as_deref() {
        Some(arg) => parse_vendor_id(arg).context("Invalid vendor ID argument")?,
        None => config.vendor_id()?,
    };

    info!("aoa-keyboard-bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("Used vendor ID: {:04x}", vendor_id);

    let bus = RusbBus::new(config.control_timeout()).context("Failed to initialize libusb")?;

    if args.list_devices {
        return list_devices_mode(&bus, vendor_id);
    }

    run(config, bus, vendor_id)
}

/// List devices with the target vendor ID and exit
fn list_devices_mode(bus: &RusbBus, vendor_id: u16) -> Result<()> {
    let devices = bus
        .list_devices(vendor_id)
        .context("Failed to enumerate USB devices")?;

    if devices.is_empty() {
        println!("No USB devices with vendor ID {:04x} found.", vendor_id);
    } else {
        println!("Found {} USB device(s):\n", devices.len());
        for device in devices {
            println!(
                "  {:04x}:{:04x} - {} {}{}",
                device.vendor_id,
                device.product_id,
                device
                    .manufacturer
                    .as_deref()
                    .unwrap_or("Unknown Manufacturer"),
                device.product.as_deref().unwrap_or("Unknown Product"),
                if device.in_accessory_mode() {
                    " (accessory mode)"
                } else {
                    ""
                }
            );
            println!(
                "      Bus {:03} Device {:03}",
                device.bus_number, device.device_address
            );
            println!();
        }
    }

    Ok(())
}

fn run(config: BridgeConfig, bus: RusbBus, vendor_id: u16) -> Result<()> {
    let shutdown = ShutdownSignal::new();
    let (sender, receiver) = create_hotplug_channel();

    {
        let shutdown = shutdown.clone();
        let sender = sender.clone();
        ctrlc::set_handler(move || {
            info!("Received Ctrl+C, shutting down gracefully...");
            shutdown.trigger();
            sender.close();
        })
        .context("Failed to install Ctrl+C handler")?;
    }

    let keyboard = VirtualKeyboard::create().context("Failed to create virtual keyboard")?;

    let monitor = HotplugMonitor::start(sender, shutdown.clone())
        .context("Failed to start hot-plug monitor")?;

    let negotiator = Negotiator::new(
        bus,
        SystemClock,
        vendor_id,
        config.accessory.clone(),
        config.settle_delays(),
    );
    let mut supervisor = Supervisor::new(
        negotiator,
        keyboard,
        receiver,
        config.read_timeout(),
        shutdown,
    );

    info!("Press Ctrl+C to stop");
    supervisor.run();

    monitor.stop();

    info!("Shutdown complete");
    Ok(())
}
