//! uinput virtual keyboard
//!
//! Needs write access to `/dev/uinput`.

use crate::input::KeyInjector;
use evdev_rs::enums::{EV_KEY, EV_SYN, EventCode, EventType, int_to_ev_key};
use evdev_rs::{DeviceWrapper, InputEvent, TimeVal, UInputDevice, UninitDevice};
use protocol::keycode;
use std::io;
use tracing::{debug, info};

/// Name the virtual device shows up with in `/proc/bus/input/devices`
pub const VIRTUAL_KEYBOARD_NAME: &str = "AOA Keyboard Bridge";

const BUS_USB: u16 = 0x03;

/// Synthetic keyboard advertising every key the translation table can emit
pub struct VirtualKeyboard {
    uinput: UInputDevice,
}

impl VirtualKeyboard {
    pub fn create() -> io::Result<Self> {
        let ud = UninitDevice::new().ok_or_else(|| io::Error::other("libevdev_new failed"))?;
        ud.set_name(VIRTUAL_KEYBOARD_NAME);
        ud.set_bustype(BUS_USB);
        ud.set_vendor_id(protocol::DEFAULT_VENDOR_ID);

        ud.enable_event_type(&EventType::EV_SYN)?;
        ud.enable_event_type(&EventType::EV_KEY)?;
        for code in keycode::host_key_codes() {
            ud.enable_event_code(&EventCode::EV_KEY(ev_key(code)?), None)?;
        }

        let uinput = UInputDevice::create_from_device(&ud)?;
        info!(
            "Created virtual keyboard '{}' ({})",
            VIRTUAL_KEYBOARD_NAME,
            uinput.devnode().unwrap_or("no devnode")
        );

        Ok(Self { uinput })
    }

    fn write(&self, code: EventCode, value: i32) -> io::Result<()> {
        let dummy_timeval = TimeVal::new(0, 0);
        self.uinput
            .write_event(&InputEvent::new(&dummy_timeval, &code, value))
    }
}

impl KeyInjector for VirtualKeyboard {
    fn write_key(&mut self, code: u16, pressed: bool) -> io::Result<()> {
        debug!("uinput EV_KEY {} = {}", code, pressed as i32);
        self.write(EventCode::EV_KEY(ev_key(code)?), i32::from(pressed))
    }

    fn sync(&mut self) -> io::Result<()> {
        self.write(EventCode::EV_SYN(EV_SYN::SYN_REPORT), 0)
    }
}

fn ev_key(code: u16) -> io::Result<EV_KEY> {
    int_to_ev_key(u32::from(code)).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a key code", code),
        )
    })
}
