//! Scripted USB devices and recording collaborators for bridge tests
//!
//! Every fake shares one [`CallLog`], so tests can assert on the relative
//! order of control transfers, settle delays, claims and reads.

#![allow(dead_code)]

use bridge::{AccessoryDevice, Clock, EndpointInfo, KeyInjector, UsbBus};
use common::ShutdownSignal;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

pub const GOOGLE_VENDOR_ID: u16 = 0x18d1;
pub const PHONE_PRODUCT_ID: u16 = 0x4ee7;
pub const ACCESSORY_PRODUCT_ID: u16 = 0x2d01;

pub const BULK_IN: u8 = 0x81;
pub const BULK_OUT: u8 = 0x02;

/// Observable operation on a fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open {
        vendor_id: u16,
    },
    ReadControl {
        request_type: u8,
        request: u8,
        index: u16,
    },
    WriteControl {
        request_type: u8,
        request: u8,
        index: u16,
        data: Vec<u8>,
    },
    Claim,
    Endpoints,
    ReadBulk {
        endpoint: u8,
    },
    Sleep(Duration),
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.0.borrow().iter().position(|c| pred(c))
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Sleep(d) => Some(*d),
                _ => None,
            })
            .collect()
    }
}

pub fn bulk_in() -> EndpointInfo {
    EndpointInfo {
        address: BULK_IN,
        direction: rusb::Direction::In,
        transfer_type: rusb::TransferType::Bulk,
    }
}

pub fn bulk_out() -> EndpointInfo {
    EndpointInfo {
        address: BULK_OUT,
        direction: rusb::Direction::Out,
        transfer_type: rusb::TransferType::Bulk,
    }
}

pub fn interrupt_in() -> EndpointInfo {
    EndpointInfo {
        address: 0x83,
        direction: rusb::Direction::In,
        transfer_type: rusb::TransferType::Interrupt,
    }
}

/// What a fake does once its scripted reads run out
#[derive(Debug, Clone)]
pub enum WhenDrained {
    /// Fail the read as if the cable was pulled
    Disconnect,
    /// Request shutdown and report a timeout
    Shutdown(ShutdownSignal),
}

/// A device answering from a script
#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub product_id: u16,
    /// Raw reply to the get-protocol request
    pub protocol_reply: Vec<u8>,
    /// Length reported for the string transfer with a given index,
    /// instead of the number of bytes sent
    pub string_reply_lens: Vec<(u16, usize)>,
    pub endpoints: Vec<EndpointInfo>,
    pub reads: VecDeque<rusb::Result<Vec<u8>>>,
    pub when_drained: WhenDrained,
    log: CallLog,
}

impl FakeDevice {
    /// A phone that still has to be switched into accessory mode
    pub fn phone() -> Self {
        Self::with_product_id(PHONE_PRODUCT_ID)
    }

    /// The same phone after it re-enumerated in accessory mode
    pub fn accessory() -> Self {
        Self::with_product_id(ACCESSORY_PRODUCT_ID)
    }

    pub fn with_product_id(product_id: u16) -> Self {
        Self {
            product_id,
            protocol_reply: vec![0x02, 0x00],
            string_reply_lens: Vec::new(),
            endpoints: vec![bulk_in(), bulk_out()],
            reads: VecDeque::new(),
            when_drained: WhenDrained::Disconnect,
            log: CallLog::default(),
        }
    }

    pub fn protocol_version(mut self, version: u16) -> Self {
        self.protocol_reply = version.to_le_bytes().to_vec();
        self
    }

    pub fn string_reply_len(mut self, index: u16, len: usize) -> Self {
        self.string_reply_lens.push((index, len));
        self
    }

    pub fn endpoints(mut self, endpoints: Vec<EndpointInfo>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn packet(mut self, packet: &[u8]) -> Self {
        self.reads.push_back(Ok(packet.to_vec()));
        self
    }

    pub fn read_error(mut self, error: rusb::Error) -> Self {
        self.reads.push_back(Err(error));
        self
    }

    pub fn shutdown_when_drained(mut self, shutdown: ShutdownSignal) -> Self {
        self.when_drained = WhenDrained::Shutdown(shutdown);
        self
    }

    /// Attach the device to a shared log
    pub fn logging_to(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }
}

/// Open handle on a [`FakeDevice`]
#[derive(Debug)]
pub struct FakeHandle {
    device: FakeDevice,
    reads: RefCell<VecDeque<rusb::Result<Vec<u8>>>>,
}

impl AccessoryDevice for FakeHandle {
    fn product_id(&self) -> u16 {
        self.device.product_id
    }

    fn read_control(
        &self,
        request_type: u8,
        request: u8,
        _value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> rusb::Result<usize> {
        self.device.log.push(Call::ReadControl {
            request_type,
            request,
            index,
        });
        let reply = &self.device.protocol_reply;
        let len = reply.len().min(buf.len());
        buf[..len].copy_from_slice(&reply[..len]);
        Ok(len)
    }

    fn write_control(
        &self,
        request_type: u8,
        request: u8,
        _value: u16,
        index: u16,
        data: &[u8],
    ) -> rusb::Result<usize> {
        self.device.log.push(Call::WriteControl {
            request_type,
            request,
            index,
            data: data.to_vec(),
        });
        if request == 52
            && let Some(&(_, len)) = self
                .device
                .string_reply_lens
                .iter()
                .find(|(i, _)| *i == index)
        {
            return Ok(len);
        }
        Ok(data.len())
    }

    fn claim(&mut self) -> rusb::Result<()> {
        self.device.log.push(Call::Claim);
        Ok(())
    }

    fn interface_endpoints(&self) -> rusb::Result<Vec<EndpointInfo>> {
        self.device.log.push(Call::Endpoints);
        Ok(self.device.endpoints.clone())
    }

    fn read_bulk(&self, endpoint: u8, buf: &mut [u8], _timeout: Duration) -> rusb::Result<usize> {
        self.device.log.push(Call::ReadBulk { endpoint });
        match self.reads.borrow_mut().pop_front() {
            Some(Ok(packet)) => {
                let len = packet.len().min(buf.len());
                buf[..len].copy_from_slice(&packet[..len]);
                Ok(len)
            }
            Some(Err(e)) => Err(e),
            None => match &self.device.when_drained {
                WhenDrained::Disconnect => Err(rusb::Error::NoDevice),
                WhenDrained::Shutdown(shutdown) => {
                    shutdown.trigger();
                    Err(rusb::Error::Timeout)
                }
            },
        }
    }
}

/// A bus whose discovery results are scripted one call at a time
///
/// Once the script is exhausted every lookup finds nothing.
#[derive(Debug, Default)]
pub struct FakeBus {
    discoveries: RefCell<VecDeque<Option<FakeDevice>>>,
    log: CallLog,
}

impl FakeBus {
    pub fn new(log: &CallLog) -> Self {
        Self {
            discoveries: RefCell::new(VecDeque::new()),
            log: log.clone(),
        }
    }

    /// Next lookup finds `device`
    pub fn then_found(self, device: FakeDevice) -> Self {
        let device = device.logging_to(&self.log);
        self.discoveries.borrow_mut().push_back(Some(device));
        self
    }

    /// Next lookup finds nothing
    pub fn then_missing(self) -> Self {
        self.discoveries.borrow_mut().push_back(None);
        self
    }

    pub fn remaining(&self) -> usize {
        self.discoveries.borrow().len()
    }
}

impl UsbBus for FakeBus {
    type Device = FakeHandle;

    fn open_by_vendor(&self, vendor_id: u16) -> rusb::Result<Option<FakeHandle>> {
        self.log.push(Call::Open { vendor_id });
        Ok(self
            .discoveries
            .borrow_mut()
            .pop_front()
            .flatten()
            .map(|device| FakeHandle {
                reads: RefCell::new(device.reads.clone()),
                device,
            }))
    }
}

/// Records sleeps instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct RecordingClock {
    log: CallLog,
}

impl RecordingClock {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) {
        self.log.push(Call::Sleep(duration));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardEvent {
    Key { code: u16, pressed: bool },
    Sync,
}

/// Keyboard that remembers what it was asked to emit
#[derive(Debug, Default)]
pub struct RecordingKeyboard {
    pub events: Vec<KeyboardEvent>,
    pub fail_writes: bool,
    /// Number of upcoming syncs to fail
    pub fail_syncs: usize,
}

impl RecordingKeyboard {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn failing_syncs(count: usize) -> Self {
        Self {
            fail_syncs: count,
            ..Self::default()
        }
    }
}

impl KeyInjector for RecordingKeyboard {
    fn write_key(&mut self, code: u16, pressed: bool) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "uinput closed"));
        }
        self.events.push(KeyboardEvent::Key { code, pressed });
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        if self.fail_syncs > 0 {
            self.fail_syncs -= 1;
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "uinput closed"));
        }
        self.events.push(KeyboardEvent::Sync);
        Ok(())
    }
}
