// Keypipe uinput Output Layer
// Virtual device creation and key event emission

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, BusType, EventType, InputEvent, InputId};
use log::{debug, info};

use super::sink::KeySink;
use crate::Keycode;

/// Default name of the virtual device, as the OS input stack sees it.
pub const DEVICE_NAME: &str = "Keypipe (virtual) Keyboard";

/// Fixed device identity; clients match on it to find the device.
const VENDOR_ID: u16 = 0x2323;
const PRODUCT_ID: u16 = 0x4242;

/// Error types for uinput operations
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to create virtual device: {0}")]
    Creation(String),

    #[error("Failed to write event: {0}")]
    Write(String),

    #[error("Device already destroyed")]
    Destroyed,
}

/// Virtual uinput keyboard for key emission.
pub struct VirtualKeyboard {
    /// Taken on destroy; `None` afterwards makes teardown idempotent.
    device: Option<VirtualDevice>,
}

impl VirtualKeyboard {
    /// Create the virtual device with the default name.
    pub fn new() -> Result<Self, DeviceError> {
        Self::with_name(DEVICE_NAME)
    }

    /// Create the virtual device, registering every emittable keycode.
    pub fn with_name(name: &str) -> Result<Self, DeviceError> {
        let mut keys = AttributeSet::new();
        for code in 1..=u16::from(Keycode::MAX_EMITTABLE) {
            keys.insert(evdev::Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| DeviceError::Creation(e.to_string()))?
            .name(name)
            .input_id(InputId::new(BusType::BUS_USB, VENDOR_ID, PRODUCT_ID, 1))
            .with_keys(&keys)
            .map_err(|e: std::io::Error| DeviceError::Creation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| DeviceError::Creation(e.to_string()))?;

        info!("virtual device '{}' created", name);
        Ok(Self {
            device: Some(device),
        })
    }

    /// Write one key event and its sync marker in a single emit call, so
    /// the kernel never observes a key state change without the trailing
    /// sync.
    fn write_key_event(&mut self, key: Keycode, value: i32) -> Result<(), DeviceError> {
        let device = self.device.as_mut().ok_or(DeviceError::Destroyed)?;

        let key_event = InputEvent::new(EventType::KEY, key.code(), value);
        // SYN event is required for the kernel to process the key event
        let syn_event = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);

        device
            .emit(&[key_event, syn_event])
            .map_err(|e: std::io::Error| DeviceError::Write(e.to_string()))
    }

    /// Deregister the virtual device.
    ///
    /// Safe to call more than once; only the first call does anything.
    pub fn destroy(&mut self) {
        if self.device.take().is_some() {
            debug!("virtual device destroyed");
        }
    }

    /// Whether the device has been torn down.
    pub fn is_destroyed(&self) -> bool {
        self.device.is_none()
    }
}

impl KeySink for VirtualKeyboard {
    fn press(&mut self, key: Keycode) -> Result<(), DeviceError> {
        self.write_key_event(key, 1)
    }

    fn release(&mut self, key: Keycode) -> Result<(), DeviceError> {
        self.write_key_event(key, 0)
    }
}
