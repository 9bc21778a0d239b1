// Keypipe Key Sink
// Primitive emission interface between the engine and the device driver

use super::uinput::DeviceError;
use crate::Keycode;

/// Primitive key emission, implemented by the uinput driver.
///
/// The injection engine drives this trait rather than the device type
/// directly, so tests can substitute a recording sink.
pub trait KeySink {
    /// Set the key state to down, followed by a sync marker.
    fn press(&mut self, key: Keycode) -> Result<(), DeviceError>;

    /// Set the key state to up, followed by a sync marker.
    fn release(&mut self, key: Keycode) -> Result<(), DeviceError>;

    /// Press immediately followed by release; a momentary keystroke.
    fn pulse(&mut self, key: Keycode) -> Result<(), DeviceError> {
        self.press(key)?;
        self.release(key)
    }
}
