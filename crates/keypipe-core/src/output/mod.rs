// Keypipe Output Layer
// Emission seam and the uinput virtual device behind it

mod sink;
mod uinput;

pub use sink::KeySink;
pub use uinput::{DeviceError, VirtualKeyboard, DEVICE_NAME};
