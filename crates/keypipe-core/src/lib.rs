// Keypipe Core Library
// Byte-stream to virtual-keyboard translation

pub mod engine;
pub mod key;
pub mod modifier;
pub mod output;
pub mod server;
pub mod settings;
pub mod state;

pub use engine::InjectionEngine;
pub use key::Keycode;
pub use modifier::{is_modifier_code, Modifier, MODIFIER_KEYCODES};
pub use output::{DeviceError, KeySink, VirtualKeyboard, DEVICE_NAME};
pub use server::{default_socket_path, ServerError, SocketServer, SOCKET_NAME};
pub use settings::{Settings, SettingsError};
pub use state::LatchTable;
