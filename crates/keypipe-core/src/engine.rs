// Keypipe Injection Engine
// Translates keycode byte chunks into press/release emissions

use log::debug;

use crate::output::{DeviceError, KeySink};
use crate::state::LatchTable;
use crate::Keycode;

/// The modifier state machine.
///
/// Consumes chunks of keycode bytes and drives the sink: modifier
/// keycodes toggle their latch, everything else is pulsed. The latch
/// table is owned here and lives as long as the engine, so latched
/// modifiers persist across chunks and across client connections.
///
/// Invariant: a latch entry is true iff the sink was last told the key is
/// down. Every emission and its latch mutation sit adjacent in the same
/// code path; nothing else mutates the table.
pub struct InjectionEngine<S: KeySink> {
    sink: S,
    latches: LatchTable,
}

impl<S: KeySink> InjectionEngine<S> {
    /// Create an engine with a fresh latch table driving the given sink.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            latches: LatchTable::new(),
        }
    }

    /// Process one read's worth of bytes, in order.
    ///
    /// Chunk boundaries are semantically significant: the stuck-modifier
    /// release below fires only when the delivered chunk is exactly one
    /// byte. That makes the behavior sensitive to how the client batches
    /// its writes (a keystroke split across two writes arrives as two
    /// lone chunks, each triggering the release). Fragile, but existing
    /// clients depend on it, so it is kept bit-for-bit.
    pub fn process_chunk(&mut self, chunk: &[u8]) -> Result<(), DeviceError> {
        let lone_keystroke = chunk.len() == 1;

        for &byte in chunk {
            let key = Keycode::from(byte);
            if key.is_padding() {
                continue;
            }

            if key.is_modifier() {
                self.toggle_modifier(key)?;
            } else {
                debug!("[{}] press and release", key);
                self.sink.pulse(key)?;
                // A lone non-modifier keystroke is assumed to be typed on
                // its own, not as part of a chord the client forgot to
                // release.
                if lone_keystroke {
                    self.release_held_modifiers()?;
                }
            }
        }

        Ok(())
    }

    fn toggle_modifier(&mut self, key: Keycode) -> Result<(), DeviceError> {
        if self.latches.is_held(key) {
            debug!("[{}] release", key);
            self.sink.release(key)?;
            self.latches.clear(key);
        } else {
            debug!("[{}] press", key);
            self.sink.press(key)?;
            self.latches.set_held(key);
        }
        Ok(())
    }

    /// Release every latched modifier, in fixed modifier order.
    ///
    /// Also used at shutdown so the OS is not left with keys down.
    pub fn release_held_modifiers(&mut self) -> Result<(), DeviceError> {
        for key in self.latches.held_modifiers() {
            debug!("removing {}", key);
            self.sink.release(key)?;
            self.latches.clear(key);
        }
        Ok(())
    }

    /// Whether a key is currently latched on.
    pub fn is_held(&self, key: Keycode) -> bool {
        self.latches.is_held(key)
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the engine, returning the sink for teardown.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
