// Keypipe Latch Table
// Held/released state for every keycode, mutated only by the engine

use smallvec::SmallVec;

use crate::modifier::MODIFIER_KEYCODES;
use crate::Keycode;

/// Tracks which keys the virtual device currently reports as down.
///
/// Dense array over the whole keycode domain, so lookup is a direct index
/// that is always in bounds. Owned by the engine and never persisted; a
/// fresh table starts with every key released.
#[derive(Debug, Clone)]
pub struct LatchTable {
    held: [bool; 256],
}

impl LatchTable {
    /// Create a table with every key released.
    pub fn new() -> Self {
        Self { held: [false; 256] }
    }

    /// Check whether a key is currently held.
    pub fn is_held(&self, key: Keycode) -> bool {
        self.held[key.index()]
    }

    /// Record a key as held.
    pub fn set_held(&mut self, key: Keycode) {
        self.held[key.index()] = true;
    }

    /// Record a key as released.
    pub fn clear(&mut self, key: Keycode) {
        self.held[key.index()] = false;
    }

    /// Currently latched modifiers, in fixed release order.
    pub fn held_modifiers(&self) -> SmallVec<[Keycode; 8]> {
        MODIFIER_KEYCODES
            .iter()
            .map(|&code| Keycode::from(code))
            .filter(|&key| self.is_held(key))
            .collect()
    }

    /// Number of keys currently held.
    pub fn held_count(&self) -> usize {
        self.held.iter().filter(|&&h| h).count()
    }

    /// Release everything.
    pub fn clear_all(&mut self) {
        self.held = [false; 256];
    }
}

impl Default for LatchTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_starts_released() {
        let table = LatchTable::new();
        for code in 0..=255u8 {
            assert!(!table.is_held(Keycode::from(code)));
        }
        assert_eq!(table.held_count(), 0);
    }

    #[test]
    fn test_latch_set_and_clear() {
        let mut table = LatchTable::new();
        let shift = Keycode::from(42); // LEFT_SHIFT

        table.set_held(shift);
        assert!(table.is_held(shift));
        assert_eq!(table.held_count(), 1);

        table.clear(shift);
        assert!(!table.is_held(shift));
        assert_eq!(table.held_count(), 0);
    }

    #[test]
    fn test_clear_unheld_key_is_noop() {
        let mut table = LatchTable::new();
        table.clear(Keycode::from(30));
        assert_eq!(table.held_count(), 0);
    }

    #[test]
    fn test_held_modifiers_release_order() {
        let mut table = LatchTable::new();
        // Latch in an order different from the release order.
        table.set_held(Keycode::from(42)); // LEFT_SHIFT
        table.set_held(Keycode::from(97)); // RIGHT_CTRL
        table.set_held(Keycode::from(125)); // LEFT_META

        let held = table.held_modifiers();
        let codes: Vec<u8> = held.iter().map(|k| k.raw()).collect();
        assert_eq!(codes, vec![97, 125, 42]);
    }

    #[test]
    fn test_held_modifiers_ignores_regular_keys() {
        let mut table = LatchTable::new();
        table.set_held(Keycode::from(30)); // A
        assert!(table.held_modifiers().is_empty());
        assert_eq!(table.held_count(), 1);
    }

    #[test]
    fn test_clear_all() {
        let mut table = LatchTable::new();
        table.set_held(Keycode::from(29));
        table.set_held(Keycode::from(30));
        table.clear_all();
        assert_eq!(table.held_count(), 0);
    }
}
