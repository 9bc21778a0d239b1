// Keypipe Modifier Set
// The eight latching modifier keycodes and their classification

use std::fmt;

use crate::Keycode;

/// The designated latching modifiers, in release order.
///
/// The lone-keystroke safety release walks this array front to back, so
/// the order is part of the observable emission sequence.
pub const MODIFIER_KEYCODES: [u8; 8] = [
    29, 97, // LEFT_CTRL, RIGHT_CTRL
    125, 126, // LEFT_META, RIGHT_META
    42, 54, // LEFT_SHIFT, RIGHT_SHIFT
    56, 100, // LEFT_ALT, RIGHT_ALT
];

/// Check if a key code is a modifier (O(1), lock-free)
#[inline]
pub const fn is_modifier_code(code: u8) -> bool {
    let mut i = 0;
    while i < MODIFIER_KEYCODES.len() {
        if MODIFIER_KEYCODES[i] == code {
            return true;
        }
        i += 1;
    }
    false
}

/// A named modifier, mostly for readable log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    LeftCtrl,
    RightCtrl,
    LeftMeta,
    RightMeta,
    LeftShift,
    RightShift,
    LeftAlt,
    RightAlt,
}

impl Modifier {
    /// Look up the modifier for a key code, if it is one.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            29 => Some(Modifier::LeftCtrl),
            97 => Some(Modifier::RightCtrl),
            125 => Some(Modifier::LeftMeta),
            126 => Some(Modifier::RightMeta),
            42 => Some(Modifier::LeftShift),
            54 => Some(Modifier::RightShift),
            56 => Some(Modifier::LeftAlt),
            100 => Some(Modifier::RightAlt),
            _ => None,
        }
    }

    /// The keycode this modifier latches on.
    pub fn keycode(self) -> Keycode {
        let code = match self {
            Modifier::LeftCtrl => 29,
            Modifier::RightCtrl => 97,
            Modifier::LeftMeta => 125,
            Modifier::RightMeta => 126,
            Modifier::LeftShift => 42,
            Modifier::RightShift => 54,
            Modifier::LeftAlt => 56,
            Modifier::RightAlt => 100,
        };
        Keycode::from(code)
    }

    /// Look up a modifier by display name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "LEFT_CTRL" => Some(Modifier::LeftCtrl),
            "RIGHT_CTRL" => Some(Modifier::RightCtrl),
            "LEFT_META" => Some(Modifier::LeftMeta),
            "RIGHT_META" => Some(Modifier::RightMeta),
            "LEFT_SHIFT" => Some(Modifier::LeftShift),
            "RIGHT_SHIFT" => Some(Modifier::RightShift),
            "LEFT_ALT" => Some(Modifier::LeftAlt),
            "RIGHT_ALT" => Some(Modifier::RightAlt),
            _ => None,
        }
    }

    /// Display name matching Linux input-event-codes naming.
    pub fn name(self) -> &'static str {
        match self {
            Modifier::LeftCtrl => "LEFT_CTRL",
            Modifier::RightCtrl => "RIGHT_CTRL",
            Modifier::LeftMeta => "LEFT_META",
            Modifier::RightMeta => "RIGHT_META",
            Modifier::LeftShift => "LEFT_SHIFT",
            Modifier::RightShift => "RIGHT_SHIFT",
            Modifier::LeftAlt => "LEFT_ALT",
            Modifier::RightAlt => "RIGHT_ALT",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_modifier_code_all_eight() {
        assert!(is_modifier_code(29)); // LEFT_CTRL
        assert!(is_modifier_code(97)); // RIGHT_CTRL
        assert!(is_modifier_code(125)); // LEFT_META
        assert!(is_modifier_code(126)); // RIGHT_META
        assert!(is_modifier_code(42)); // LEFT_SHIFT
        assert!(is_modifier_code(54)); // RIGHT_SHIFT
        assert!(is_modifier_code(56)); // LEFT_ALT
        assert!(is_modifier_code(100)); // RIGHT_ALT
    }

    #[test]
    fn test_is_modifier_code_non_modifiers() {
        assert!(!is_modifier_code(0));
        assert!(!is_modifier_code(30)); // A
        assert!(!is_modifier_code(57)); // SPACE
        assert!(!is_modifier_code(248));
        assert!(!is_modifier_code(255));
    }

    #[test]
    fn test_modifier_set_size() {
        let count = (0..=255u8).filter(|&c| is_modifier_code(c)).count();
        assert_eq!(count, 8);
    }

    #[test]
    fn test_from_code_round_trip() {
        for &code in &MODIFIER_KEYCODES {
            let modifier = Modifier::from_code(code).unwrap();
            assert_eq!(modifier.keycode().raw(), code);
        }
        assert_eq!(Modifier::from_code(30), None);
    }

    #[test]
    fn test_modifier_names() {
        assert_eq!(Modifier::LeftCtrl.name(), "LEFT_CTRL");
        assert_eq!(Modifier::RightAlt.to_string(), "RIGHT_ALT");
    }

    #[test]
    fn test_from_name_round_trip() {
        for &code in &MODIFIER_KEYCODES {
            let modifier = Modifier::from_code(code).unwrap();
            assert_eq!(Modifier::from_name(modifier.name()), Some(modifier));
        }
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Modifier::from_name("left_shift"), Some(Modifier::LeftShift));
        assert_eq!(Modifier::from_name("Right_Ctrl"), Some(Modifier::RightCtrl));
        assert_eq!(Modifier::from_name("SHIFT"), None);
        assert_eq!(Modifier::from_name(""), None);
    }
}
