//! The modifier mask: which modifier keys, mouse buttons, and lock keys are
//! held at a given moment.
//!
//! The mask is initialized once from the OS when the hook starts and updated
//! incrementally on every matching press/release afterwards; it is never
//! re-queried wholesale mid-session. Invariant: the bit for key K is set iff
//! the most recently processed event for K was a press not yet followed by
//! its release. Lock keys are tracked the same way (held, not toggled).

use serde::{Deserialize, Serialize};

use crate::keymap::keycode::KeyCode;

/// Bitmask snapshot of held modifier keys, mouse buttons, and lock keys.
///
/// Bit layout:
/// - Bit 0: Left Shift
/// - Bit 1: Left Ctrl
/// - Bit 2: Left Meta (Windows/Command/Super)
/// - Bit 3: Left Alt
/// - Bit 4: Right Shift
/// - Bit 5: Right Ctrl
/// - Bit 6: Right Meta
/// - Bit 7: Right Alt
/// - Bits 8–12: mouse buttons 1–5
/// - Bit 13: Num Lock
/// - Bit 14: Caps Lock
/// - Bit 15: Scroll Lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierMask(pub u16);

impl ModifierMask {
    pub const SHIFT_L: u16 = 1 << 0;
    pub const CTRL_L: u16 = 1 << 1;
    pub const META_L: u16 = 1 << 2;
    pub const ALT_L: u16 = 1 << 3;
    pub const SHIFT_R: u16 = 1 << 4;
    pub const CTRL_R: u16 = 1 << 5;
    pub const META_R: u16 = 1 << 6;
    pub const ALT_R: u16 = 1 << 7;
    pub const BUTTON1: u16 = 1 << 8;
    pub const BUTTON2: u16 = 1 << 9;
    pub const BUTTON3: u16 = 1 << 10;
    pub const BUTTON4: u16 = 1 << 11;
    pub const BUTTON5: u16 = 1 << 12;
    pub const NUM_LOCK: u16 = 1 << 13;
    pub const CAPS_LOCK: u16 = 1 << 14;
    pub const SCROLL_LOCK: u16 = 1 << 15;

    /// All five mouse-button bits.
    pub const ANY_BUTTON: u16 =
        Self::BUTTON1 | Self::BUTTON2 | Self::BUTTON3 | Self::BUTTON4 | Self::BUTTON5;

    /// An empty mask.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns the raw bit value.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Sets the given bit(s).
    pub fn set(&mut self, bits: u16) {
        self.0 |= bits;
    }

    /// Clears the given bit(s).
    pub fn clear(&mut self, bits: u16) {
        self.0 &= !bits;
    }

    /// Returns `true` if any of the given bits are set.
    pub fn contains(self, bits: u16) -> bool {
        self.0 & bits != 0
    }

    /// Returns `true` if either Shift is held.
    pub fn shift(self) -> bool {
        self.contains(Self::SHIFT_L | Self::SHIFT_R)
    }

    /// Returns `true` if either Ctrl is held.
    pub fn ctrl(self) -> bool {
        self.contains(Self::CTRL_L | Self::CTRL_R)
    }

    /// Returns `true` if either Alt is held.
    pub fn alt(self) -> bool {
        self.contains(Self::ALT_L | Self::ALT_R)
    }

    /// Returns `true` if either Meta (Win/Cmd/Super) is held.
    pub fn meta(self) -> bool {
        self.contains(Self::META_L | Self::META_R)
    }

    /// Returns `true` if any mouse button 1–5 is held.
    pub fn any_button(self) -> bool {
        self.contains(Self::ANY_BUTTON)
    }

    /// Returns the mask bit tracked for a logical key, if the key is one of
    /// the tracked modifiers or lock keys.
    pub fn bit_for_key(key: KeyCode) -> Option<u16> {
        match key {
            KeyCode::ShiftLeft => Some(Self::SHIFT_L),
            KeyCode::ShiftRight => Some(Self::SHIFT_R),
            KeyCode::ControlLeft => Some(Self::CTRL_L),
            KeyCode::ControlRight => Some(Self::CTRL_R),
            KeyCode::AltLeft => Some(Self::ALT_L),
            KeyCode::AltRight => Some(Self::ALT_R),
            KeyCode::MetaLeft => Some(Self::META_L),
            KeyCode::MetaRight => Some(Self::META_R),
            KeyCode::NumLock => Some(Self::NUM_LOCK),
            KeyCode::CapsLock => Some(Self::CAPS_LOCK),
            KeyCode::ScrollLock => Some(Self::SCROLL_LOCK),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear_are_inverse() {
        // Arrange
        let mut mask = ModifierMask::empty();

        // Act
        mask.set(ModifierMask::SHIFT_L);
        mask.set(ModifierMask::BUTTON2);
        mask.clear(ModifierMask::SHIFT_L);

        // Assert
        assert!(!mask.contains(ModifierMask::SHIFT_L));
        assert!(mask.contains(ModifierMask::BUTTON2));
    }

    #[test]
    fn test_side_agnostic_predicates_cover_both_sides() {
        let mut left = ModifierMask::empty();
        left.set(ModifierMask::CTRL_L);
        let mut right = ModifierMask::empty();
        right.set(ModifierMask::CTRL_R);

        assert!(left.ctrl());
        assert!(right.ctrl());
        assert!(!left.shift());
    }

    #[test]
    fn test_any_button_reflects_each_of_the_five_buttons() {
        for bit in [
            ModifierMask::BUTTON1,
            ModifierMask::BUTTON2,
            ModifierMask::BUTTON3,
            ModifierMask::BUTTON4,
            ModifierMask::BUTTON5,
        ] {
            let mut mask = ModifierMask::empty();
            mask.set(bit);
            assert!(mask.any_button());
        }
        assert!(!ModifierMask::empty().any_button());
    }

    #[test]
    fn test_every_tracked_key_has_a_distinct_bit() {
        // Arrange
        let tracked = [
            KeyCode::ShiftLeft,
            KeyCode::ShiftRight,
            KeyCode::ControlLeft,
            KeyCode::ControlRight,
            KeyCode::AltLeft,
            KeyCode::AltRight,
            KeyCode::MetaLeft,
            KeyCode::MetaRight,
            KeyCode::NumLock,
            KeyCode::CapsLock,
            KeyCode::ScrollLock,
        ];

        // Act
        let mut bits: Vec<u16> = tracked
            .iter()
            .map(|&k| ModifierMask::bit_for_key(k).expect("tracked key must have a bit"))
            .collect();

        // Assert
        bits.sort_unstable();
        bits.dedup();
        assert_eq!(bits.len(), tracked.len());
    }

    #[test]
    fn test_untracked_keys_have_no_bit() {
        assert!(ModifierMask::bit_for_key(KeyCode::KeyA).is_none());
        assert!(ModifierMask::bit_for_key(KeyCode::Enter).is_none());
        assert!(ModifierMask::bit_for_key(KeyCode::Undefined).is_none());
    }
}
