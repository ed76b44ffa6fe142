//! The canonical input event model.
//!
//! Every observed or synthesized input action is represented by exactly one
//! [`InputEvent`]. The event carries a timestamp, a snapshot of the modifier
//! mask at the moment of the event, the consumed flag, and a variant-specific
//! payload. Events are plain values: each emission constructs a fresh
//! `InputEvent`, never a reused buffer, so an event handed to the sink can
//! never alias one still being prepared.

use serde::{Deserialize, Serialize};

use crate::domain::mask::ModifierMask;
use crate::keymap::keycode::KeyCode;

// ── Mouse buttons ─────────────────────────────────────────────────────────────

/// Mouse button identifier.
///
/// Wire values follow the 1-based button numbering shared by all platform
/// backends: 0 = no button, 1..5 = the standard buttons, and anything above 5
/// is carried verbatim as [`MouseButton::Extra`] so unusual pointing devices
/// still round-trip. Only buttons 1–5 participate in the modifier mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// No button involved (move events, wheel events).
    NoButton,
    /// Button 1, usually the left button.
    Left,
    /// Button 2, usually the right button.
    Right,
    /// Button 3, usually the wheel button.
    Middle,
    /// Button 4, usually "back".
    Button4,
    /// Button 5, usually "forward".
    Button5,
    /// A device-specific button beyond 5.
    Extra(u16),
}

impl MouseButton {
    /// Returns the numeric wire identifier for this button.
    pub fn as_u16(self) -> u16 {
        match self {
            MouseButton::NoButton => 0,
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 3,
            MouseButton::Button4 => 4,
            MouseButton::Button5 => 5,
            MouseButton::Extra(n) => n,
        }
    }

    /// Builds a button from its numeric wire identifier.
    ///
    /// Values 4 and 5 always map to [`MouseButton::Button4`] and
    /// [`MouseButton::Button5`], so a backend that reports them through an
    /// "extra button" path still produces the canonical identifier.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => MouseButton::NoButton,
            1 => MouseButton::Left,
            2 => MouseButton::Right,
            3 => MouseButton::Middle,
            4 => MouseButton::Button4,
            5 => MouseButton::Button5,
            n => MouseButton::Extra(n),
        }
    }

    /// Returns the modifier mask bit tracking this button, if it has one.
    ///
    /// Buttons beyond 5 are not part of the mask space.
    pub fn mask_bit(self) -> Option<u16> {
        match self {
            MouseButton::Left => Some(ModifierMask::BUTTON1),
            MouseButton::Right => Some(ModifierMask::BUTTON2),
            MouseButton::Middle => Some(ModifierMask::BUTTON3),
            MouseButton::Button4 => Some(ModifierMask::BUTTON4),
            MouseButton::Button5 => Some(ModifierMask::BUTTON5),
            MouseButton::NoButton | MouseButton::Extra(_) => None,
        }
    }
}

// ── Wheel attributes ──────────────────────────────────────────────────────────

/// Scroll unit reported by the OS wheel configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WheelScroll {
    /// Scroll a configured number of lines per notch.
    Unit = 0x01,
    /// Scroll a whole page per notch.
    Block = 0x02,
}

impl TryFrom<u8> for WheelScroll {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(WheelScroll::Unit),
            0x02 => Ok(WheelScroll::Block),
            _ => Err(()),
        }
    }
}

/// Axis of a wheel rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WheelDirection {
    Vertical = 0x03,
    Horizontal = 0x04,
}

impl TryFrom<u8> for WheelDirection {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x03 => Ok(WheelDirection::Vertical),
            0x04 => Ok(WheelDirection::Horizontal),
            _ => Err(()),
        }
    }
}

// ── Variant payloads ──────────────────────────────────────────────────────────

/// Payload for key pressed / released / typed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardData {
    /// Logical keycode (USB HID usage ID); [`KeyCode::Undefined`] for typed
    /// events, which are identified by their character instead.
    pub keycode: KeyCode,
    /// The platform-native key code the notification carried.
    pub rawcode: u16,
    /// The typed character, present only on [`EventKind::KeyTyped`].
    pub keychar: Option<char>,
}

/// Payload for mouse button and motion events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseData {
    /// Which button the event concerns; [`MouseButton::NoButton`] for motion.
    pub button: MouseButton,
    /// 1-based running click count of the active click streak, 0 when the
    /// streak has lapsed.
    pub clicks: u16,
    /// X position in logical virtual-desktop coordinates.
    pub x: i16,
    /// Y position in logical virtual-desktop coordinates.
    pub y: i16,
}

/// Payload for wheel events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelData {
    /// Line or page scrolling, from the OS wheel configuration.
    pub scroll: WheelScroll,
    /// Configured lines per notch (1 when `scroll` is [`WheelScroll::Block`]).
    pub amount: u16,
    /// Signed rotation magnitude in native delta units. Positive means
    /// toward the user / to the left, on every platform.
    pub rotation: i16,
    /// Axis of the rotation.
    pub direction: WheelDirection,
    /// X position of the pointer at the time of the event.
    pub x: i16,
    /// Y position of the pointer at the time of the event.
    pub y: i16,
}

// ── The event itself ──────────────────────────────────────────────────────────

/// Variant tag plus payload for a canonical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The hook started listening.
    HookEnabled,
    /// The hook stopped listening.
    HookDisabled,
    /// A key went down.
    KeyPressed(KeyboardData),
    /// A key came up.
    KeyReleased(KeyboardData),
    /// A key press produced a character (one event per character).
    KeyTyped(KeyboardData),
    /// A mouse button went down.
    MousePressed(MouseData),
    /// A mouse button came up.
    MouseReleased(MouseData),
    /// A press/release pair completed at the same position.
    MouseClicked(MouseData),
    /// The pointer moved with no button held.
    MouseMoved(MouseData),
    /// The pointer moved while at least one button was held.
    MouseDragged(MouseData),
    /// The wheel rotated.
    MouseWheel(WheelData),
}

impl EventKind {
    /// Returns the wire type code for this variant.
    pub fn type_code(&self) -> u8 {
        match self {
            EventKind::HookEnabled => 0x01,
            EventKind::HookDisabled => 0x02,
            EventKind::KeyPressed(_) => 0x03,
            EventKind::KeyReleased(_) => 0x04,
            EventKind::KeyTyped(_) => 0x05,
            EventKind::MousePressed(_) => 0x06,
            EventKind::MouseReleased(_) => 0x07,
            EventKind::MouseClicked(_) => 0x08,
            EventKind::MouseMoved(_) => 0x09,
            EventKind::MouseDragged(_) => 0x0A,
            EventKind::MouseWheel(_) => 0x0B,
        }
    }
}

/// One canonical input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Milliseconds since the Unix epoch (or the injected clock's substitute
    /// base). Only compared against other timestamps of the same session.
    pub time: u64,
    /// Snapshot of the modifier mask at the moment of the event.
    pub mask: ModifierMask,
    /// Set after dispatch when the sink asked for the native event to be
    /// suppressed.
    pub consumed: bool,
    /// Variant tag and payload.
    pub kind: EventKind,
}

impl InputEvent {
    /// Builds an event with the consumed flag cleared.
    pub fn new(time: u64, mask: ModifierMask, kind: EventKind) -> Self {
        Self {
            time,
            mask,
            consumed: false,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_wire_values_round_trip() {
        for value in [0u16, 1, 2, 3, 4, 5, 9, 31] {
            // Arrange / Act
            let button = MouseButton::from_u16(value);

            // Assert
            assert_eq!(button.as_u16(), value, "button {value} should round-trip");
        }
    }

    #[test]
    fn test_extra_button_numbers_four_and_five_collapse_to_named_buttons() {
        assert_eq!(MouseButton::from_u16(4), MouseButton::Button4);
        assert_eq!(MouseButton::from_u16(5), MouseButton::Button5);
    }

    #[test]
    fn test_only_standard_buttons_have_mask_bits() {
        assert!(MouseButton::Left.mask_bit().is_some());
        assert!(MouseButton::Button5.mask_bit().is_some());
        assert!(MouseButton::NoButton.mask_bit().is_none());
        assert!(MouseButton::Extra(7).mask_bit().is_none());
    }

    #[test]
    fn test_type_codes_are_distinct() {
        let data = MouseData {
            button: MouseButton::NoButton,
            clicks: 0,
            x: 0,
            y: 0,
        };
        let kinds = [
            EventKind::HookEnabled,
            EventKind::HookDisabled,
            EventKind::MousePressed(data),
            EventKind::MouseReleased(data),
            EventKind::MouseClicked(data),
            EventKind::MouseMoved(data),
            EventKind::MouseDragged(data),
        ];
        let mut codes: Vec<u8> = kinds.iter().map(EventKind::type_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len(), "type codes must not collide");
    }

    #[test]
    fn test_new_event_starts_unconsumed() {
        let event = InputEvent::new(42, ModifierMask::default(), EventKind::HookEnabled);
        assert!(!event.consumed);
        assert_eq!(event.time, 42);
    }
}
