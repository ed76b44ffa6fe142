//! PostInputUseCase: the synthesis path.
//!
//! Given a canonical event, composes the platform-native injection
//! request(s) and submits them through the [`InputInjector`]. The interesting
//! work is coordinate normalization: logical virtual-desktop pixels are
//! shifted into an all-positive space (multi-monitor layouts can place
//! displays at negative coordinates), nudged off the exact origin (injecting
//! at literal (0,0) flickers the monitor on Windows), then rescaled into the
//! fixed 16-bit range the native injection API expects.
//!
//! A button press or release that also needs the cursor at the event
//! position is two injection calls (Move first, then the button), each
//! checked independently. No call is ever retried here; retry policy belongs
//! to the caller.

use std::sync::Arc;

use tap_core::domain::event::{
    EventKind, InputEvent, MouseButton, MouseData, WheelDirection,
};
use tap_core::keymap::keycode::KeyCode;
use tap_core::keymap::KeyTranslator;
use thiserror::Error;
use tracing::{debug, warn};

/// The native absolute-coordinate range: positions are rescaled to
/// `0..65536` per axis before injection.
pub const INJECTION_RANGE: i32 = 1 << 16;

/// Virtual key codes that need the extended-key flag when synthesized, so
/// the OS does not confuse them with their numeric-keypad twins: arrows,
/// Home/End, PageUp/PageDown, Insert, Delete.
const EXTENDED_VKS: [u16; 10] = [
    0x26, // VK_UP
    0x28, // VK_DOWN
    0x25, // VK_LEFT
    0x27, // VK_RIGHT
    0x24, // VK_HOME
    0x23, // VK_END
    0x21, // VK_PRIOR
    0x22, // VK_NEXT
    0x2D, // VK_INSERT
    0x2E, // VK_DELETE
];

/// Error type for the synthesis path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostError {
    /// The event type is derived/informational and cannot be synthesized,
    /// or a button event named no button.
    #[error("event cannot be synthesized")]
    UnsupportedEvent,

    /// The logical key has no native code; the event is aborted rather than
    /// guessed.
    #[error("no native key code for logical key {0:?}")]
    KeyMappingFailed(KeyCode),

    /// The OS injection call failed.
    #[error("native input injection failed: {0}")]
    InjectionFailed(String),

    /// An injector backend ran out of memory composing the native request.
    #[error("out of memory while composing injection request")]
    OutOfMemory,
}

/// A composed, platform-shaped injection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionRequest {
    /// Press or release a key. `extended` carries the extended-key flag.
    Keyboard {
        vk_code: u16,
        press: bool,
        extended: bool,
    },
    /// Press or release a mouse button at the current cursor position.
    MouseButton { button: MouseButton, press: bool },
    /// Move the cursor to an absolute position, already rescaled into
    /// `0..INJECTION_RANGE`.
    MouseMove { dx: i32, dy: i32 },
    /// Rotate the wheel by a signed native delta.
    MouseWheel { delta: i32, horizontal: bool },
}

/// Submits one composed request to the OS.
pub trait InputInjector: Send + Sync {
    fn inject(&self, request: &InjectionRequest) -> Result<(), PostError>;
}

/// Display geometry needed for coordinate normalization.
pub trait DisplayMetrics: Send + Sync {
    /// (width, height) of the virtual desktop in pixels.
    fn virtual_screen_size(&self) -> (i32, i32);

    /// Most negative (left, top) coordinates across all display surfaces;
    /// (0, 0) when every display sits at non-negative coordinates.
    fn largest_negative_coordinates(&self) -> (i32, i32);
}

/// The synthesis use case.
pub struct PostInputUseCase {
    injector: Arc<dyn InputInjector>,
    display: Arc<dyn DisplayMetrics>,
    keys: Arc<dyn KeyTranslator>,
}

impl PostInputUseCase {
    /// Creates the composer with the given collaborators.
    pub fn new(
        injector: Arc<dyn InputInjector>,
        display: Arc<dyn DisplayMetrics>,
        keys: Arc<dyn KeyTranslator>,
    ) -> Self {
        Self {
            injector,
            display,
            keys,
        }
    }

    /// Synthesizes the event, moving the cursor to the event position first
    /// for button events.
    ///
    /// # Errors
    ///
    /// Returns [`PostError`]; see the variants for the failure modes.
    pub fn post_event(&self, event: &InputEvent) -> Result<(), PostError> {
        self.post(event, true)
    }

    /// Synthesizes the event without the implicit cursor move. The caller
    /// asserts the cursor is already at the right position.
    ///
    /// # Errors
    ///
    /// Returns [`PostError`]; see the variants for the failure modes.
    pub fn post_event_without_cursor_move(&self, event: &InputEvent) -> Result<(), PostError> {
        self.post(event, false)
    }

    fn post(&self, event: &InputEvent, move_cursor: bool) -> Result<(), PostError> {
        match &event.kind {
            EventKind::KeyPressed(k) => self.post_key(event, k.keycode, true),
            EventKind::KeyReleased(k) => self.post_key(event, k.keycode, false),

            EventKind::MousePressed(m) => self.post_button(m, true, move_cursor),
            EventKind::MouseReleased(m) => self.post_button(m, false, move_cursor),

            EventKind::MouseMoved(m) | EventKind::MouseDragged(m) => {
                let (dx, dy) = self.normalized_position(m.x, m.y);
                self.injector.inject(&InjectionRequest::MouseMove { dx, dy })
            }

            EventKind::MouseWheel(w) => {
                let delta = i32::from(w.amount) * i32::from(w.rotation);
                self.injector.inject(&InjectionRequest::MouseWheel {
                    delta,
                    horizontal: w.direction == WheelDirection::Horizontal,
                })
            }

            EventKind::KeyTyped(_)
            | EventKind::MouseClicked(_)
            | EventKind::HookEnabled
            | EventKind::HookDisabled => {
                debug!(type_code = event.kind.type_code(), "ignoring non-synthesizable event");
                Err(PostError::UnsupportedEvent)
            }
        }
    }

    fn post_key(&self, event: &InputEvent, keycode: KeyCode, press: bool) -> Result<(), PostError> {
        let vk_code = self
            .keys
            .logical_to_native(keycode)
            .ok_or(PostError::KeyMappingFailed(keycode))?;

        let extended = event.mask.shift() && EXTENDED_VKS.contains(&vk_code);

        self.injector.inject(&InjectionRequest::Keyboard {
            vk_code,
            press,
            extended,
        })
    }

    fn post_button(&self, data: &MouseData, press: bool, move_cursor: bool) -> Result<(), PostError> {
        if data.button == MouseButton::NoButton {
            warn!("no button specified for mouse button event");
            return Err(PostError::UnsupportedEvent);
        }

        if move_cursor {
            // The cursor must arrive before the button changes state; both
            // calls are checked on their own.
            let (dx, dy) = self.normalized_position(data.x, data.y);
            self.injector.inject(&InjectionRequest::MouseMove { dx, dy })?;
        }

        self.injector.inject(&InjectionRequest::MouseButton {
            button: data.button,
            press,
        })
    }

    /// Shifts a logical position into the all-positive space, nudges it off
    /// the exact origin, and rescales each axis into `0..INJECTION_RANGE`.
    fn normalized_position(&self, x: i16, y: i16) -> (i32, i32) {
        let (width, height) = self.display.virtual_screen_size();
        let (left, top) = self.display.largest_negative_coordinates();

        let mut x = i32::from(x) + left.abs();
        let mut y = i32::from(y) + top.abs();

        // Injecting at the literal origin makes some monitors flicker.
        if x == 0 {
            x += 1;
        }
        if y == 0 {
            y += 1;
        }

        (rescale(x, width), rescale(y, height))
    }
}

fn rescale(value: i32, dimension: i32) -> i32 {
    if dimension <= 0 {
        return 0;
    }
    (i64::from(value) * i64::from(INJECTION_RANGE) / i64::from(dimension)) as i32
}

// ── Tests ─────────────────────────────────────────────────────────────────────
