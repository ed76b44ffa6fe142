//! The event translation and state-tracking core.
//!
//! [`EventTranslator`] converts raw, per-notification facts (a button went
//! down at (x, y) at time t) into canonical events enriched with derived
//! state: the modifier mask snapshot, multi-click counts, drag-vs-move
//! classification, and normalized wheel attributes.
//!
//! All state lives in this one struct and has a single writer: the hook
//! thread that feeds it. The host wraps the translator (together with its
//! dispatcher) in one mutex when the OS can deliver keyboard and mouse
//! notifications from more than one place; the translator itself takes no
//! locks.
//!
//! Ordering matters in two places and is part of the contract:
//!
//! - A press sets the corresponding mask bit *before* the event snapshot is
//!   taken, and a release clears it before its snapshot, so a MousePressed
//!   mask includes its own button and a MouseReleased mask does not.
//! - [`EventTranslator::button_released`] builds both the Released event and
//!   the Clicked candidate before applying the stale-streak reset, so both
//!   carry the pre-reset click count.

use tracing::{debug, warn};

use crate::domain::event::{
    EventKind, InputEvent, KeyboardData, MouseButton, MouseData, WheelData, WheelDirection,
    WheelScroll,
};
use crate::domain::mask::ModifierMask;
use crate::keymap::keycode::KeyCode;

/// Default multi-click window in milliseconds, matching the common platform
/// double-click time.
pub const DEFAULT_MULTI_CLICK_INTERVAL_MS: u64 = 500;

/// OS wheel configuration, queried per wheel notification by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelProperties {
    /// Line or page scrolling.
    pub scroll: WheelScroll,
    /// Lines per notch; 1 when `scroll` is [`WheelScroll::Block`].
    pub amount: u16,
}

/// Result of processing a button release.
///
/// The host dispatches `released` first; `click_candidate` (present only
/// when the release landed on the recorded press position) is dispatched
/// only if the release was not consumed by the sink.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseOutcome {
    pub released: InputEvent,
    pub click_candidate: Option<InputEvent>,
}

/// The state machine behind every canonical event.
#[derive(Debug)]
pub struct EventTranslator {
    mask: ModifierMask,
    multi_click_interval_ms: u64,
    click_count: u16,
    click_button: MouseButton,
    click_time: u64,
    last_click: (i16, i16),
}

impl EventTranslator {
    /// Creates a translator with empty state and the given multi-click window.
    pub fn new(multi_click_interval_ms: u64) -> Self {
        Self {
            mask: ModifierMask::empty(),
            multi_click_interval_ms,
            click_count: 0,
            click_button: MouseButton::NoButton,
            click_time: 0,
            last_click: (0, 0),
        }
    }

    /// Current modifier mask snapshot.
    pub fn mask(&self) -> ModifierMask {
        self.mask
    }

    /// Replaces the mask wholesale. Used at hook start and after a hook
    /// restart, when the host has re-queried the OS key state.
    pub fn set_mask(&mut self, mask: ModifierMask) {
        self.mask = mask;
    }

    /// The configured multi-click window in milliseconds.
    pub fn multi_click_interval_ms(&self) -> u64 {
        self.multi_click_interval_ms
    }

    /// Reconfigures the multi-click window at runtime.
    pub fn set_multi_click_interval_ms(&mut self, interval_ms: u64) {
        self.multi_click_interval_ms = interval_ms;
    }

    /// Clears all derived state. No partial click streak or mask bit survives
    /// a stop/start cycle.
    pub fn reset(&mut self) {
        self.mask = ModifierMask::empty();
        self.click_count = 0;
        self.click_button = MouseButton::NoButton;
        self.click_time = 0;
        self.last_click = (0, 0);
    }

    // ── Lifecycle events ──────────────────────────────────────────────────────

    /// Builds the HookEnabled lifecycle event.
    pub fn hook_enabled(&self, now: u64) -> InputEvent {
        InputEvent::new(now, ModifierMask::empty(), EventKind::HookEnabled)
    }

    /// Builds the HookDisabled lifecycle event.
    pub fn hook_disabled(&self, now: u64) -> InputEvent {
        InputEvent::new(now, ModifierMask::empty(), EventKind::HookDisabled)
    }

    // ── Keyboard ──────────────────────────────────────────────────────────────

    /// Processes a key-down notification: updates the mask when the key is a
    /// tracked modifier/lock key, then emits KeyPressed.
    pub fn key_pressed(&mut self, now: u64, keycode: KeyCode, rawcode: u16) -> InputEvent {
        if let Some(bit) = ModifierMask::bit_for_key(keycode) {
            self.mask.set(bit);
        }

        debug!(keycode = ?keycode, rawcode, "key pressed");
        InputEvent::new(
            now,
            self.mask,
            EventKind::KeyPressed(KeyboardData {
                keycode,
                rawcode,
                keychar: None,
            }),
        )
    }

    /// Processes a key-up notification: the mirror of [`Self::key_pressed`].
    pub fn key_released(&mut self, now: u64, keycode: KeyCode, rawcode: u16) -> InputEvent {
        if let Some(bit) = ModifierMask::bit_for_key(keycode) {
            self.mask.clear(bit);
        }

        debug!(keycode = ?keycode, rawcode, "key released");
        InputEvent::new(
            now,
            self.mask,
            EventKind::KeyReleased(KeyboardData {
                keycode,
                rawcode,
                keychar: None,
            }),
        )
    }

    /// Builds one KeyTyped event for a character produced by an unconsumed
    /// key press. Typed events carry [`KeyCode::Undefined`]; the character is
    /// the payload.
    pub fn key_typed(&self, now: u64, rawcode: u16, ch: char) -> InputEvent {
        InputEvent::new(
            now,
            self.mask,
            EventKind::KeyTyped(KeyboardData {
                keycode: KeyCode::Undefined,
                rawcode,
                keychar: Some(ch),
            }),
        )
    }

    // ── Mouse buttons ─────────────────────────────────────────────────────────

    /// Processes a button-down notification.
    ///
    /// Extends the click streak when the button matches the previous one and
    /// the press falls inside the multi-click window; otherwise starts a new
    /// streak at count 1. The count saturates at `u16::MAX` with a warning
    /// rather than wrapping.
    pub fn button_pressed(
        &mut self,
        now: u64,
        button: MouseButton,
        x: i16,
        y: i16,
    ) -> InputEvent {
        if let Some(bit) = button.mask_bit() {
            self.mask.set(bit);
        }

        if button == self.click_button
            && now.saturating_sub(self.click_time) <= self.multi_click_interval_ms
        {
            if self.click_count < u16::MAX {
                self.click_count += 1;
            } else {
                warn!("click count overflow detected, clamping");
            }
        } else {
            self.click_count = 1;
            self.click_button = button;
        }

        self.click_time = now;
        self.last_click = (x, y);

        debug!(
            button = button.as_u16(),
            clicks = self.click_count,
            x,
            y,
            "button pressed"
        );
        InputEvent::new(
            now,
            self.mask,
            EventKind::MousePressed(MouseData {
                button,
                clicks: self.click_count,
                x,
                y,
            }),
        )
    }

    /// Processes a button-up notification.
    ///
    /// The Released event always carries the current click count, even for
    /// a release whose press was never observed (degraded accuracy, never a
    /// failure). A Clicked candidate is produced when the release position
    /// equals the recorded press position; the host dispatches it only when
    /// the release was not consumed. A streak whose window has lapsed by
    /// release time is reset to 0 afterwards.
    pub fn button_released(
        &mut self,
        now: u64,
        button: MouseButton,
        x: i16,
        y: i16,
    ) -> ReleaseOutcome {
        if let Some(bit) = button.mask_bit() {
            self.mask.clear(bit);
        }

        let data = MouseData {
            button,
            clicks: self.click_count,
            x,
            y,
        };
        debug!(
            button = button.as_u16(),
            clicks = self.click_count,
            x,
            y,
            "button released"
        );
        let released = InputEvent::new(now, self.mask, EventKind::MouseReleased(data));

        let click_candidate = if self.last_click == (x, y) {
            Some(InputEvent::new(now, self.mask, EventKind::MouseClicked(data)))
        } else {
            None
        };

        if button == self.click_button
            && now.saturating_sub(self.click_time) > self.multi_click_interval_ms
        {
            self.click_count = 0;
        }

        ReleaseOutcome {
            released,
            click_candidate,
        }
    }

    // ── Motion ────────────────────────────────────────────────────────────────

    /// Processes a pointer-move notification.
    ///
    /// Returns `None` when the position equals the last recorded click
    /// position; those are artifact moves accompanying a click, not real
    /// motion. Otherwise classifies the motion as Dragged iff any button bit
    /// is held, expiring a lapsed click streak first.
    pub fn pointer_moved(&mut self, now: u64, x: i16, y: i16) -> Option<InputEvent> {
        if self.last_click == (x, y) {
            return None;
        }

        if self.click_count != 0
            && now.saturating_sub(self.click_time) > self.multi_click_interval_ms
        {
            self.click_count = 0;
        }

        let dragged = self.mask.any_button();
        let data = MouseData {
            button: MouseButton::NoButton,
            clicks: self.click_count,
            x,
            y,
        };
        debug!(dragged, x, y, "pointer moved");
        let kind = if dragged {
            EventKind::MouseDragged(data)
        } else {
            EventKind::MouseMoved(data)
        };
        Some(InputEvent::new(now, self.mask, kind))
    }

    // ── Wheel ─────────────────────────────────────────────────────────────────

    /// Processes a wheel notification.
    ///
    /// Wheel activity must not fold into a later click's multi-click count,
    /// so the tracked click button is cleared and the count rewound to 1.
    /// `rotation` is the platform's native signed delta; the vertical axis is
    /// inverted here so that positive rotation means toward the user on every
    /// platform.
    pub fn wheel_rotated(
        &mut self,
        now: u64,
        rotation: i16,
        direction: WheelDirection,
        x: i16,
        y: i16,
        props: WheelProperties,
    ) -> InputEvent {
        self.click_count = 1;
        self.click_button = MouseButton::NoButton;

        let rotation = match direction {
            WheelDirection::Vertical => -rotation,
            WheelDirection::Horizontal => rotation,
        };

        debug!(
            rotation,
            direction = ?direction,
            amount = props.amount,
            x,
            y,
            "wheel rotated"
        );
        InputEvent::new(
            now,
            self.mask,
            EventKind::MouseWheel(WheelData {
                scroll: props.scroll,
                amount: props.amount,
                rotation,
                direction,
                x,
                y,
            }),
        )
    }
}

impl Default for EventTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_MULTI_CLICK_INTERVAL_MS)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
