//! ObserveInputUseCase: the observation pipeline.
//!
//! Receives raw notifications from the hook backend, drives the
//! [`EventTranslator`] state machine, dispatches every canonical event to
//! the registered sink, and turns the sink's consumed verdict into a
//! suppression decision for the native layer.
//!
//! Everything here runs synchronously on the hook backend's thread. The
//! derived-event rules live here because they depend on dispatch results:
//!
//! - An unconsumed KeyPressed is followed by one KeyTyped per character the
//!   key resolves to, in typing order.
//! - An unconsumed MouseReleased at the press position is followed by a
//!   MouseClicked with the same click count.
//!
//! Malformed notifications (a button event naming no button) are logged and
//! dropped; they are never fatal and never reach the sink.

use std::sync::Arc;

use tap_core::clock::Clock;
use tap_core::dispatch::{Dispatcher, EventSink};
use tap_core::domain::event::MouseButton;
use tap_core::domain::mask::ModifierMask;
use tap_core::domain::translator::{EventTranslator, WheelProperties};
use tap_core::keymap::KeyTranslator;
use tracing::{debug, warn};

use crate::infrastructure::hook::{
    Disposition, RawEventHandler, RawKeyEvent, RawMouseEvent,
};

/// Queries the OS for the currently held modifier/button/lock keys.
///
/// Used once at hook start and again after a hook restart; between those
/// points the mask is maintained incrementally and never re-queried.
pub trait ModifierProbe: Send + Sync {
    /// Builds the full modifier mask from current OS key state.
    fn current_mask(&self) -> ModifierMask;
}

/// Queries the OS wheel configuration (lines per notch / page scrolling).
pub trait WheelSettingsSource: Send + Sync {
    fn wheel_properties(&self) -> WheelProperties;
}

/// The observation pipeline use case.
pub struct ObserveInputUseCase {
    translator: EventTranslator,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
    keys: Arc<dyn KeyTranslator>,
    probe: Arc<dyn ModifierProbe>,
    wheel: Arc<dyn WheelSettingsSource>,
}

impl ObserveInputUseCase {
    /// Creates the pipeline with the given collaborators and multi-click
    /// window.
    pub fn new(
        clock: Arc<dyn Clock>,
        keys: Arc<dyn KeyTranslator>,
        probe: Arc<dyn ModifierProbe>,
        wheel: Arc<dyn WheelSettingsSource>,
        multi_click_interval_ms: u64,
    ) -> Self {
        Self {
            translator: EventTranslator::new(multi_click_interval_ms),
            dispatcher: Dispatcher::new(),
            clock,
            keys,
            probe,
            wheel,
        }
    }

    /// Registers the dispatch sink; the previous registration is replaced.
    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.dispatcher.set_sink(sink);
    }

    /// Removes the dispatch sink.
    pub fn clear_sink(&mut self) {
        self.dispatcher.clear_sink();
    }

    /// The configured multi-click window in milliseconds.
    pub fn multi_click_interval_ms(&self) -> u64 {
        self.translator.multi_click_interval_ms()
    }

    /// Reconfigures the multi-click window at runtime.
    pub fn set_multi_click_interval_ms(&mut self, interval_ms: u64) {
        self.translator.set_multi_click_interval_ms(interval_ms);
    }

    /// Current modifier mask snapshot (primarily for diagnostics).
    pub fn mask(&self) -> ModifierMask {
        self.translator.mask()
    }

    /// Rebuilds the modifier mask from OS key state. Hosts that re-register
    /// their hooks mid-session call this right after the re-registration.
    pub fn reinitialize_modifiers(&mut self) {
        self.translator.set_mask(self.probe.current_mask());
        debug!(mask = self.translator.mask().bits(), "modifier mask reinitialized");
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Emits HookEnabled and initializes modifier state from the OS.
    pub fn on_hook_start(&mut self) {
        self.translator.reset();
        self.reinitialize_modifiers();
        let mut event = self.translator.hook_enabled(self.clock.now_ms());
        self.dispatcher.dispatch(&mut event);
    }

    /// Emits HookDisabled and clears all derived state so nothing carries
    /// across a stop/start cycle.
    pub fn on_hook_stop(&mut self) {
        let mut event = self.translator.hook_disabled(self.clock.now_ms());
        self.dispatcher.dispatch(&mut event);
        self.translator.reset();
    }

    // ── Feed points ───────────────────────────────────────────────────────────

    /// Processes one raw keyboard notification.
    pub fn on_native_key_event(&mut self, raw: RawKeyEvent) -> Disposition {
        let now = self.clock.now_ms();
        let keycode = self.keys.native_to_logical(raw.vk_code, raw.extended);

        if raw.pressed {
            let mut pressed = self.translator.key_pressed(now, keycode, raw.vk_code);
            let consumed = self.dispatcher.dispatch(&mut pressed);

            if !consumed {
                for ch in self.keys.native_to_unicode(raw.vk_code) {
                    let mut typed = self.translator.key_typed(now, raw.vk_code, ch);
                    self.dispatcher.dispatch(&mut typed);
                }
            }

            disposition(consumed)
        } else {
            let mut released = self.translator.key_released(now, keycode, raw.vk_code);
            let consumed = self.dispatcher.dispatch(&mut released);
            disposition(consumed)
        }
    }

    /// Processes one raw mouse notification.
    pub fn on_native_mouse_event(&mut self, raw: RawMouseEvent) -> Disposition {
        let now = self.clock.now_ms();
        match raw {
            RawMouseEvent::Button {
                button: MouseButton::NoButton,
                ..
            } => {
                // Malformed: logged and dropped, never dispatched.
                warn!("mouse button notification without a button, dropping");
                Disposition::Propagate
            }
            RawMouseEvent::Button {
                button,
                pressed: true,
                x,
                y,
                ..
            } => {
                let mut event = self.translator.button_pressed(now, button, x as i16, y as i16);
                disposition(self.dispatcher.dispatch(&mut event))
            }
            RawMouseEvent::Button {
                button,
                pressed: false,
                x,
                y,
                ..
            } => {
                let outcome = self.translator.button_released(now, button, x as i16, y as i16);
                let mut released = outcome.released;
                let consumed = self.dispatcher.dispatch(&mut released);

                if !consumed {
                    if let Some(mut clicked) = outcome.click_candidate {
                        self.dispatcher.dispatch(&mut clicked);
                    }
                }

                disposition(consumed)
            }
            RawMouseEvent::Move { x, y, .. } => {
                match self.translator.pointer_moved(now, x as i16, y as i16) {
                    Some(mut event) => disposition(self.dispatcher.dispatch(&mut event)),
                    None => Disposition::Propagate,
                }
            }
            RawMouseEvent::Wheel {
                rotation,
                direction,
                x,
                y,
                ..
            } => {
                let props: WheelProperties = self.wheel.wheel_properties();
                let mut event = self.translator.wheel_rotated(
                    now,
                    rotation,
                    direction,
                    x as i16,
                    y as i16,
                    props,
                );
                disposition(self.dispatcher.dispatch(&mut event))
            }
        }
    }
}

impl RawEventHandler for ObserveInputUseCase {
    fn hook_enabled(&mut self) {
        self.on_hook_start();
    }

    fn hook_disabled(&mut self) {
        self.on_hook_stop();
    }

    fn handle_key(&mut self, event: RawKeyEvent) -> Disposition {
        self.on_native_key_event(event)
    }

    fn handle_mouse(&mut self, event: RawMouseEvent) -> Disposition {
        self.on_native_mouse_event(event)
    }
}

fn disposition(consumed: bool) -> Disposition {
    if consumed {
        Disposition::Suppress
    } else {
        Disposition::Propagate
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
