//! System state services: key-state probing, wheel configuration, key
//! translation, and display geometry.
//!
//! The portable implementations in this module back tests and the demo
//! binary on platforms without a native backend; `windows.rs` holds the real
//! OS-querying implementations.

use tap_core::domain::event::WheelScroll;
use tap_core::domain::mask::ModifierMask;
use tap_core::domain::translator::WheelProperties;
use tap_core::keymap::keycode::KeyCode;
use tap_core::keymap::{windows_vk, KeyTranslator};

use crate::application::observe_input::{ModifierProbe, WheelSettingsSource};
use crate::application::post_input::DisplayMetrics;

#[cfg(target_os = "windows")]
pub mod windows;

// ── Key translation ───────────────────────────────────────────────────────────

/// Table-backed key translator assuming a US layout.
///
/// Code-to-code translation is exact; character resolution is layout-static
/// and modifier-blind (it reports the base, unshifted character a key
/// produces on a US keyboard). The Windows implementation replaces this with
/// the OS's layout-aware resolution.
pub struct UsLayoutKeyTranslator;

impl KeyTranslator for UsLayoutKeyTranslator {
    fn native_to_logical(&self, rawcode: u16, extended: bool) -> KeyCode {
        windows_vk::vk_to_key(rawcode, extended)
    }

    fn logical_to_native(&self, key: KeyCode) -> Option<u16> {
        windows_vk::key_to_vk(key)
    }

    fn native_to_unicode(&self, rawcode: u16) -> Vec<char> {
        base_us_char(rawcode).map(|ch| vec![ch]).unwrap_or_default()
    }
}

/// Base (unshifted) US-layout character for a virtual key code.
fn base_us_char(vk: u16) -> Option<char> {
    match vk {
        // Letters report lowercase; shift/caps handling needs real OS state.
        0x41..=0x5A => char::from_u32(u32::from(vk) + 0x20),
        0x30..=0x39 => char::from_u32(u32::from(vk)),
        0x60..=0x69 => char::from_u32(u32::from(vk) - 0x30), // numpad digits
        0x20 => Some(' '),
        0x0D => Some('\r'),
        0x09 => Some('\t'),
        0x6A => Some('*'),
        0x6B => Some('+'),
        0x6D => Some('-'),
        0x6E => Some('.'),
        0x6F => Some('/'),
        0xBA => Some(';'),
        0xBB => Some('='),
        0xBC => Some(','),
        0xBD => Some('-'),
        0xBE => Some('.'),
        0xBF => Some('/'),
        0xC0 => Some('`'),
        0xDB => Some('['),
        0xDC => Some('\\'),
        0xDD => Some(']'),
        0xDE => Some('\''),
        _ => None,
    }
}

// ── Modifier probing ──────────────────────────────────────────────────────────

/// Probe reporting a fixed mask, for tests and hosts without key-state
/// queries.
pub struct FixedModifierProbe(pub ModifierMask);

impl ModifierProbe for FixedModifierProbe {
    fn current_mask(&self) -> ModifierMask {
        self.0
    }
}

// ── Wheel configuration ───────────────────────────────────────────────────────

/// Wheel settings source with a fixed configuration.
pub struct StaticWheelSettings {
    props: WheelProperties,
}

impl StaticWheelSettings {
    pub fn new(scroll: WheelScroll, amount: u16) -> Self {
        Self {
            props: WheelProperties { scroll, amount },
        }
    }
}

impl WheelSettingsSource for StaticWheelSettings {
    fn wheel_properties(&self) -> WheelProperties {
        self.props
    }
}

// ── Display geometry ──────────────────────────────────────────────────────────

/// Display metrics with fixed geometry, for tests and headless runs.
pub struct StaticDisplayMetrics {
    size: (i32, i32),
    negative: (i32, i32),
}

impl StaticDisplayMetrics {
    pub fn new(size: (i32, i32), negative: (i32, i32)) -> Self {
        Self { size, negative }
    }
}

impl DisplayMetrics for StaticDisplayMetrics {
    fn virtual_screen_size(&self) -> (i32, i32) {
        self.size
    }

    fn largest_negative_coordinates(&self) -> (i32, i32) {
        self.negative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_translator_round_trips_code_directions() {
        let translator = UsLayoutKeyTranslator;
        let key = translator.native_to_logical(0x41, false);
        assert_eq!(key, KeyCode::KeyA);
        assert_eq!(translator.logical_to_native(key), Some(0x41));
    }

    #[test]
    fn test_us_translator_resolves_base_characters() {
        let translator = UsLayoutKeyTranslator;
        assert_eq!(translator.native_to_unicode(0x41), vec!['a']);
        assert_eq!(translator.native_to_unicode(0x31), vec!['1']);
        assert_eq!(translator.native_to_unicode(0xBA), vec![';']);
    }

    #[test]
    fn test_us_translator_yields_nothing_for_non_printing_keys() {
        let translator = UsLayoutKeyTranslator;
        // F5, Left Shift, Escape.
        for vk in [0x74u16, 0xA0, 0x1B] {
            assert!(translator.native_to_unicode(vk).is_empty());
        }
    }

    #[test]
    fn test_numpad_digits_resolve_to_digits() {
        let translator = UsLayoutKeyTranslator;
        assert_eq!(translator.native_to_unicode(0x60), vec!['0']);
        assert_eq!(translator.native_to_unicode(0x69), vec!['9']);
    }
}
