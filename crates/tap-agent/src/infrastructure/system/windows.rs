//! Windows implementations of the system state services.
//!
//! # Safety
//!
//! This module uses `unsafe` exclusively for Windows API FFI calls. All
//! `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use tracing::warn;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyState, GetKeyboardState, MapVirtualKeyW, ToUnicode, MAPVK_VK_TO_VSC,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SystemParametersInfoW, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN,
    SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN, SPI_GETWHEELSCROLLLINES,
    SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
};

use tap_core::domain::event::WheelScroll;
use tap_core::domain::mask::ModifierMask;
use tap_core::domain::translator::WheelProperties;
use tap_core::keymap::keycode::KeyCode;
use tap_core::keymap::{windows_vk, KeyTranslator};

use crate::application::observe_input::{ModifierProbe, WheelSettingsSource};
use crate::application::post_input::DisplayMetrics;

/// `SPI_GETWHEELSCROLLLINES` reports this sentinel when the wheel is
/// configured for whole-page scrolling.
const WHEEL_PAGESCROLL: u32 = u32::MAX;

/// Tracked virtual keys and the mask bit each one maps to.
const PROBED_KEYS: [(u16, u16); 16] = [
    (0xA0, ModifierMask::SHIFT_L),     // VK_LSHIFT
    (0xA1, ModifierMask::SHIFT_R),     // VK_RSHIFT
    (0xA2, ModifierMask::CTRL_L),      // VK_LCONTROL
    (0xA3, ModifierMask::CTRL_R),      // VK_RCONTROL
    (0xA4, ModifierMask::ALT_L),       // VK_LMENU
    (0xA5, ModifierMask::ALT_R),       // VK_RMENU
    (0x5B, ModifierMask::META_L),      // VK_LWIN
    (0x5C, ModifierMask::META_R),      // VK_RWIN
    (0x01, ModifierMask::BUTTON1),     // VK_LBUTTON
    (0x02, ModifierMask::BUTTON2),     // VK_RBUTTON
    (0x04, ModifierMask::BUTTON3),     // VK_MBUTTON
    (0x05, ModifierMask::BUTTON4),     // VK_XBUTTON1
    (0x06, ModifierMask::BUTTON5),     // VK_XBUTTON2
    (0x90, ModifierMask::NUM_LOCK),    // VK_NUMLOCK
    (0x14, ModifierMask::CAPS_LOCK),   // VK_CAPITAL
    (0x91, ModifierMask::SCROLL_LOCK), // VK_SCROLL
];

// ── Modifier probe ────────────────────────────────────────────────────────────

/// Rebuilds the modifier mask from live key state via `GetKeyState`.
pub struct WindowsModifierProbe;

impl ModifierProbe for WindowsModifierProbe {
    fn current_mask(&self) -> ModifierMask {
        let mut mask = ModifierMask::empty();
        for (vk, bit) in PROBED_KEYS {
            // SAFETY: GetKeyState has no preconditions. The high-order bit of
            // the returned SHORT marks the key as held, so held keys read as
            // negative values.
            let state = unsafe { GetKeyState(i32::from(vk)) };
            if state < 0 {
                mask.set(bit);
            }
        }
        mask
    }
}

// ── Wheel settings ────────────────────────────────────────────────────────────

/// Queries the configured scroll-lines-per-notch via SystemParametersInfo.
pub struct WindowsWheelSettings;

impl WheelSettingsSource for WindowsWheelSettings {
    fn wheel_properties(&self) -> WheelProperties {
        let mut lines: u32 = 3;
        // SAFETY: pvparam points at a live u32, which is what
        // SPI_GETWHEELSCROLLLINES writes.
        let queried = unsafe {
            SystemParametersInfoW(
                SPI_GETWHEELSCROLLLINES,
                0,
                Some(&mut lines as *mut u32 as *mut core::ffi::c_void),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )
        };
        if let Err(e) = queried {
            warn!("SystemParametersInfo(SPI_GETWHEELSCROLLLINES) failed: {e}");
            lines = 3;
        }

        if lines == WHEEL_PAGESCROLL {
            WheelProperties {
                scroll: WheelScroll::Block,
                amount: 1,
            }
        } else {
            WheelProperties {
                scroll: WheelScroll::Unit,
                amount: lines as u16,
            }
        }
    }
}

// ── Key translation ───────────────────────────────────────────────────────────

/// Layout-aware key translator: table-backed code translation plus
/// `ToUnicode` character resolution against the live keyboard state.
pub struct WindowsKeyTranslator;

impl KeyTranslator for WindowsKeyTranslator {
    fn native_to_logical(&self, rawcode: u16, extended: bool) -> KeyCode {
        windows_vk::vk_to_key(rawcode, extended)
    }

    fn logical_to_native(&self, key: KeyCode) -> Option<u16> {
        windows_vk::key_to_vk(key)
    }

    fn native_to_unicode(&self, rawcode: u16) -> Vec<char> {
        let mut key_state = [0u8; 256];
        // SAFETY: the buffer is exactly the 256 bytes GetKeyboardState fills.
        if unsafe { GetKeyboardState(&mut key_state) }.is_err() {
            return Vec::new();
        }

        // SAFETY: MapVirtualKeyW has no preconditions.
        let scan = unsafe { MapVirtualKeyW(u32::from(rawcode), MAPVK_VK_TO_VSC) };

        // A key press yields at most a couple of UTF-16 units.
        let mut buffer = [0u16; 4];
        // SAFETY: the buffers are live for the duration of the call.
        let produced = unsafe {
            ToUnicode(u32::from(rawcode), scan, Some(&key_state), &mut buffer, 0)
        };

        if produced <= 0 {
            // 0: no character. Negative: a dead key was stored; the
            // character arrives with the next keystroke.
            return Vec::new();
        }

        char::decode_utf16(buffer[..produced as usize].iter().copied())
            .filter_map(Result::ok)
            .collect()
    }
}

// ── Display metrics ───────────────────────────────────────────────────────────

/// Virtual-desktop geometry via GetSystemMetrics.
pub struct WindowsDisplayMetrics;

impl DisplayMetrics for WindowsDisplayMetrics {
    fn virtual_screen_size(&self) -> (i32, i32) {
        // SAFETY: GetSystemMetrics has no preconditions.
        unsafe {
            (
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        }
    }

    fn largest_negative_coordinates(&self) -> (i32, i32) {
        // SM_X/YVIRTUALSCREEN are the virtual desktop's top-left corner,
        // which is negative exactly when a display extends left of or above
        // the primary.
        // SAFETY: GetSystemMetrics has no preconditions.
        let (left, top) = unsafe {
            (
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
            )
        };
        (left.min(0), top.min(0))
    }
}
