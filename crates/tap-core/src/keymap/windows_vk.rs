//! Windows Virtual Key (VK) code translation table.
//!
//! `VK_TO_KEY` is a compile-time constant array of 256 [`KeyCode`] values
//! indexed by VK code, so the hot capture path is an O(1) array read. VK
//! codes with no keyboard equivalent (mouse button VKs, IME codes, OEM
//! specials) hold [`KeyCode::Undefined`].
//!
//! One VK code is position-ambiguous: `VK_RETURN` (0x0D) is both the main
//! Enter key and keypad Enter, distinguished only by the notification's
//! extended-key flag. [`vk_to_key`] takes that flag for exactly this case.
//!
//! Reference: Virtual-Key Codes (winuser.h) and USB HID Usage Tables 1.3.

use super::keycode::KeyCode;

/// Translates a Windows Virtual Key code to a logical [`KeyCode`].
///
/// `extended` is the notification's extended-key flag; it disambiguates
/// keypad Enter from the main Enter key.
pub fn vk_to_key(vk: u16, extended: bool) -> KeyCode {
    if vk == 0x0D && extended {
        return KeyCode::NumpadEnter;
    }
    VK_TO_KEY
        .get(usize::from(vk))
        .copied()
        .unwrap_or(KeyCode::Undefined)
}

/// Translates a logical [`KeyCode`] back to a Windows Virtual Key code.
///
/// Returns `None` when no VK exists for the key. [`KeyCode::NumpadEnter`]
/// maps to `VK_RETURN`, losing the extended distinction by design; the
/// synthesis path re-adds the extended flag where the OS needs it.
pub fn key_to_vk(key: KeyCode) -> Option<u16> {
    if key == KeyCode::Undefined {
        return None;
    }
    if key == KeyCode::NumpadEnter {
        return Some(0x0D);
    }
    // The reverse direction is cold (synthesis only); a linear scan over the
    // 256-entry table is plenty.
    VK_TO_KEY
        .iter()
        .position(|&mapped| mapped == key)
        .map(|vk| vk as u16)
}

/// VK → logical key table indexed by VK code (0x00–0xFF).
const VK_TO_KEY: [KeyCode; 256] = {
    use KeyCode::*;
    let mut t = [Undefined; 256];

    // Letters: VK_A..VK_Z are the ASCII uppercase codes.
    t[0x41] = KeyA;
    t[0x42] = KeyB;
    t[0x43] = KeyC;
    t[0x44] = KeyD;
    t[0x45] = KeyE;
    t[0x46] = KeyF;
    t[0x47] = KeyG;
    t[0x48] = KeyH;
    t[0x49] = KeyI;
    t[0x4A] = KeyJ;
    t[0x4B] = KeyK;
    t[0x4C] = KeyL;
    t[0x4D] = KeyM;
    t[0x4E] = KeyN;
    t[0x4F] = KeyO;
    t[0x50] = KeyP;
    t[0x51] = KeyQ;
    t[0x52] = KeyR;
    t[0x53] = KeyS;
    t[0x54] = KeyT;
    t[0x55] = KeyU;
    t[0x56] = KeyV;
    t[0x57] = KeyW;
    t[0x58] = KeyX;
    t[0x59] = KeyY;
    t[0x5A] = KeyZ;

    // Digit row: VK_0..VK_9 are the ASCII digit codes.
    t[0x30] = Digit0;
    t[0x31] = Digit1;
    t[0x32] = Digit2;
    t[0x33] = Digit3;
    t[0x34] = Digit4;
    t[0x35] = Digit5;
    t[0x36] = Digit6;
    t[0x37] = Digit7;
    t[0x38] = Digit8;
    t[0x39] = Digit9;

    // Whitespace and control.
    t[0x08] = Backspace; // VK_BACK
    t[0x09] = Tab; // VK_TAB
    t[0x0D] = Enter; // VK_RETURN (keypad Enter handled via the extended flag)
    t[0x1B] = Escape; // VK_ESCAPE
    t[0x20] = Space; // VK_SPACE

    // Navigation and editing cluster.
    t[0x21] = PageUp; // VK_PRIOR
    t[0x22] = PageDown; // VK_NEXT
    t[0x23] = End; // VK_END
    t[0x24] = Home; // VK_HOME
    t[0x25] = ArrowLeft; // VK_LEFT
    t[0x26] = ArrowUp; // VK_UP
    t[0x27] = ArrowRight; // VK_RIGHT
    t[0x28] = ArrowDown; // VK_DOWN
    t[0x2C] = PrintScreen; // VK_SNAPSHOT
    t[0x2D] = Insert; // VK_INSERT
    t[0x2E] = Delete; // VK_DELETE

    // Locks and Pause.
    t[0x13] = Pause; // VK_PAUSE
    t[0x14] = CapsLock; // VK_CAPITAL
    t[0x90] = NumLock; // VK_NUMLOCK
    t[0x91] = ScrollLock; // VK_SCROLL

    // Function row.
    t[0x70] = F1;
    t[0x71] = F2;
    t[0x72] = F3;
    t[0x73] = F4;
    t[0x74] = F5;
    t[0x75] = F6;
    t[0x76] = F7;
    t[0x77] = F8;
    t[0x78] = F9;
    t[0x79] = F10;
    t[0x7A] = F11;
    t[0x7B] = F12;

    // Keypad.
    t[0x60] = Numpad0;
    t[0x61] = Numpad1;
    t[0x62] = Numpad2;
    t[0x63] = Numpad3;
    t[0x64] = Numpad4;
    t[0x65] = Numpad5;
    t[0x66] = Numpad6;
    t[0x67] = Numpad7;
    t[0x68] = Numpad8;
    t[0x69] = Numpad9;
    t[0x6A] = NumpadMultiply; // VK_MULTIPLY
    t[0x6B] = NumpadAdd; // VK_ADD
    t[0x6D] = NumpadSubtract; // VK_SUBTRACT
    t[0x6E] = NumpadDecimal; // VK_DECIMAL
    t[0x6F] = NumpadDivide; // VK_DIVIDE

    // Modifiers (side-specific VKs; the generic VK_SHIFT/VK_CONTROL/VK_MENU
    // codes never reach a low-level hook and stay unmapped).
    t[0xA0] = ShiftLeft; // VK_LSHIFT
    t[0xA1] = ShiftRight; // VK_RSHIFT
    t[0xA2] = ControlLeft; // VK_LCONTROL
    t[0xA3] = ControlRight; // VK_RCONTROL
    t[0xA4] = AltLeft; // VK_LMENU
    t[0xA5] = AltRight; // VK_RMENU
    t[0x5B] = MetaLeft; // VK_LWIN
    t[0x5C] = MetaRight; // VK_RWIN
    t[0x5D] = ContextMenu; // VK_APPS

    // OEM punctuation, US layout positions.
    t[0xBA] = Semicolon; // VK_OEM_1
    t[0xBB] = Equal; // VK_OEM_PLUS
    t[0xBC] = Comma; // VK_OEM_COMMA
    t[0xBD] = Minus; // VK_OEM_MINUS
    t[0xBE] = Period; // VK_OEM_PERIOD
    t[0xBF] = Slash; // VK_OEM_2
    t[0xC0] = Backquote; // VK_OEM_3
    t[0xDB] = BracketLeft; // VK_OEM_4
    t[0xDC] = Backslash; // VK_OEM_5
    t[0xDD] = BracketRight; // VK_OEM_6
    t[0xDE] = Quote; // VK_OEM_7

    t
};
