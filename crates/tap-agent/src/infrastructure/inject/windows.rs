//! Windows input injection via the SendInput API.
//!
//! Each [`InjectionRequest`] maps to exactly one `INPUT` structure and one
//! `SendInput` call. Coordinates arriving here are already normalized into
//! the `[0, 65536)` absolute range; button and wheel requests carry their
//! payload in `mouseData` the way the API expects.
//!
//! # Safety
//!
//! This module uses `unsafe` exclusively for Windows API FFI calls. All
//! `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use tracing::error;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    MapVirtualKeyW, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, MAPVK_VK_TO_VSC,
    MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_HWHEEL, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN,
    MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_VIRTUALDESK, MOUSEEVENTF_WHEEL, MOUSEEVENTF_XDOWN,
    MOUSEEVENTF_XUP, MOUSEINPUT, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{XBUTTON1, XBUTTON2};

use crate::application::post_input::{InjectionRequest, InputInjector, PostError};
use tap_core::domain::event::MouseButton;

/// Windows implementation of [`InputInjector`] using SendInput.
pub struct WindowsInjector;

impl WindowsInjector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputInjector for WindowsInjector {
    fn inject(&self, request: &InjectionRequest) -> Result<(), PostError> {
        let input = match *request {
            InjectionRequest::Keyboard {
                vk_code,
                press,
                extended,
            } => keyboard_input(vk_code, press, extended),
            InjectionRequest::MouseButton { button, press } => mouse_button_input(button, press),
            InjectionRequest::MouseMove { dx, dy } => mouse_input(
                dx,
                dy,
                0,
                MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_MOVE | MOUSEEVENTF_VIRTUALDESK,
            ),
            InjectionRequest::MouseWheel { delta, horizontal } => {
                let flags = if horizontal {
                    MOUSEEVENTF_HWHEEL
                } else {
                    MOUSEEVENTF_WHEEL
                };
                mouse_input(0, 0, delta as u32, flags)
            }
        };

        // SAFETY: `input` is a fully initialized INPUT structure on the stack
        // and the size argument matches its layout.
        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent != 1 {
            let os_error = windows::core::Error::from_win32();
            error!("SendInput failed: {os_error}");
            return Err(PostError::InjectionFailed(os_error.to_string()));
        }
        Ok(())
    }
}

fn keyboard_input(vk_code: u16, press: bool, extended: bool) -> INPUT {
    let mut flags = KEYBD_EVENT_FLAGS(0);
    if !press {
        flags |= KEYEVENTF_KEYUP;
    }
    if extended {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }

    // SAFETY: MapVirtualKeyW has no preconditions; unknown codes yield 0.
    let scan = unsafe { MapVirtualKeyW(u32::from(vk_code), MAPVK_VK_TO_VSC) } as u16;

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk_code),
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn mouse_button_input(button: MouseButton, press: bool) -> INPUT {
    let (flags, mouse_data) = match (button, press) {
        (MouseButton::Left, true) => (MOUSEEVENTF_LEFTDOWN, 0),
        (MouseButton::Left, false) => (MOUSEEVENTF_LEFTUP, 0),
        (MouseButton::Right, true) => (MOUSEEVENTF_RIGHTDOWN, 0),
        (MouseButton::Right, false) => (MOUSEEVENTF_RIGHTUP, 0),
        (MouseButton::Middle, true) => (MOUSEEVENTF_MIDDLEDOWN, 0),
        (MouseButton::Middle, false) => (MOUSEEVENTF_MIDDLEUP, 0),
        (MouseButton::Button4, true) => (MOUSEEVENTF_XDOWN, u32::from(XBUTTON1)),
        (MouseButton::Button4, false) => (MOUSEEVENTF_XUP, u32::from(XBUTTON1)),
        (MouseButton::Button5, true) => (MOUSEEVENTF_XDOWN, u32::from(XBUTTON2)),
        (MouseButton::Button5, false) => (MOUSEEVENTF_XUP, u32::from(XBUTTON2)),
        // Extra buttons carry their X-button index past the named range.
        (MouseButton::Extra(n), true) => (MOUSEEVENTF_XDOWN, u32::from(n.saturating_sub(3))),
        (MouseButton::Extra(n), false) => (MOUSEEVENTF_XUP, u32::from(n.saturating_sub(3))),
        // The composer rejects NoButton before reaching this layer.
        (MouseButton::NoButton, _) => (MOUSEEVENTF_MOVE, 0),
    };

    mouse_input(0, 0, mouse_data, flags)
}

fn mouse_input(
    dx: i32,
    dy: i32,
    mouse_data: u32,
    flags: windows::Win32::UI::Input::KeyboardAndMouse::MOUSE_EVENT_FLAGS,
) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: mouse_data,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}
