//! Windows low-level keyboard and mouse hook backend.
//!
//! Installs WH_KEYBOARD_LL and WH_MOUSE_LL hooks on a dedicated Win32
//! message-loop thread. Unlike a channel-based capture design, the hook
//! callbacks here invoke the [`RawEventHandler`] *synchronously*: the
//! handler's verdict must exist before the callback returns, because
//! returning a non-zero result is the only way to suppress the native
//! event. The OS serializes both hooks onto this one thread, so the handler
//! mutex is uncontended in practice; it exists so the handler can also be
//! reached from `start`/`stop`.
//!
//! The handler must return quickly (well under the low-level hook timeout,
//! ~300ms) or Windows silently removes the hook.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::thread;

use tracing::{debug, error};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, KBDLLHOOKSTRUCT_FLAGS,
    LLKHF_EXTENDED, MSG, MSLLHOOKSTRUCT, WH_KEYBOARD_LL, WH_MOUSE_LL, WM_KEYDOWN, WM_KEYUP,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEHWHEEL, WM_MOUSEMOVE,
    WM_MOUSEWHEEL, WM_NCXBUTTONDOWN, WM_NCXBUTTONUP, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP,
    WM_SYSKEYDOWN, WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP, XBUTTON1, XBUTTON2,
};

use tap_core::domain::event::{MouseButton, WheelDirection};

use super::{Disposition, HookBackend, HookError, RawEventHandler, RawKeyEvent, RawMouseEvent};

/// The installed pipeline, reachable from the extern "system" hook procs.
static HANDLER: OnceLock<Mutex<Option<Box<dyn RawEventHandler>>>> = OnceLock::new();

/// Thread id of the message loop, used by `stop` to post WM_QUIT.
static HOOK_THREAD_ID: AtomicU32 = AtomicU32::new(0);

fn handler_slot() -> &'static Mutex<Option<Box<dyn RawEventHandler>>> {
    HANDLER.get_or_init(|| Mutex::new(None))
}

/// Windows hook backend. At most one instance may run per process, because
/// the hook procedures reach the pipeline through process-wide state.
pub struct WindowsHookBackend;

impl WindowsHookBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsHookBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HookBackend for WindowsHookBackend {
    fn start(&self, handler: Box<dyn RawEventHandler>) -> Result<(), HookError> {
        {
            let mut slot = handler_slot()
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                return Err(HookError::AlreadyRunning);
            }
            *slot = Some(handler);
        }

        // Registration happens on the message-loop thread (hooks belong to
        // the thread that installs them); block here until it reports.
        let (ready_tx, ready_rx) = mpsc::channel();
        thread::Builder::new()
            .name("tap-hook-loop".to_string())
            .spawn(move || run_hook_message_loop(ready_tx))
            .map_err(|e| {
                take_handler();
                HookError::RegistrationFailed(e.to_string())
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                take_handler();
                Err(e)
            }
            Err(_) => {
                take_handler();
                Err(HookError::RegistrationFailed(
                    "hook thread exited before signalling readiness".to_string(),
                ))
            }
        }
    }

    fn stop(&self) -> Result<(), HookError> {
        let thread_id = HOOK_THREAD_ID.load(Ordering::SeqCst);
        if thread_id == 0 {
            return Err(HookError::NotRunning);
        }

        // The loop finishes its in-flight notification before it sees the
        // quit message.
        // SAFETY: posting a thread message to a live thread id; a stale id
        // returns an error rather than invoking undefined behavior.
        let posted = unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
        if let Err(e) = posted {
            error!("PostThreadMessage(WM_QUIT) failed: {e}");
            return Err(HookError::NotRunning);
        }
        Ok(())
    }
}

fn take_handler() {
    handler_slot()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
}

/// Entry point of the dedicated message-loop thread.
fn run_hook_message_loop(ready_tx: mpsc::Sender<Result<(), HookError>>) {
    // SAFETY: passing None queries the handle of the current module.
    let hinstance = match unsafe { GetModuleHandleW(None) } {
        Ok(module) => module,
        Err(e) => {
            let _ = ready_tx.send(Err(HookError::ModuleHandleLookupFailed(e.to_string())));
            return;
        }
    };

    // SAFETY: the callbacks have the required signature and the module
    // handle is valid for the life of the process.
    let keyboard_hook = match unsafe {
        SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), Some(hinstance.into()), 0)
    } {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready_tx.send(Err(HookError::RegistrationFailed(format!(
                "keyboard hook: {e}"
            ))));
            return;
        }
    };

    // SAFETY: same contract as the keyboard hook above.
    let mouse_hook = match unsafe {
        SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), Some(hinstance.into()), 0)
    } {
        Ok(hook) => hook,
        Err(e) => {
            // Either both hooks run or neither does: tear the first one down
            // before reporting the failure.
            // SAFETY: unhooking the handle registered above.
            unsafe {
                let _ = UnhookWindowsHookEx(keyboard_hook);
            }
            let _ = ready_tx.send(Err(HookError::RegistrationFailed(format!(
                "mouse hook: {e}"
            ))));
            return;
        }
    };

    // SAFETY: trivially safe query of the current thread id.
    HOOK_THREAD_ID.store(unsafe { GetCurrentThreadId() }, Ordering::SeqCst);

    debug!("input hooks registered");

    // Windows has no hook-started callback, so the lifecycle event is raised
    // here, before the first notification can arrive.
    if let Some(handler) = handler_slot()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_mut()
    {
        handler.hook_enabled();
    }

    let _ = ready_tx.send(Ok(()));

    let mut message = MSG::default();
    // SAFETY: standard GetMessage/DispatchMessage loop; exits when WM_QUIT
    // arrives from `stop`.
    unsafe {
        while GetMessageW(&mut message, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&message);
            DispatchMessageW(&message);
        }

        let _ = UnhookWindowsHookEx(keyboard_hook);
        let _ = UnhookWindowsHookEx(mouse_hook);
    }

    HOOK_THREAD_ID.store(0, Ordering::SeqCst);

    let mut slot = handler_slot()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(handler) = slot.as_mut() {
        handler.hook_disabled();
    }
    *slot = None;

    debug!("input hooks removed");
}

/// Hands one notification to the pipeline and returns its verdict.
fn deliver_key(event: RawKeyEvent) -> Disposition {
    let mut slot = handler_slot()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    match slot.as_mut() {
        Some(handler) => handler.handle_key(event),
        None => Disposition::Propagate,
    }
}

fn deliver_mouse(event: RawMouseEvent) -> Disposition {
    let mut slot = handler_slot()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    match slot.as_mut() {
        Some(handler) => handler.handle_mouse(event),
        None => Disposition::Propagate,
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows on the hook thread; must return quickly.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        // SAFETY: must forward when n_code < 0.
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
    let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);

    let pressed = match w_param.0 as u32 {
        WM_KEYDOWN | WM_SYSKEYDOWN => true,
        WM_KEYUP | WM_SYSKEYUP => false,
        other => {
            debug!("unhandled keyboard message: {other:#X}");
            return CallNextHookEx(None, n_code, w_param, l_param);
        }
    };

    let event = RawKeyEvent {
        pressed,
        vk_code: kbs.vkCode as u16,
        scan_code: kbs.scanCode as u16,
        extended: (kbs.flags & LLKHF_EXTENDED) != KBDLLHOOKSTRUCT_FLAGS(0),
        time_ms: kbs.time,
    };

    match deliver_key(event) {
        Disposition::Suppress => LRESULT(1),
        // SAFETY: forward to the next hook in the chain.
        Disposition::Propagate => CallNextHookEx(None, n_code, w_param, l_param),
    }
}

/// The X-button index lives in the high word of `mouseData`.
fn xbutton_from(mouse_data: u32) -> MouseButton {
    match (mouse_data >> 16) as u16 {
        n if n == XBUTTON1 => MouseButton::Button4,
        n if n == XBUTTON2 => MouseButton::Button5,
        n => MouseButton::from_u16(n),
    }
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows on the hook thread; must return quickly.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        // SAFETY: must forward when n_code < 0.
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
    let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
    let (x, y, time_ms) = (mhs.pt.x, mhs.pt.y, mhs.time);

    let button_event = |button, pressed| RawMouseEvent::Button {
        button,
        pressed,
        x,
        y,
        time_ms,
    };

    let event = match w_param.0 as u32 {
        WM_MOUSEMOVE => RawMouseEvent::Move { x, y, time_ms },

        WM_LBUTTONDOWN => button_event(MouseButton::Left, true),
        WM_LBUTTONUP => button_event(MouseButton::Left, false),
        WM_RBUTTONDOWN => button_event(MouseButton::Right, true),
        WM_RBUTTONUP => button_event(MouseButton::Right, false),
        WM_MBUTTONDOWN => button_event(MouseButton::Middle, true),
        WM_MBUTTONUP => button_event(MouseButton::Middle, false),

        // Press and release resolve the button identically, so a release
        // always names the same button its press did.
        WM_XBUTTONDOWN | WM_NCXBUTTONDOWN => button_event(xbutton_from(mhs.mouseData), true),
        WM_XBUTTONUP | WM_NCXBUTTONUP => button_event(xbutton_from(mhs.mouseData), false),

        WM_MOUSEWHEEL => RawMouseEvent::Wheel {
            rotation: (mhs.mouseData >> 16) as i16,
            direction: WheelDirection::Vertical,
            x,
            y,
            time_ms,
        },
        WM_MOUSEHWHEEL => RawMouseEvent::Wheel {
            rotation: (mhs.mouseData >> 16) as i16,
            direction: WheelDirection::Horizontal,
            x,
            y,
            time_ms,
        },

        other => {
            debug!("unhandled mouse message: {other:#X}");
            return CallNextHookEx(None, n_code, w_param, l_param);
        }
    };

    match deliver_mouse(event) {
        Disposition::Suppress => LRESULT(1),
        // SAFETY: forward to the next hook in the chain.
        Disposition::Propagate => CallNextHookEx(None, n_code, w_param, l_param),
    }
}
