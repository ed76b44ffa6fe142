//! Hook backend infrastructure: registration of the system-wide listener and
//! delivery of raw notifications to the translation pipeline.
//!
//! The backend owns a dedicated thread and calls the [`RawEventHandler`]
//! *synchronously on that thread*, one notification at a time. The handler's
//! [`Disposition`] verdict must be available before the hook callback
//! returns (that is how event consumption suppresses the native event), so
//! there is no channel between the OS callback and the pipeline. The handler
//! must return promptly: the OS force-detaches low-level hooks whose
//! callbacks are slow.

use tap_core::domain::event::{MouseButton, WheelDirection};
use thiserror::Error;

#[cfg(target_os = "windows")]
pub mod windows;

pub mod mock;

/// What the backend should do with the native event after the pipeline has
/// seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the event continue to the rest of the OS.
    Propagate,
    /// Swallow the event; no other listener or application sees it.
    Suppress,
}

/// A raw keyboard notification as delivered by the OS hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// `true` for key-down, `false` for key-up.
    pub pressed: bool,
    /// Platform virtual key code.
    pub vk_code: u16,
    /// Hardware scan code (informational).
    pub scan_code: u16,
    /// Extended-key flag from the notification.
    pub extended: bool,
    /// Native notification timestamp, milliseconds since system start.
    pub time_ms: u32,
}

/// A raw mouse notification as delivered by the OS hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawMouseEvent {
    /// The pointer moved to an absolute virtual-desktop position.
    Move { x: i32, y: i32, time_ms: u32 },
    /// A button changed state.
    Button {
        button: MouseButton,
        pressed: bool,
        x: i32,
        y: i32,
        time_ms: u32,
    },
    /// The wheel rotated. `rotation` is the native signed delta in the
    /// platform's own sign convention; normalization happens downstream.
    Wheel {
        rotation: i16,
        direction: WheelDirection,
        x: i32,
        y: i32,
        time_ms: u32,
    },
}

/// The synchronous pipeline entry points a backend drives.
pub trait RawEventHandler: Send {
    /// The listener is installed and running.
    fn hook_enabled(&mut self);
    /// The listener has been removed; no further notifications follow.
    fn hook_disabled(&mut self);
    /// One keyboard notification; the verdict decides native suppression.
    fn handle_key(&mut self, event: RawKeyEvent) -> Disposition;
    /// One mouse notification; the verdict decides native suppression.
    fn handle_mouse(&mut self, event: RawMouseEvent) -> Disposition;
}

/// Error type for hook backend operations.
#[derive(Debug, Error)]
pub enum HookError {
    /// Installing the system-wide listener failed. Whatever part did
    /// register has already been torn down again.
    #[error("failed to register input hooks: {0}")]
    RegistrationFailed(String),

    /// The module handle needed for hook registration could not be resolved.
    #[error("failed to look up module handle: {0}")]
    ModuleHandleLookupFailed(String),

    /// `start` was called while the backend is already running.
    #[error("hook backend is already running")]
    AlreadyRunning,

    /// `stop` was called while the backend is not running.
    #[error("hook backend is not running")]
    NotRunning,

    /// No backend exists for this platform.
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// A hook backend: owns the listener thread and drives a [`RawEventHandler`].
pub trait HookBackend {
    /// Installs the system-wide listener and starts delivering notifications.
    /// Blocks until registration has succeeded or failed; on failure no
    /// partial registration remains.
    fn start(&self, handler: Box<dyn RawEventHandler>) -> Result<(), HookError>;

    /// Asks the listener thread to finish the in-flight notification, emit
    /// the disabled lifecycle event, and release its resources.
    fn stop(&self) -> Result<(), HookError>;
}
