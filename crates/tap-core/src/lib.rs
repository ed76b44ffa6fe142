//! # tap-core
//!
//! Shared library for InputTap containing the canonical input event model,
//! the event translation and state-tracking core, and key code translation
//! tables.
//!
//! This crate is used by the platform agent. It has zero dependencies on OS
//! APIs, UI frameworks, or threads: every function here is a fast,
//! synchronous transformation over in-memory state, designed to run on the
//! single thread that the OS hook mechanism owns.
//!
//! # Architecture overview
//!
//! InputTap observes system-wide keyboard and mouse input from userland and
//! can synthesize input back into the OS. Raw, platform-specific hook
//! notifications carry too little context on their own: no single
//! notification tells you which modifiers are held, whether a press is the
//! third click of a triple-click, or whether a move is really a drag. This
//! crate maintains that derived state and emits a canonical, platform
//! independent event stream.
//!
//! - **`domain`** – The [`InputEvent`] sum type, the [`ModifierMask`]
//!   bitmask, and the [`EventTranslator`] state machine that turns raw
//!   notifications into canonical events.
//!
//! - **`keymap`** – Translation tables between platform key codes (Windows
//!   virtual keys) and the canonical logical keycode space: USB HID Usage
//!   IDs, page 0x07.
//!
//! - **`dispatch`** – The single-slot event sink through which every
//!   canonical event flows, with support for marking events consumed.
//!
//! - **`wire`** – A bit-exact binary encoding of the canonical event, so
//!   recorded streams compare equal across platforms.
//!
//! - **`clock`** – The injected time source used to stamp events.

pub mod clock;
pub mod dispatch;
pub mod domain;
pub mod keymap;
pub mod wire;

// Re-export the most-used types at the crate root so callers can write
// `tap_core::InputEvent` instead of `tap_core::domain::event::InputEvent`.
pub use clock::{Clock, EpochClock, ManualClock};
pub use dispatch::{Dispatcher, EventSink};
pub use domain::event::{
    EventKind, InputEvent, KeyboardData, MouseButton, MouseData, WheelData, WheelDirection,
    WheelScroll,
};
pub use domain::mask::ModifierMask;
pub use domain::translator::{EventTranslator, ReleaseOutcome, WheelProperties};
pub use keymap::keycode::KeyCode;
pub use keymap::KeyTranslator;
pub use wire::{decode_event, encode_event, WireError};
