//! # tap-agent
//!
//! The InputTap host application. Wires the pure translation core from
//! `tap-core` to the operating system: low-level hook registration, synthetic
//! input injection, key-state and wheel-configuration queries, and the
//! configuration file.
//!
//! Layering follows the usual split:
//!
//! - **`application`** – use cases written against traits only.
//!   [`application::observe_input::ObserveInputUseCase`] is the observation
//!   pipeline (raw notification in, canonical events out, suppression
//!   decision back); [`application::post_input::PostInputUseCase`] is the
//!   reverse path (canonical event in, native injection requests out).
//!
//! - **`infrastructure`** – platform implementations of those traits, plus
//!   mock implementations used by tests and by the demo binary on platforms
//!   without a hook backend.

pub mod application;
pub mod infrastructure;
