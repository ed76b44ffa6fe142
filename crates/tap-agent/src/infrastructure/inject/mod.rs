//! Input injection infrastructure.
//!
//! The production implementation submits composed requests through the
//! platform's input-synthesis API; the mock records them for tests.

#[cfg(target_os = "windows")]
pub mod windows;

pub mod mock;
