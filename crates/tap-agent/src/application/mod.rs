//! Application-layer use cases.
//!
//! Use cases depend only on traits and `tap-core` domain types; all
//! infrastructure implementations are injected at construction time, making
//! every use case fully unit-testable.

pub mod observe_input;
pub mod post_input;
