//! Key code translation between platform-native key identifiers and the
//! canonical logical keycode space.
//!
//! The canonical representation is USB HID Usage IDs (page 0x07). Static
//! tables cover the code-to-code directions; character resolution depends on
//! the active keyboard layout, so it is part of the [`KeyTranslator`]
//! capability the platform layer implements.

pub mod keycode;
pub mod windows_vk;

pub use keycode::KeyCode;

/// The key translation bridge between native key identifiers and the logical
/// keycode space.
///
/// Implementations are table-backed and layout-aware. All three directions
/// are total functions with explicit "no mapping" results; callers on the
/// synthesis path must treat `None` as a hard failure, never substituting a
/// default key.
pub trait KeyTranslator: Send + Sync {
    /// Maps a native key code (plus the notification's extended-key flag) to
    /// a logical key. Unmappable codes yield [`KeyCode::Undefined`].
    fn native_to_logical(&self, rawcode: u16, extended: bool) -> KeyCode;

    /// Maps a logical key back to a native key code, or `None` when the key
    /// has no native equivalent.
    fn logical_to_native(&self, key: KeyCode) -> Option<u16>;

    /// Resolves the characters a press of the native key would type under the
    /// current layout and modifier state. Zero characters is legitimate
    /// (dead keys, non-printing keys), as is more than one (composed
    /// sequences); order is the typing order.
    fn native_to_unicode(&self, rawcode: u16) -> Vec<char>;
}
