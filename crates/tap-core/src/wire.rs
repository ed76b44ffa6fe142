//! Bit-exact binary encoding of canonical events.
//!
//! The project goal is that a recorded event stream compares equal across
//! platforms, so the layout is fixed here rather than left to a derive:
//!
//! ```text
//! [type:1][time:8][mask:2][consumed:1][payload:N]
//!
//! keyboard payload: [keycode:2][rawcode:2][keychar:4]     (8 bytes)
//! mouse payload:    [button:2][clicks:2][x:2][y:2]        (8 bytes)
//! wheel payload:    [scroll:1][amount:2][rotation:2]
//!                   [direction:1][x:2][y:2]               (10 bytes)
//! lifecycle payload: empty
//! ```
//!
//! All multi-byte integers are big-endian. The `keychar` field is the
//! character's Unicode scalar value, or [`CHAR_UNDEFINED`] when the event
//! carries no character.

use thiserror::Error;

use crate::domain::event::{
    EventKind, InputEvent, KeyboardData, MouseButton, MouseData, WheelData, WheelDirection,
    WheelScroll,
};
use crate::domain::mask::ModifierMask;
use crate::keymap::keycode::KeyCode;

/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 12;

/// Wire sentinel for "no character".
pub const CHAR_UNDEFINED: u32 = 0xFFFF;

/// Errors from decoding an event record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The byte slice is shorter than the record requires.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The type byte is not a recognized event type code.
    #[error("unknown event type: 0x{0:02X}")]
    UnknownEventType(u8),

    /// A payload field holds a value outside its domain.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes one event into its wire representation.
///
/// # Examples
///
/// ```rust
/// use tap_core::domain::event::{EventKind, InputEvent};
/// use tap_core::domain::mask::ModifierMask;
/// use tap_core::wire::{decode_event, encode_event};
///
/// let event = InputEvent::new(1_234, ModifierMask::empty(), EventKind::HookEnabled);
/// let bytes = encode_event(&event);
/// let (decoded, consumed) = decode_event(&bytes).unwrap();
/// assert_eq!(decoded, event);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_event(event: &InputEvent) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + 10);

    buf.push(event.kind.type_code());
    buf.extend_from_slice(&event.time.to_be_bytes());
    buf.extend_from_slice(&event.mask.bits().to_be_bytes());
    buf.push(event.consumed as u8);

    match &event.kind {
        EventKind::HookEnabled | EventKind::HookDisabled => {}
        EventKind::KeyPressed(k) | EventKind::KeyReleased(k) | EventKind::KeyTyped(k) => {
            buf.extend_from_slice(&k.keycode.as_u16().to_be_bytes());
            buf.extend_from_slice(&k.rawcode.to_be_bytes());
            let keychar = k.keychar.map(u32::from).unwrap_or(CHAR_UNDEFINED);
            buf.extend_from_slice(&keychar.to_be_bytes());
        }
        EventKind::MousePressed(m)
        | EventKind::MouseReleased(m)
        | EventKind::MouseClicked(m)
        | EventKind::MouseMoved(m)
        | EventKind::MouseDragged(m) => {
            buf.extend_from_slice(&m.button.as_u16().to_be_bytes());
            buf.extend_from_slice(&m.clicks.to_be_bytes());
            buf.extend_from_slice(&m.x.to_be_bytes());
            buf.extend_from_slice(&m.y.to_be_bytes());
        }
        EventKind::MouseWheel(w) => {
            buf.push(w.scroll as u8);
            buf.extend_from_slice(&w.amount.to_be_bytes());
            buf.extend_from_slice(&w.rotation.to_be_bytes());
            buf.push(w.direction as u8);
            buf.extend_from_slice(&w.x.to_be_bytes());
            buf.extend_from_slice(&w.y.to_be_bytes());
        }
    }

    buf
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes one event from the beginning of `bytes`.
///
/// Returns the event and the number of bytes consumed so callers can advance
/// their read cursor through a concatenated stream.
pub fn decode_event(bytes: &[u8]) -> Result<(InputEvent, usize), WireError> {
    if bytes.len() < HEADER_SIZE {
        return Err(WireError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let type_code = bytes[0];
    let time = u64::from_be_bytes(bytes[1..9].try_into().expect("8 header bytes"));
    let mask = ModifierMask(u16::from_be_bytes([bytes[9], bytes[10]]));
    let consumed = match bytes[11] {
        0 => false,
        1 => true,
        other => {
            return Err(WireError::MalformedPayload(format!(
                "consumed flag must be 0 or 1, got {other}"
            )))
        }
    };

    let payload = &bytes[HEADER_SIZE..];
    let (kind, payload_len) = decode_kind(type_code, payload)?;

    Ok((
        InputEvent {
            time,
            mask,
            consumed,
            kind,
        },
        HEADER_SIZE + payload_len,
    ))
}

fn decode_kind(type_code: u8, payload: &[u8]) -> Result<(EventKind, usize), WireError> {
    match type_code {
        0x01 => Ok((EventKind::HookEnabled, 0)),
        0x02 => Ok((EventKind::HookDisabled, 0)),
        0x03 | 0x04 | 0x05 => {
            let k = decode_keyboard(payload)?;
            let kind = match type_code {
                0x03 => EventKind::KeyPressed(k),
                0x04 => EventKind::KeyReleased(k),
                _ => EventKind::KeyTyped(k),
            };
            Ok((kind, 8))
        }
        0x06..=0x0A => {
            let m = decode_mouse(payload)?;
            let kind = match type_code {
                0x06 => EventKind::MousePressed(m),
                0x07 => EventKind::MouseReleased(m),
                0x08 => EventKind::MouseClicked(m),
                0x09 => EventKind::MouseMoved(m),
                _ => EventKind::MouseDragged(m),
            };
            Ok((kind, 8))
        }
        0x0B => Ok((EventKind::MouseWheel(decode_wheel(payload)?), 10)),
        other => Err(WireError::UnknownEventType(other)),
    }
}

fn require(payload: &[u8], needed: usize) -> Result<(), WireError> {
    if payload.len() < needed {
        return Err(WireError::InsufficientData {
            needed: HEADER_SIZE + needed,
            available: HEADER_SIZE + payload.len(),
        });
    }
    Ok(())
}

fn decode_keyboard(payload: &[u8]) -> Result<KeyboardData, WireError> {
    require(payload, 8)?;
    let keycode = KeyCode::from_u16(u16::from_be_bytes([payload[0], payload[1]]));
    let rawcode = u16::from_be_bytes([payload[2], payload[3]]);
    let raw_char = u32::from_be_bytes(payload[4..8].try_into().expect("4 keychar bytes"));
    let keychar = if raw_char == CHAR_UNDEFINED {
        None
    } else {
        Some(char::from_u32(raw_char).ok_or_else(|| {
            WireError::MalformedPayload(format!("invalid unicode scalar 0x{raw_char:08X}"))
        })?)
    };
    Ok(KeyboardData {
        keycode,
        rawcode,
        keychar,
    })
}

fn decode_mouse(payload: &[u8]) -> Result<MouseData, WireError> {
    require(payload, 8)?;
    Ok(MouseData {
        button: MouseButton::from_u16(u16::from_be_bytes([payload[0], payload[1]])),
        clicks: u16::from_be_bytes([payload[2], payload[3]]),
        x: i16::from_be_bytes([payload[4], payload[5]]),
        y: i16::from_be_bytes([payload[6], payload[7]]),
    })
}

fn decode_wheel(payload: &[u8]) -> Result<WheelData, WireError> {
    require(payload, 10)?;
    let scroll = WheelScroll::try_from(payload[0])
        .map_err(|_| WireError::MalformedPayload(format!("bad scroll type {}", payload[0])))?;
    let direction = WheelDirection::try_from(payload[5])
        .map_err(|_| WireError::MalformedPayload(format!("bad wheel direction {}", payload[5])))?;
    Ok(WheelData {
        scroll,
        amount: u16::from_be_bytes([payload[1], payload[2]]),
        rotation: i16::from_be_bytes([payload[3], payload[4]]),
        direction,
        x: i16::from_be_bytes([payload[6], payload[7]]),
        y: i16::from_be_bytes([payload[8], payload[9]]),
    })
}
