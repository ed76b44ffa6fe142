//! Round-trip tests for the wire codec: every event kind must survive
//! encode → decode bit-exactly, and malformed input must fail loudly.

use tap_core::domain::event::{
    EventKind, InputEvent, KeyboardData, MouseButton, MouseData, WheelData, WheelDirection,
    WheelScroll,
};
use tap_core::domain::mask::ModifierMask;
use tap_core::keymap::keycode::KeyCode;
use tap_core::wire::{decode_event, encode_event, WireError, HEADER_SIZE};

fn mask_with(bits: u16) -> ModifierMask {
    let mut mask = ModifierMask::empty();
    mask.set(bits);
    mask
}

fn sample_events() -> Vec<InputEvent> {
    let keyboard = KeyboardData {
        keycode: KeyCode::KeyQ,
        rawcode: 0x51,
        keychar: None,
    };
    let typed = KeyboardData {
        keycode: KeyCode::Undefined,
        rawcode: 0x51,
        keychar: Some('q'),
    };
    let mouse = MouseData {
        button: MouseButton::Left,
        clicks: 2,
        x: -120,
        y: 745,
    };
    let wheel = WheelData {
        scroll: WheelScroll::Unit,
        amount: 3,
        rotation: -120,
        direction: WheelDirection::Vertical,
        x: 400,
        y: 300,
    };

    vec![
        InputEvent::new(1, ModifierMask::empty(), EventKind::HookEnabled),
        InputEvent::new(2, ModifierMask::empty(), EventKind::HookDisabled),
        InputEvent::new(
            3,
            mask_with(ModifierMask::SHIFT_L),
            EventKind::KeyPressed(keyboard),
        ),
        InputEvent::new(4, ModifierMask::empty(), EventKind::KeyReleased(keyboard)),
        InputEvent::new(5, ModifierMask::empty(), EventKind::KeyTyped(typed)),
        InputEvent::new(
            6,
            mask_with(ModifierMask::BUTTON1),
            EventKind::MousePressed(mouse),
        ),
        InputEvent::new(7, ModifierMask::empty(), EventKind::MouseReleased(mouse)),
        InputEvent::new(8, ModifierMask::empty(), EventKind::MouseClicked(mouse)),
        InputEvent::new(9, ModifierMask::empty(), EventKind::MouseMoved(mouse)),
        InputEvent::new(
            10,
            mask_with(ModifierMask::BUTTON3),
            EventKind::MouseDragged(mouse),
        ),
        InputEvent::new(11, ModifierMask::empty(), EventKind::MouseWheel(wheel)),
    ]
}

#[test]
fn test_every_event_kind_round_trips() {
    for original in sample_events() {
        // Arrange / Act
        let bytes = encode_event(&original);
        let (decoded, consumed) = decode_event(&bytes).expect("decode should succeed");

        // Assert
        assert_eq!(decoded, original);
        assert_eq!(consumed, bytes.len());
    }
}

#[test]
fn test_consumed_flag_survives_round_trip() {
    // Arrange
    let mut event = InputEvent::new(99, ModifierMask::empty(), EventKind::HookEnabled);
    event.consumed = true;

    // Act
    let (decoded, _) = decode_event(&encode_event(&event)).unwrap();

    // Assert
    assert!(decoded.consumed);
}

#[test]
fn test_extra_button_identifier_survives_round_trip() {
    let event = InputEvent::new(
        50,
        ModifierMask::empty(),
        EventKind::MousePressed(MouseData {
            button: MouseButton::Extra(9),
            clicks: 1,
            x: 0,
            y: 0,
        }),
    );
    let (decoded, _) = decode_event(&encode_event(&event)).unwrap();
    assert_eq!(decoded, event);
}

#[test]
fn test_concatenated_stream_decodes_sequentially() {
    // Arrange – one contiguous buffer of all sample events
    let events = sample_events();
    let mut stream = Vec::new();
    for event in &events {
        stream.extend_from_slice(&encode_event(event));
    }

    // Act – walk the stream with the consumed-byte cursor
    let mut cursor = 0;
    let mut decoded = Vec::new();
    while cursor < stream.len() {
        let (event, n) = decode_event(&stream[cursor..]).expect("decode should succeed");
        decoded.push(event);
        cursor += n;
    }

    // Assert
    assert_eq!(decoded, events);
}

#[test]
fn test_truncated_header_reports_insufficient_data() {
    let bytes = encode_event(&InputEvent::new(
        0,
        ModifierMask::empty(),
        EventKind::HookEnabled,
    ));
    let result = decode_event(&bytes[..HEADER_SIZE - 1]);
    assert!(matches!(
        result,
        Err(WireError::InsufficientData { .. })
    ));
}

#[test]
fn test_truncated_payload_reports_insufficient_data() {
    let event = InputEvent::new(
        0,
        ModifierMask::empty(),
        EventKind::MouseMoved(MouseData {
            button: MouseButton::NoButton,
            clicks: 0,
            x: 10,
            y: 20,
        }),
    );
    let bytes = encode_event(&event);
    let result = decode_event(&bytes[..bytes.len() - 2]);
    assert!(matches!(
        result,
        Err(WireError::InsufficientData { .. })
    ));
}

#[test]
fn test_unknown_type_code_is_rejected() {
    let mut bytes = encode_event(&InputEvent::new(
        0,
        ModifierMask::empty(),
        EventKind::HookEnabled,
    ));
    bytes[0] = 0x7F;
    assert_eq!(decode_event(&bytes), Err(WireError::UnknownEventType(0x7F)));
}

#[test]
fn test_invalid_unicode_scalar_is_rejected() {
    // Arrange – a KeyTyped record whose keychar field holds a surrogate value
    let event = InputEvent::new(
        0,
        ModifierMask::empty(),
        EventKind::KeyTyped(KeyboardData {
            keycode: KeyCode::Undefined,
            rawcode: 0x41,
            keychar: Some('a'),
        }),
    );
    let mut bytes = encode_event(&event);
    let keychar_offset = HEADER_SIZE + 4;
    bytes[keychar_offset..keychar_offset + 4].copy_from_slice(&0xD800u32.to_be_bytes());

    // Act / Assert
    assert!(matches!(
        decode_event(&bytes),
        Err(WireError::MalformedPayload(_))
    ));
}
