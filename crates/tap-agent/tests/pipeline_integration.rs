//! Integration tests for the observation pipeline.
//!
//! These exercise the full path a native notification takes: mock backend →
//! `ObserveInputUseCase` → `EventTranslator` → dispatch sink → suppression
//! verdict, with a hand-driven clock.

use std::sync::{Arc, Mutex};

use tap_agent::application::observe_input::ObserveInputUseCase;
use tap_agent::infrastructure::hook::mock::MockHookBackend;
use tap_agent::infrastructure::hook::{Disposition, HookBackend, RawKeyEvent, RawMouseEvent};
use tap_agent::infrastructure::system::{
    FixedModifierProbe, StaticWheelSettings, UsLayoutKeyTranslator,
};
use tap_core::clock::{Clock, ManualClock};
use tap_core::dispatch::EventSink;
use tap_core::domain::event::{EventKind, InputEvent, MouseButton, WheelDirection, WheelScroll};
use tap_core::domain::mask::ModifierMask;

// ── Shared fixture ────────────────────────────────────────────────────────────

/// Records dispatched events; consumes the ones matching a predicate.
struct RecordingSink {
    events: Arc<Mutex<Vec<InputEvent>>>,
    consume: fn(&InputEvent) -> bool,
}

impl EventSink for RecordingSink {
    fn handle(&self, event: &InputEvent) -> bool {
        self.events.lock().unwrap().push(*event);
        (self.consume)(event)
    }
}

struct Rig {
    backend: MockHookBackend,
    clock: Arc<ManualClock>,
    events: Arc<Mutex<Vec<InputEvent>>>,
}

fn start_rig(consume: fn(&InputEvent) -> bool) -> Rig {
    let clock = Arc::new(ManualClock::starting_at(1_000));
    let events = Arc::new(Mutex::new(Vec::new()));

    let mut pipeline = ObserveInputUseCase::new(
        Arc::clone(&clock) as Arc<dyn Clock>,
        Arc::new(UsLayoutKeyTranslator),
        Arc::new(FixedModifierProbe(ModifierMask::empty())),
        Arc::new(StaticWheelSettings::new(WheelScroll::Unit, 3)),
        400,
    );
    pipeline.set_sink(Box::new(RecordingSink {
        events: Arc::clone(&events),
        consume,
    }));

    let backend = MockHookBackend::new();
    backend
        .start(Box::new(pipeline))
        .expect("backend start should succeed");

    Rig {
        backend,
        clock,
        events,
    }
}

fn press(button: MouseButton, x: i32, y: i32) -> RawMouseEvent {
    RawMouseEvent::Button {
        button,
        pressed: true,
        x,
        y,
        time_ms: 0,
    }
}

fn release(button: MouseButton, x: i32, y: i32) -> RawMouseEvent {
    RawMouseEvent::Button {
        button,
        pressed: false,
        x,
        y,
        time_ms: 0,
    }
}

fn key(pressed: bool, vk_code: u16) -> RawKeyEvent {
    RawKeyEvent {
        pressed,
        vk_code,
        scan_code: 0,
        extended: false,
        time_ms: 0,
    }
}

fn recorded(rig: &Rig) -> Vec<InputEvent> {
    rig.events.lock().unwrap().clone()
}

fn clicks_of(event: &InputEvent) -> u16 {
    match event.kind {
        EventKind::MousePressed(d)
        | EventKind::MouseReleased(d)
        | EventKind::MouseClicked(d)
        | EventKind::MouseMoved(d)
        | EventKind::MouseDragged(d) => d.clicks,
        _ => panic!("not a mouse event: {event:?}"),
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn test_start_and_stop_bracket_the_stream_with_lifecycle_events() {
    // Arrange / Act
    let rig = start_rig(|_| false);
    rig.backend.drive_key(key(true, 0x41));
    rig.backend.stop().expect("stop should succeed");

    // Assert – HookEnabled first, HookDisabled last
    let events = recorded(&rig);
    assert!(matches!(events.first().unwrap().kind, EventKind::HookEnabled));
    assert!(matches!(events.last().unwrap().kind, EventKind::HookDisabled));
}

#[test]
fn test_restart_resets_click_streak_across_sessions() {
    // Arrange – build a streak, then stop
    let rig = start_rig(|_| false);
    rig.backend.drive_mouse(press(MouseButton::Left, 10, 10));
    rig.clock.advance(10);
    rig.backend.drive_mouse(release(MouseButton::Left, 10, 10));
    rig.backend.stop().expect("stop should succeed");

    // Act – a fresh session presses within what would have been the window
    let rig2 = start_rig(|_| false);
    rig2.clock.set(1_020);
    rig2.backend.drive_mouse(press(MouseButton::Left, 10, 10));

    // Assert – count restarts at 1; no state crossed the stop/start cycle
    let events = recorded(&rig2);
    let pressed = events
        .iter()
        .find(|e| matches!(e.kind, EventKind::MousePressed(_)))
        .expect("press expected");
    assert_eq!(clicks_of(pressed), 1);
}

// ── Multi-click scenarios ─────────────────────────────────────────────────────

#[test]
fn test_double_click_then_lapsed_press_scenario() {
    // The full §press/release rhythm: two clicks inside the window, then a
    // press past it that starts over.
    let rig = start_rig(|_| false);

    rig.clock.set(1_000);
    rig.backend.drive_mouse(press(MouseButton::Left, 50, 50));
    rig.clock.set(1_010);
    rig.backend.drive_mouse(release(MouseButton::Left, 50, 50));
    rig.clock.set(1_200);
    rig.backend.drive_mouse(press(MouseButton::Left, 50, 50));
    rig.clock.set(1_210);
    rig.backend.drive_mouse(release(MouseButton::Left, 50, 50));
    rig.clock.set(1_700);
    rig.backend.drive_mouse(press(MouseButton::Left, 50, 50));

    let events = recorded(&rig);
    let clicked: Vec<u16> = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::MouseClicked(_)))
        .map(clicks_of)
        .collect();
    assert_eq!(clicked, vec![1, 2], "two Clicked events, counts 1 then 2");

    let last_press = events
        .iter()
        .rev()
        .find(|e| matches!(e.kind, EventKind::MousePressed(_)))
        .expect("press expected");
    assert_eq!(clicks_of(last_press), 1, "1700-1200=500 > 400 starts over");
}

#[test]
fn test_wheel_between_clicks_starts_a_fresh_streak() {
    // Arrange – three clicks of button 1
    let rig = start_rig(|_| false);
    for t in [1_000u64, 1_100, 1_200] {
        rig.clock.set(t);
        rig.backend.drive_mouse(press(MouseButton::Left, 10, 10));
        rig.clock.set(t + 5);
        rig.backend.drive_mouse(release(MouseButton::Left, 10, 10));
    }

    // Act – wheel activity, then another press of the same button
    rig.clock.set(1_250);
    rig.backend.drive_mouse(RawMouseEvent::Wheel {
        rotation: 120,
        direction: WheelDirection::Vertical,
        x: 10,
        y: 10,
        time_ms: 0,
    });
    rig.clock.set(1_300);
    rig.backend.drive_mouse(press(MouseButton::Left, 10, 10));

    // Assert – the press after the wheel is count 1, not 4
    let events = recorded(&rig);
    let last_press = events
        .iter()
        .rev()
        .find(|e| matches!(e.kind, EventKind::MousePressed(_)))
        .expect("press expected");
    assert_eq!(clicks_of(last_press), 1);
}

// ── Motion classification ─────────────────────────────────────────────────────

#[test]
fn test_drag_then_move_classification_through_the_backend() {
    let rig = start_rig(|_| false);

    rig.backend.drive_mouse(press(MouseButton::Left, 100, 100));
    rig.backend.drive_mouse(RawMouseEvent::Move {
        x: 140,
        y: 100,
        time_ms: 0,
    });
    rig.backend.drive_mouse(release(MouseButton::Left, 140, 100));
    rig.backend.drive_mouse(RawMouseEvent::Move {
        x: 180,
        y: 100,
        time_ms: 0,
    });

    let kinds: Vec<u8> = recorded(&rig).iter().map(|e| e.kind.type_code()).collect();
    // HookEnabled, Pressed, Dragged, Released, Moved.
    assert_eq!(kinds, vec![0x01, 0x06, 0x0A, 0x07, 0x09]);
}

// ── Suppression ───────────────────────────────────────────────────────────────

#[test]
fn test_consuming_sink_suppresses_native_events() {
    // Arrange – consume every keyboard event
    let rig = start_rig(|e| {
        matches!(
            e.kind,
            EventKind::KeyPressed(_) | EventKind::KeyReleased(_) | EventKind::KeyTyped(_)
        )
    });

    // Act / Assert – keyboard suppressed, mouse propagates
    assert_eq!(rig.backend.drive_key(key(true, 0x41)), Disposition::Suppress);
    assert_eq!(
        rig.backend.drive_mouse(press(MouseButton::Left, 0, 0)),
        Disposition::Propagate
    );
}

#[test]
fn test_consumed_events_are_flagged_in_the_record() {
    let rig = start_rig(|e| matches!(e.kind, EventKind::KeyPressed(_)));
    rig.backend.drive_key(key(true, 0x41));

    let events = recorded(&rig);
    let pressed = events
        .iter()
        .find(|e| matches!(e.kind, EventKind::KeyPressed(_)))
        .expect("press expected");
    assert!(pressed.consumed);
    // Consumed press produces no typed follow-up.
    assert!(!events.iter().any(|e| matches!(e.kind, EventKind::KeyTyped(_))));
}

// ── Typed derivation ──────────────────────────────────────────────────────────

#[test]
fn test_typed_events_follow_unconsumed_presses_in_order() {
    let rig = start_rig(|_| false);
    rig.backend.drive_key(key(true, 0x48)); // 'h'
    rig.backend.drive_key(key(false, 0x48));
    rig.backend.drive_key(key(true, 0x49)); // 'i'
    rig.backend.drive_key(key(false, 0x49));

    let typed: String = recorded(&rig)
        .iter()
        .filter_map(|e| match e.kind {
            EventKind::KeyTyped(k) => k.keychar,
            _ => None,
        })
        .collect();
    assert_eq!(typed, "hi");
}
