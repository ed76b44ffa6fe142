//! The event dispatch sink: one registered consumer for every canonical
//! event.
//!
//! This is a strict synchronous contract, not a queue. The producer invokes
//! the sink on the hook thread and waits for it to return before deciding
//! whether to suppress the native event, so a slow sink directly delays the
//! OS hook pipeline. Fan-out to multiple consumers, if wanted, is the sink's
//! own responsibility.

use tracing::{debug, warn};

use crate::domain::event::InputEvent;

/// A consumer of canonical events.
///
/// `handle` returns `true` to consume the event: the native layer will then
/// suppress it from further propagation, and derived follow-ups (Clicked,
/// KeyTyped) are not produced.
pub trait EventSink: Send {
    fn handle(&self, event: &InputEvent) -> bool;
}

/// Closures work as sinks, which keeps tests and simple consumers short.
impl<F> EventSink for F
where
    F: Fn(&InputEvent) -> bool + Send,
{
    fn handle(&self, event: &InputEvent) -> bool {
        self(event)
    }
}

/// The single dispatch slot. Registration replaces the previous sink
/// entirely; the last registration wins.
#[derive(Default)]
pub struct Dispatcher {
    sink: Option<Box<dyn EventSink>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no sink registered.
    pub fn new() -> Self {
        Self { sink: None }
    }

    /// Registers the sink, replacing any previous registration.
    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        debug!("replacing dispatch sink");
        self.sink = Some(sink);
    }

    /// Removes the registered sink, if any.
    pub fn clear_sink(&mut self) {
        self.sink = None;
    }

    /// Returns `true` if a sink is registered.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Dispatches one event synchronously.
    ///
    /// Records the sink's verdict in `event.consumed` and returns it. With
    /// no sink registered the event is dropped and logged, not buffered.
    pub fn dispatch(&self, event: &mut InputEvent) -> bool {
        match &self.sink {
            Some(sink) => {
                debug!(type_code = event.kind.type_code(), "dispatching event");
                let consumed = sink.handle(event);
                event.consumed = consumed;
                consumed
            }
            None => {
                warn!("no dispatch sink registered, dropping event");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventKind;
    use crate::domain::mask::ModifierMask;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn lifecycle_event() -> InputEvent {
        InputEvent::new(0, ModifierMask::empty(), EventKind::HookEnabled)
    }

    #[test]
    fn test_dispatch_records_consumed_verdict_on_event() {
        // Arrange
        let mut dispatcher = Dispatcher::new();
        dispatcher.set_sink(Box::new(|_: &InputEvent| true));
        let mut event = lifecycle_event();

        // Act
        let consumed = dispatcher.dispatch(&mut event);

        // Assert
        assert!(consumed);
        assert!(event.consumed);
    }

    #[test]
    fn test_dispatch_without_sink_drops_event_unconsumed() {
        let dispatcher = Dispatcher::new();
        let mut event = lifecycle_event();
        assert!(!dispatcher.dispatch(&mut event));
        assert!(!event.consumed);
    }

    #[test]
    fn test_last_registration_wins() {
        // Arrange – two sinks, each counting its own invocations
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new();

        let first = Arc::clone(&first_calls);
        dispatcher.set_sink(Box::new(move |_: &InputEvent| {
            first.fetch_add(1, Ordering::SeqCst);
            false
        }));
        let second = Arc::clone(&second_calls);
        dispatcher.set_sink(Box::new(move |_: &InputEvent| {
            second.fetch_add(1, Ordering::SeqCst);
            false
        }));

        // Act
        dispatcher.dispatch(&mut lifecycle_event());

        // Assert – only the replacement sink sees the event
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_sink_returns_to_dropping() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.set_sink(Box::new(|_: &InputEvent| true));
        assert!(dispatcher.has_sink());

        dispatcher.clear_sink();
        assert!(!dispatcher.has_sink());
        assert!(!dispatcher.dispatch(&mut lifecycle_event()));
    }
}
