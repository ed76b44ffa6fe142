//! Mock hook backend for tests and platforms without a native listener.
//!
//! Drives the [`RawEventHandler`] directly on the caller's thread, which is
//! exactly the serial, synchronous delivery contract the real backends
//! provide.

use std::sync::{Arc, Mutex};

use super::{Disposition, HookBackend, HookError, RawEventHandler, RawKeyEvent, RawMouseEvent};

/// A hook backend that delivers whatever events the test injects.
#[derive(Default, Clone)]
pub struct MockHookBackend {
    handler: Arc<Mutex<Option<Box<dyn RawEventHandler>>>>,
}

impl MockHookBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a handler is installed.
    pub fn is_running(&self) -> bool {
        self.handler.lock().expect("lock poisoned").is_some()
    }

    /// Delivers a raw keyboard notification, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called.
    pub fn drive_key(&self, event: RawKeyEvent) -> Disposition {
        self.handler
            .lock()
            .expect("lock poisoned")
            .as_mut()
            .expect("MockHookBackend::drive_key called before start()")
            .handle_key(event)
    }

    /// Delivers a raw mouse notification, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called.
    pub fn drive_mouse(&self, event: RawMouseEvent) -> Disposition {
        self.handler
            .lock()
            .expect("lock poisoned")
            .as_mut()
            .expect("MockHookBackend::drive_mouse called before start()")
            .handle_mouse(event)
    }
}

impl HookBackend for MockHookBackend {
    fn start(&self, mut handler: Box<dyn RawEventHandler>) -> Result<(), HookError> {
        let mut slot = self.handler.lock().expect("lock poisoned");
        if slot.is_some() {
            return Err(HookError::AlreadyRunning);
        }
        handler.hook_enabled();
        *slot = Some(handler);
        Ok(())
    }

    fn stop(&self) -> Result<(), HookError> {
        let mut slot = self.handler.lock().expect("lock poisoned");
        match slot.take() {
            Some(mut handler) => {
                handler.hook_disabled();
                Ok(())
            }
            None => Err(HookError::NotRunning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts lifecycle calls and returns a scripted verdict.
    struct CountingHandler {
        enabled: Arc<AtomicUsize>,
        disabled: Arc<AtomicUsize>,
        verdict: Disposition,
    }

    impl RawEventHandler for CountingHandler {
        fn hook_enabled(&mut self) {
            self.enabled.fetch_add(1, Ordering::SeqCst);
        }

        fn hook_disabled(&mut self) {
            self.disabled.fetch_add(1, Ordering::SeqCst);
        }

        fn handle_key(&mut self, _: RawKeyEvent) -> Disposition {
            self.verdict
        }

        fn handle_mouse(&mut self, _: RawMouseEvent) -> Disposition {
            self.verdict
        }
    }

    fn counting_handler(verdict: Disposition) -> (CountingHandler, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let enabled = Arc::new(AtomicUsize::new(0));
        let disabled = Arc::new(AtomicUsize::new(0));
        (
            CountingHandler {
                enabled: Arc::clone(&enabled),
                disabled: Arc::clone(&disabled),
                verdict,
            },
            enabled,
            disabled,
        )
    }

    #[test]
    fn test_start_fires_enabled_and_stop_fires_disabled() {
        // Arrange
        let backend = MockHookBackend::new();
        let (handler, enabled, disabled) = counting_handler(Disposition::Propagate);

        // Act / Assert
        backend.start(Box::new(handler)).expect("start should succeed");
        assert_eq!(enabled.load(Ordering::SeqCst), 1);
        assert!(backend.is_running());

        backend.stop().expect("stop should succeed");
        assert_eq!(disabled.load(Ordering::SeqCst), 1);
        assert!(!backend.is_running());
    }

    #[test]
    fn test_double_start_is_rejected() {
        let backend = MockHookBackend::new();
        let (first, _, _) = counting_handler(Disposition::Propagate);
        let (second, _, _) = counting_handler(Disposition::Propagate);

        backend.start(Box::new(first)).unwrap();
        assert!(matches!(
            backend.start(Box::new(second)),
            Err(HookError::AlreadyRunning)
        ));
    }

    #[test]
    fn test_stop_without_start_is_rejected() {
        let backend = MockHookBackend::new();
        assert!(matches!(backend.stop(), Err(HookError::NotRunning)));
    }

    #[test]
    fn test_drive_returns_handler_verdict() {
        // Arrange
        let backend = MockHookBackend::new();
        let (handler, _, _) = counting_handler(Disposition::Suppress);
        backend.start(Box::new(handler)).unwrap();

        // Act
        let verdict = backend.drive_key(RawKeyEvent {
            pressed: true,
            vk_code: 0x41,
            scan_code: 0x1E,
            extended: false,
            time_ms: 0,
        });

        // Assert
        assert_eq!(verdict, Disposition::Suppress);
    }
}
