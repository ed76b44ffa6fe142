//! Recording injector for unit and integration tests.

use std::sync::Mutex;

use crate::application::post_input::{InjectionRequest, InputInjector, PostError};

/// Records every injected request; optionally starts failing after a set
/// number of successful injections.
#[derive(Default)]
pub struct RecordingInjector {
    requests: Mutex<Vec<InjectionRequest>>,
    attempts: Mutex<usize>,
    fail_after: Option<usize>,
}

impl RecordingInjector {
    /// Creates an injector that accepts `successes` requests and rejects
    /// every request after that.
    pub fn failing_after(successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::default()
        }
    }

    /// All successfully injected requests, in order.
    pub fn requests(&self) -> Vec<InjectionRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }

    /// Total injection attempts, including rejected ones.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().expect("lock poisoned")
    }
}

impl InputInjector for RecordingInjector {
    fn inject(&self, request: &InjectionRequest) -> Result<(), PostError> {
        *self.attempts.lock().expect("lock poisoned") += 1;

        let mut requests = self.requests.lock().expect("lock poisoned");
        if let Some(limit) = self.fail_after {
            if requests.len() >= limit {
                return Err(PostError::InjectionFailed("injected failure".to_string()));
            }
        }
        requests.push(*request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_requests_in_order() {
        // Arrange
        let injector = RecordingInjector::default();

        // Act
        injector
            .inject(&InjectionRequest::MouseMove { dx: 1, dy: 2 })
            .unwrap();
        injector
            .inject(&InjectionRequest::MouseWheel {
                delta: -120,
                horizontal: false,
            })
            .unwrap();

        // Assert
        assert_eq!(
            injector.requests(),
            vec![
                InjectionRequest::MouseMove { dx: 1, dy: 2 },
                InjectionRequest::MouseWheel {
                    delta: -120,
                    horizontal: false,
                },
            ]
        );
        assert_eq!(injector.attempts(), 2);
    }

    #[test]
    fn test_failing_after_rejects_subsequent_requests() {
        // Arrange
        let injector = RecordingInjector::failing_after(1);
        let request = InjectionRequest::MouseMove { dx: 0, dy: 0 };

        // Act / Assert
        assert!(injector.inject(&request).is_ok());
        assert!(matches!(
            injector.inject(&request),
            Err(PostError::InjectionFailed(_))
        ));
        assert_eq!(injector.requests().len(), 1);
        assert_eq!(injector.attempts(), 2);
    }
}
