//! Logging utilities for structured tracing

use crate::error::EnricherError;
use std::time::Instant;

/// Track operation timing and log on drop
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Milliseconds since the timer started
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        tracing::debug!(
            operation = self.operation,
            duration_ms = self.elapsed_ms(),
            "Operation completed"
        );
    }
}

/// Log a failed operation with the error's kind as a field
///
/// Retry and dead-letter decisions downstream key off `error_kind`.
pub fn log_error(operation: &str, replay_id: Option<&str>, error: &EnricherError) {
    tracing::error!(
        operation = %operation,
        replay_id = replay_id.unwrap_or("-"),
        error_kind = error.kind(),
        error = %error,
        "Operation failed"
    );
}
