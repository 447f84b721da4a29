//! Progress reporting for long-running pipeline stages.
//!
//! The orchestrator and matchers push human-readable milestones into a
//! `ProgressSink`. Callers may buffer them (`ProgressLog`), stream them, or
//! drop them (`NoProgress`).

use std::sync::Mutex;

use tracing::info;

pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Discards every message.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _message: &str) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Buffers messages for the response `logs` field and mirrors them to tracing.
#[derive(Default)]
pub struct ProgressLog {
    messages: Mutex<Vec<String>>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressSink for ProgressLog {
    fn report(&self, message: &str) {
        info!(target: "jobscout::progress", "{message}");
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}
