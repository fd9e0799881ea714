//! Completion alerts.
//!
//! The engine calls an [`AlertSink`] exactly once per finished countdown.
//! How the alert is presented (sound, haptics, a notification banner) is up
//! to the host.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::state::StepKey;
use crate::error::AlertError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerAlert {
    pub step_key: StepKey,
    /// Instruction text of the step the timer belonged to.
    pub instruction: String,
    pub duration_secs: u64,
    pub completed_at: DateTime<Utc>,
}

impl TimerAlert {
    /// Short human-readable notification title.
    pub fn title(&self) -> String {
        format!("Step {} timer done", self.step_key + 1)
    }
}

pub trait AlertSink: Send + Sync {
    /// Present a completed timer. Failures are logged by the engine and not
    /// retried.
    fn timer_completed(&self, alert: &TimerAlert) -> Result<(), AlertError>;
}

/// Writes completions to the log and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn timer_completed(&self, alert: &TimerAlert) -> Result<(), AlertError> {
        tracing::info!(
            step_key = alert.step_key,
            instruction = %alert.instruction,
            "{}",
            alert.title()
        );
        Ok(())
    }
}

/// Keeps every alert it receives. Useful for hosts that poll for alerts and
/// for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlertSink {
    alerts: Arc<Mutex<Vec<TimerAlert>>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<TimerAlert> {
        self.alerts.lock().clone()
    }

    pub fn count_for(&self, step_key: StepKey) -> usize {
        self.alerts
            .lock()
            .iter()
            .filter(|a| a.step_key == step_key)
            .count()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<TimerAlert> {
        std::mem::take(&mut *self.alerts.lock())
    }
}

impl AlertSink for RecordingAlertSink {
    fn timer_completed(&self, alert: &TimerAlert) -> Result<(), AlertError> {
        self.alerts.lock().push(alert.clone());
        Ok(())
    }
}
