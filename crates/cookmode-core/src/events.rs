use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionState;
use crate::timer::StepKey;

/// Emitted by a [`CookingSession`](crate::session::CookingSession) after each
/// effective state change. No-op calls emit nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    LifecycleChanged {
        session_id: Uuid,
        from: SessionState,
        to: SessionState,
        at: DateTime<Utc>,
    },
    StepCompleted {
        session_id: Uuid,
        step_index: usize,
    },
    PositionChanged {
        session_id: Uuid,
        from: usize,
        to: usize,
    },
    /// All steps are now marked done.
    RecipeFinished {
        session_id: Uuid,
    },
    ProgressReset {
        session_id: Uuid,
    },
}

/// Emitted by the [`TimerEngine`](crate::timer::TimerEngine), always after
/// its registry lock has been released.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Started {
        step_key: StepKey,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    Ticked {
        step_key: StepKey,
        remaining_secs: u64,
    },
    Cancelled {
        step_key: StepKey,
        remaining_secs: u64,
    },
    Completed {
        step_key: StepKey,
        at: DateTime<Utc>,
    },
}

impl TimerEvent {
    pub fn step_key(&self) -> StepKey {
        match self {
            TimerEvent::Started { step_key, .. }
            | TimerEvent::Ticked { step_key, .. }
            | TimerEvent::Cancelled { step_key, .. }
            | TimerEvent::Completed { step_key, .. } => *step_key,
        }
    }
}
