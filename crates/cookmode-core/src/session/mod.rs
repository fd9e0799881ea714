//! Cooking session state machine.
//!
//! Tracks position through a fixed, ordered step list plus the set of steps
//! marked done. Pure state: no timers, no I/O. Every operation is total;
//! invalid requests degrade to no-ops.
//!
//! ## Lifecycle
//!
//! ```text
//! Inactive --start--> Running <--pause/resume--> Paused
//! Running | Paused --end--> Ended
//! any --restart--> Running (resets started_at)
//! ```

mod snapshot;

pub use snapshot::SessionSnapshot;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::events::SessionEvent;
use crate::observer::{ListenerId, Observers};
use crate::recipe::{sort_steps, Recipe, Step};
use crate::timer::{Clock, SystemClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Inactive,
    Running,
    Paused,
    /// Reached via `end()`. Only `restart()` leaves it.
    Ended,
}

impl SessionState {
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Running | SessionState::Paused)
    }
}

pub struct CookingSession {
    id: Uuid,
    steps: Arc<[Step]>,
    current_index: usize,
    completed: BTreeSet<usize>,
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    clock: Arc<dyn Clock>,
    observers: Observers<SessionEvent>,
}

impl CookingSession {
    /// Create a session over `steps`, ordered by `order_index`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateOrderIndex`] when two steps share
    /// an `order_index`.
    pub fn new(steps: Vec<Step>) -> Result<Self, ValidationError> {
        Self::with_clock(steps, Arc::new(SystemClock))
    }

    pub fn with_clock(steps: Vec<Step>, clock: Arc<dyn Clock>) -> Result<Self, ValidationError> {
        let steps = sort_steps(steps)?;
        Ok(Self::from_sorted(steps.into(), clock))
    }

    /// Steps of a [`Recipe`] are already validated and ordered.
    pub fn from_recipe(recipe: &Recipe, clock: Arc<dyn Clock>) -> Self {
        Self::from_sorted(recipe.steps.clone().into(), clock)
    }

    fn from_sorted(steps: Arc<[Step]>, clock: Arc<dyn Clock>) -> Self {
        Self {
            id: Uuid::new_v4(),
            steps,
            current_index: 0,
            completed: BTreeSet::new(),
            state: SessionState::Inactive,
            started_at: None,
            clock,
            observers: Observers::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Steps in cooking order. Shared with the timer engine.
    pub fn steps(&self) -> &Arc<[Step]> {
        &self.steps
    }

    pub fn sorted_steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current_index)
    }

    pub fn is_last_step(&self) -> bool {
        !self.steps.is_empty() && self.current_index == self.steps.len() - 1
    }

    pub fn completed_indices(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn is_step_completed(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    /// Fraction of steps marked done, `0.0` for an empty session.
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.completed.len() as f64 / self.steps.len() as f64
    }

    pub fn is_complete(&self) -> bool {
        self.completed.len() == self.steps.len()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.state == SessionState::Paused
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    // ── Listeners ────────────────────────────────────────────────────

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Begin cooking. Only valid from `Inactive`; returns whether it started.
    ///
    /// Use [`restart`](Self::restart) to start again after `end()` or to
    /// reset the start timestamp of a running session.
    pub fn start(&mut self) -> bool {
        if self.state != SessionState::Inactive {
            tracing::debug!(session_id = %self.id, state = ?self.state, "start ignored");
            return false;
        }
        self.started_at = Some(self.clock.now());
        self.transition(SessionState::Running);
        true
    }

    /// Force the session into `Running` from any state and record a fresh
    /// `started_at`. Position and completed steps are kept.
    pub fn restart(&mut self) {
        self.started_at = Some(self.clock.now());
        if self.state == SessionState::Running {
            // No state change, but the timestamp moved.
            self.observers.notify(&SessionEvent::LifecycleChanged {
                session_id: self.id,
                from: SessionState::Running,
                to: SessionState::Running,
                at: self.clock.now(),
            });
        } else {
            self.transition(SessionState::Running);
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.transition(SessionState::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            return false;
        }
        self.transition(SessionState::Running);
        true
    }

    /// Leave cooking mode. Idempotent; a session that never started stays
    /// `Inactive`.
    pub fn end(&mut self) {
        if self.state.is_active() {
            self.transition(SessionState::Ended);
        }
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        self.state = to;
        tracing::debug!(session_id = %self.id, ?from, ?to, "session lifecycle");
        self.observers.notify(&SessionEvent::LifecycleChanged {
            session_id: self.id,
            from,
            to,
            at: self.clock.now(),
        });
    }

    // ── Navigation ───────────────────────────────────────────────────

    pub fn mark_current_step_complete(&mut self) {
        if self.steps.is_empty() || !self.completed.insert(self.current_index) {
            return;
        }
        self.observers.notify(&SessionEvent::StepCompleted {
            session_id: self.id,
            step_index: self.current_index,
        });
        if self.is_complete() {
            tracing::info!(session_id = %self.id, "all steps completed");
            self.observers.notify(&SessionEvent::RecipeFinished {
                session_id: self.id,
            });
        }
    }

    /// Mark the current step done, then advance.
    ///
    /// Returns `false` (after marking) when already on the last step.
    pub fn move_to_next_step(&mut self) -> bool {
        self.mark_current_step_complete();
        if self.steps.is_empty() || self.is_last_step() {
            return false;
        }
        self.set_index(self.current_index + 1);
        true
    }

    /// Step back one position. Completion marks are left alone.
    pub fn move_to_previous_step(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.set_index(self.current_index - 1);
        true
    }

    /// Jump to `index`; out-of-range indices are ignored.
    pub fn jump_to_step(&mut self, index: usize) {
        if index < self.steps.len() {
            self.set_index(index);
        } else {
            tracing::debug!(session_id = %self.id, index, len = self.steps.len(), "jump out of range ignored");
        }
    }

    /// Forget all completion marks and return to the first step.
    pub fn reset_progress(&mut self) {
        if self.completed.is_empty() && self.current_index == 0 {
            return;
        }
        self.completed.clear();
        self.current_index = 0;
        self.observers.notify(&SessionEvent::ProgressReset {
            session_id: self.id,
        });
    }

    fn set_index(&mut self, to: usize) {
        let from = self.current_index;
        if from == to {
            return;
        }
        self.current_index = to;
        self.observers.notify(&SessionEvent::PositionChanged {
            session_id: self.id,
            from,
            to,
        });
    }
}

impl std::fmt::Debug for CookingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookingSession")
            .field("id", &self.id)
            .field("steps", &self.steps.len())
            .field("current_index", &self.current_index)
            .field("completed", &self.completed)
            .field("state", &self.state)
            .field("started_at", &self.started_at)
            .finish()
    }
}
