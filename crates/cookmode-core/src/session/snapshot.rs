//! Serializable session state, so progress can outlive the process.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CookingSession, SessionState};
use crate::error::ValidationError;
use crate::observer::Observers;
use crate::recipe::{sort_steps, Step};
use crate::timer::Clock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub steps: Vec<Step>,
    pub current_index: usize,
    #[serde(default)]
    pub completed: BTreeSet<usize>,
    pub state: SessionState,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl CookingSession {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            steps: self.steps.to_vec(),
            current_index: self.current_index,
            completed: self.completed.clone(),
            state: self.state,
            started_at: self.started_at,
        }
    }

    /// Rebuild a session from a snapshot.
    ///
    /// Completion marks beyond the step list are dropped.
    ///
    /// # Errors
    ///
    /// Fails when the steps contain duplicate order indices or the saved
    /// position lies outside the step list.
    pub fn restore(snapshot: SessionSnapshot, clock: Arc<dyn Clock>) -> Result<Self, ValidationError> {
        let steps = sort_steps(snapshot.steps)?;
        let len = steps.len();
        if snapshot.current_index >= len.max(1) {
            return Err(ValidationError::OutOfBounds {
                collection: "steps".into(),
                index: snapshot.current_index,
                len,
            });
        }

        let mut completed = snapshot.completed;
        let before = completed.len();
        completed.retain(|&i| i < len);
        if completed.len() != before {
            tracing::warn!(
                session_id = %snapshot.id,
                dropped = before - completed.len(),
                "dropping completion marks outside step list"
            );
        }

        Ok(Self {
            id: snapshot.id,
            steps: steps.into(),
            current_index: snapshot.current_index,
            completed,
            state: snapshot.state,
            started_at: snapshot.started_at,
            clock,
            observers: Observers::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::at_epoch())
    }

    fn cooked() -> CookingSession {
        let steps = (0..4).map(|i| Step::new(i, format!("s{i}"), u64::from(i) * 30)).collect();
        let mut s = CookingSession::with_clock(steps, clock()).unwrap();
        s.start();
        s.move_to_next_step();
        s.move_to_next_step();
        s.pause();
        s
    }

    #[test]
    fn restore_preserves_progress_and_lifecycle() {
        let s = cooked();
        let json = serde_json::to_string(&s.snapshot()).unwrap();
        let snap: SessionSnapshot = serde_json::from_str(&json).unwrap();
        let r = CookingSession::restore(snap, clock()).unwrap();

        assert_eq!(r.id(), s.id());
        assert_eq!(r.current_index(), 2);
        assert_eq!(r.completed_indices(), s.completed_indices());
        assert_eq!(r.state(), SessionState::Paused);
        assert_eq!(r.started_at(), s.started_at());
    }

    #[test]
    fn restore_rejects_position_out_of_range() {
        let mut snap = cooked().snapshot();
        snap.current_index = 4;
        let err = CookingSession::restore(snap, clock()).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfBounds { index: 4, len: 4, .. }));
    }

    #[test]
    fn restore_drops_stray_completion_marks() {
        let mut snap = cooked().snapshot();
        snap.completed.insert(17);
        let r = CookingSession::restore(snap, clock()).unwrap();
        assert!(!r.is_step_completed(17));
        assert_eq!(r.completed_indices().len(), 2);
    }

    #[test]
    fn empty_session_round_trips() {
        let s = CookingSession::with_clock(Vec::new(), clock()).unwrap();
        let r = CookingSession::restore(s.snapshot(), clock()).unwrap();
        assert_eq!(r.step_count(), 0);
        assert_eq!(r.current_index(), 0);
    }
}
