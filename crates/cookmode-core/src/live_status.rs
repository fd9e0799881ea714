//! Read-only projections of session and timer state.
//!
//! [`LiveStatus`] is what a lock-screen or status-bar surface needs;
//! [`SessionOverview`] is a fuller view for in-app presentation. Both are
//! pure functions of their inputs. Pushing them anywhere is the host's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{CookingSession, SessionState};
use crate::timer::StepTimer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub recipe_name: String,
    /// 1-based; `0` when the recipe has no steps.
    pub current_step_number: usize,
    pub total_steps: usize,
    /// Earliest deadline among running timers.
    pub next_timer_deadline: Option<DateTime<Utc>>,
    /// Step owning the next deadline, or the current step when no timer runs.
    pub active_step_description: Option<String>,
}

impl LiveStatus {
    pub fn project(recipe_name: &str, session: &CookingSession, timers: &[StepTimer]) -> Self {
        let total_steps = session.step_count();
        let next = timers
            .iter()
            .filter(|t| t.is_running)
            .min_by_key(|t| (t.deadline(), t.step_key));

        let active_step_description = match next {
            Some(timer) => session
                .sorted_steps()
                .get(timer.step_key)
                .map(|s| s.instruction.clone()),
            None => None,
        }
        .or_else(|| session.current_step().map(|s| s.instruction.clone()));

        Self {
            recipe_name: recipe_name.to_string(),
            current_step_number: if total_steps == 0 {
                0
            } else {
                session.current_index() + 1
            },
            total_steps,
            next_timer_deadline: next.map(StepTimer::deadline),
            active_step_description,
        }
    }
}

/// One row of [`SessionOverview::steps`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepView {
    pub index: usize,
    pub instruction: String,
    pub duration_secs: u64,
    pub completed: bool,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOverview {
    pub session_id: Uuid,
    pub recipe_name: String,
    pub state: SessionState,
    pub started_at: Option<DateTime<Utc>>,
    pub current_index: usize,
    pub progress_pct: f64,
    pub is_complete: bool,
    pub steps: Vec<StepView>,
    pub active_timers: Vec<StepTimer>,
}

impl SessionOverview {
    pub fn build(recipe_name: &str, session: &CookingSession, timers: &[StepTimer]) -> Self {
        let steps = session
            .sorted_steps()
            .iter()
            .enumerate()
            .map(|(index, step)| StepView {
                index,
                instruction: step.instruction.clone(),
                duration_secs: step.duration_secs,
                completed: session.is_step_completed(index),
                current: index == session.current_index() && session.step_count() > 0,
                remaining_secs: timers
                    .iter()
                    .find(|t| t.step_key == index)
                    .map(|t| t.remaining_secs),
            })
            .collect();

        Self {
            session_id: session.id(),
            recipe_name: recipe_name.to_string(),
            state: session.state(),
            started_at: session.started_at(),
            current_index: session.current_index(),
            progress_pct: (session.progress() * 100.0).min(100.0),
            is_complete: session.is_complete(),
            steps,
            active_timers: timers.to_vec(),
        }
    }
}

/// `mm:ss`, or `h:mm:ss` past an hour.
pub fn format_remaining(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Step;
    use crate::timer::{Clock, ManualClock};
    use chrono::Duration;
    use std::sync::Arc;

    fn session() -> CookingSession {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_epoch());
        CookingSession::with_clock(
            vec![
                Step::new(0, "Sear the beef", 0),
                Step::new(1, "Braise", 7200),
                Step::new(2, "Reduce sauce", 600),
            ],
            clock,
        )
        .unwrap()
    }

    fn timer(key: usize, total: u64, start: i64) -> StepTimer {
        StepTimer::new(key, total, DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(start))
    }

    #[test]
    fn without_timers_describes_current_step() {
        let mut s = session();
        s.move_to_next_step();
        let status = LiveStatus::project("Short ribs", &s, &[]);
        assert_eq!(status.current_step_number, 2);
        assert_eq!(status.total_steps, 3);
        assert!(status.next_timer_deadline.is_none());
        assert_eq!(status.active_step_description.as_deref(), Some("Braise"));
    }

    #[test]
    fn earliest_deadline_wins() {
        let s = session();
        let timers = vec![timer(1, 7200, 0), timer(2, 600, 100)];
        let status = LiveStatus::project("Short ribs", &s, &timers);
        assert_eq!(
            status.next_timer_deadline,
            Some(DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(700))
        );
        assert_eq!(status.active_step_description.as_deref(), Some("Reduce sauce"));
    }

    #[test]
    fn finished_timers_are_not_deadlines() {
        let s = session();
        let mut done = timer(2, 600, 0);
        done.recompute(DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(601));
        let status = LiveStatus::project("Short ribs", &s, &[done]);
        assert!(status.next_timer_deadline.is_none());
        assert_eq!(status.active_step_description.as_deref(), Some("Sear the beef"));
    }

    #[test]
    fn empty_session_projects_zero() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_epoch());
        let s = CookingSession::with_clock(Vec::new(), clock).unwrap();
        let status = LiveStatus::project("Nothing", &s, &[]);
        assert_eq!(status.current_step_number, 0);
        assert_eq!(status.total_steps, 0);
        assert!(status.active_step_description.is_none());
    }

    #[test]
    fn overview_marks_current_completed_and_remaining() {
        let mut s = session();
        s.move_to_next_step();
        let overview = SessionOverview::build("Short ribs", &s, &[timer(1, 7200, 0)]);
        assert!(overview.steps[0].completed);
        assert!(overview.steps[1].current);
        assert_eq!(overview.steps[1].remaining_secs, Some(7200));
        assert_eq!(overview.steps[2].remaining_secs, None);
        assert!((overview.progress_pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn format_remaining_switches_to_hours() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(125), "02:05");
        assert_eq!(format_remaining(3_725), "1:02:05");
    }
}
