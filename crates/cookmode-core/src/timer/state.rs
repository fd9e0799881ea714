use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Timers are addressed by the 0-based position of their step.
pub type StepKey = usize;

/// Countdown state for one step.
///
/// `remaining_secs` is always derived from `start_time`; it is never
/// decremented in place, so a late tick catches up in one go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTimer {
    pub step_key: StepKey,
    pub total_duration_secs: u64,
    pub start_time: DateTime<Utc>,
    pub remaining_secs: u64,
    /// `false` once the countdown reached zero.
    pub is_running: bool,
}

impl StepTimer {
    pub fn new(step_key: StepKey, total_duration_secs: u64, start_time: DateTime<Utc>) -> Self {
        Self {
            step_key,
            total_duration_secs,
            start_time,
            remaining_secs: total_duration_secs,
            is_running: total_duration_secs > 0,
        }
    }

    /// Whole seconds elapsed since `start_time`. A clock that went backwards
    /// counts as zero elapsed.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.start_time).num_seconds()).unwrap_or(0)
    }

    /// Recompute `remaining_secs` from absolute time. Returns the new value.
    pub fn recompute(&mut self, now: DateTime<Utc>) -> u64 {
        self.remaining_secs = self
            .total_duration_secs
            .saturating_sub(self.elapsed_secs(now));
        if self.remaining_secs == 0 {
            self.is_running = false;
        }
        self.remaining_secs
    }

    /// Wall-clock instant at which the countdown reaches zero.
    pub fn deadline(&self) -> DateTime<Utc> {
        let secs = i64::try_from(self.total_duration_secs).unwrap_or(i64::MAX);
        self.start_time
            .checked_add_signed(Duration::try_seconds(secs).unwrap_or(Duration::MAX))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// 0.0 .. 1.0 fraction of the countdown that has elapsed.
    pub fn progress(&self) -> f64 {
        if self.total_duration_secs == 0 {
            return 1.0;
        }
        1.0 - (self.remaining_secs as f64 / self.total_duration_secs as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
    }

    #[test]
    fn recompute_uses_absolute_elapsed_time() {
        let mut timer = StepTimer::new(1, 120, t(0));
        assert_eq!(timer.recompute(t(30)), 90);
        assert_eq!(timer.recompute(t(31)), 89);
        assert!(timer.is_running);
    }

    #[test]
    fn remaining_never_goes_negative() {
        let mut timer = StepTimer::new(1, 120, t(0));
        assert_eq!(timer.recompute(t(10_000)), 0);
        assert!(!timer.is_running);
    }

    #[test]
    fn clock_going_backwards_counts_as_zero_elapsed() {
        let mut timer = StepTimer::new(0, 60, t(100));
        assert_eq!(timer.recompute(t(40)), 60);
    }

    #[test]
    fn partial_seconds_are_floored() {
        let mut timer = StepTimer::new(0, 10, t(0));
        let now = t(3) + Duration::milliseconds(999);
        assert_eq!(timer.recompute(now), 7);
    }

    #[test]
    fn deadline_and_progress() {
        let mut timer = StepTimer::new(2, 200, t(50));
        assert_eq!(timer.deadline(), t(250));
        timer.recompute(t(100));
        assert!((timer.progress() - 0.25).abs() < f64::EPSILON);
    }
}
