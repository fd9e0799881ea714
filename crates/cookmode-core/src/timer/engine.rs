//! Multi-timer engine.
//!
//! Runs any number of independent countdowns, one per step key. Remaining
//! time is recomputed from each timer's absolute start time on every tick, so
//! a host that was suspended for a while catches up on the first tick after
//! it resumes.
//!
//! ## Lifecycle of one timer
//!
//! ```text
//! start_timer -> tick ... tick -> (remaining == 0) -> alert, removed
//!             \-> cancel_timer / restarted for the same key -> removed
//! ```
//!
//! ## Dispatch
//!
//! Ticks, starts and cancels are serialized by a re-entrant dispatch lock
//! that a tick holds until its alert and listener calls have returned. Once
//! `cancel_timer` returns, nothing more is delivered for that key. Sinks and
//! listeners may call back into the engine from the dispatching thread, but
//! must not wait on another thread that does.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = TimerEngine::new(steps, clock, scheduler, sink);
//! engine.start_timer(1, 120);
//! // Ticks arrive from the scheduler, or the host calls:
//! engine.tick_all();
//! ```

use std::collections::btree_map::{self, BTreeMap};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};

use super::alert::{AlertSink, TimerAlert};
use super::clock::Clock;
use super::scheduler::{TickScheduler, TickSubscription};
use super::state::{StepKey, StepTimer};
use crate::events::TimerEvent;
use crate::observer::{ListenerId, Observers};
use crate::recipe::Step;

/// Coordinator for per-step countdowns.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct TimerEngine {
    inner: Arc<Inner>,
}

struct Inner {
    steps: Arc<[Step]>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn TickScheduler>,
    sink: Arc<dyn AlertSink>,
    dispatch: ReentrantMutex<()>,
    registry: Mutex<Registry>,
    observers: Observers<TimerEvent>,
}

#[derive(Default)]
struct Registry {
    next_generation: u64,
    entries: BTreeMap<StepKey, Entry>,
}

struct Entry {
    timer: StepTimer,
    /// Bumped on every (re)start so stale ticks can be told apart.
    generation: u64,
    subscription: Option<Box<dyn TickSubscription>>,
}

impl Entry {
    fn cancel(&self) {
        if let Some(sub) = &self.subscription {
            sub.cancel();
        }
    }
}

enum TickOutcome {
    Ticked(u64),
    Completed(Entry),
}

/// Persistable form of the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub timers: Vec<TimerRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub step_key: StepKey,
    pub total_duration_secs: u64,
    pub start_time: DateTime<Utc>,
}

impl TimerEngine {
    /// Create an engine for one session's steps.
    ///
    /// `steps` is only used to look up durations and instruction text.
    pub fn new(
        steps: Arc<[Step]>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn TickScheduler>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                steps,
                clock,
                scheduler,
                sink,
                dispatch: ReentrantMutex::new(()),
                registry: Mutex::new(Registry::default()),
                observers: Observers::new(),
            }),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Active timers ordered by step key, as of their last tick.
    pub fn list_active_timers(&self) -> Vec<StepTimer> {
        self.inner
            .registry
            .lock()
            .entries
            .values()
            .map(|e| e.timer.clone())
            .collect()
    }

    pub fn timer(&self, step_key: StepKey) -> Option<StepTimer> {
        self.inner
            .registry
            .lock()
            .entries
            .get(&step_key)
            .map(|e| e.timer.clone())
    }

    pub fn has_timer(&self, step_key: StepKey) -> bool {
        self.inner.registry.lock().entries.contains_key(&step_key)
    }

    pub fn active_count(&self) -> usize {
        self.inner.registry.lock().entries.len()
    }

    pub fn steps(&self) -> &Arc<[Step]> {
        &self.inner.steps
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            timers: self
                .inner
                .registry
                .lock()
                .entries
                .values()
                .map(|e| TimerRecord {
                    step_key: e.timer.step_key,
                    total_duration_secs: e.timer.total_duration_secs,
                    start_time: e.timer.start_time,
                })
                .collect(),
        }
    }

    // ── Listeners ────────────────────────────────────────────────────

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&TimerEvent) + Send + Sync + 'static,
    {
        self.inner.observers.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.observers.unsubscribe(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a countdown for `step_key`, replacing any existing one.
    ///
    /// A zero duration is a no-op.
    pub fn start_timer(&self, step_key: StepKey, duration_secs: u64) {
        if duration_secs == 0 {
            tracing::debug!(step_key, "ignoring zero-duration timer");
            return;
        }
        let now = self.inner.clock.now();
        self.install(step_key, duration_secs, now);
    }

    /// Start a countdown using the step's own duration.
    ///
    /// Unknown keys and steps without a duration are ignored.
    pub fn start_timer_for_step(&self, step_key: StepKey) {
        match self.inner.steps.get(step_key) {
            Some(step) => self.start_timer(step_key, step.duration_secs),
            None => tracing::debug!(step_key, "no such step, timer not started"),
        }
    }

    /// Recompute one timer from absolute time, completing it at zero.
    pub fn tick(&self, step_key: StepKey) {
        self.inner.tick(step_key, None);
    }

    /// Tick every registered timer in key order.
    pub fn tick_all(&self) {
        let keys: Vec<StepKey> = self.inner.registry.lock().entries.keys().copied().collect();
        for key in keys {
            self.inner.tick(key, None);
        }
    }

    /// Stop and forget the timer for `step_key`. Unknown keys are ignored.
    pub fn cancel_timer(&self, step_key: StepKey) {
        let _dispatch = self.inner.dispatch.lock();
        let removed = self.inner.registry.lock().entries.remove(&step_key);
        if let Some(entry) = removed {
            entry.cancel();
            tracing::debug!(step_key, remaining_secs = entry.timer.remaining_secs, "timer cancelled");
            self.inner.observers.notify(&TimerEvent::Cancelled {
                step_key,
                remaining_secs: entry.timer.remaining_secs,
            });
        }
    }

    pub fn cancel_all_timers(&self) {
        let _dispatch = self.inner.dispatch.lock();
        let removed = std::mem::take(&mut self.inner.registry.lock().entries);
        for (step_key, entry) in removed {
            entry.cancel();
            self.inner.observers.notify(&TimerEvent::Cancelled {
                step_key,
                remaining_secs: entry.timer.remaining_secs,
            });
        }
    }

    /// Re-register timers from a snapshot.
    ///
    /// Remaining time is recomputed immediately; a timer whose deadline has
    /// already passed is kept with `is_running == false` and completes on
    /// its next tick.
    pub fn restore(&self, snapshot: &TimerSnapshot) {
        for record in &snapshot.timers {
            if record.total_duration_secs == 0 {
                tracing::warn!(step_key = record.step_key, "skipping zero-duration timer in snapshot");
                continue;
            }
            self.install(record.step_key, record.total_duration_secs, record.start_time);
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn install(&self, step_key: StepKey, duration_secs: u64, start_time: DateTime<Utc>) {
        let _dispatch = self.inner.dispatch.lock();
        let now = self.inner.clock.now();
        let mut timer = StepTimer::new(step_key, duration_secs, start_time);
        timer.recompute(now);

        let (generation, replaced) = {
            let mut reg = self.inner.registry.lock();
            let replaced = reg.entries.remove(&step_key);
            let generation = reg.next_generation;
            reg.next_generation += 1;
            reg.entries.insert(
                step_key,
                Entry {
                    timer,
                    generation,
                    subscription: None,
                },
            );
            (generation, replaced)
        };

        if let Some(old) = replaced {
            old.cancel();
            tracing::debug!(step_key, "replaced existing timer");
            self.inner.observers.notify(&TimerEvent::Cancelled {
                step_key,
                remaining_secs: old.timer.remaining_secs,
            });
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let subscription = self.inner.scheduler.schedule(
            step_key,
            Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.tick(step_key, Some(generation));
                }
            }),
        );

        // The entry may have been cancelled or replaced while scheduling.
        let orphan = {
            let mut reg = self.inner.registry.lock();
            match reg.entries.get_mut(&step_key) {
                Some(entry) if entry.generation == generation => {
                    entry.subscription = Some(subscription);
                    None
                }
                _ => Some(subscription),
            }
        };
        if let Some(subscription) = orphan {
            subscription.cancel();
            return;
        }

        tracing::debug!(step_key, duration_secs, "timer started");
        self.inner.observers.notify(&TimerEvent::Started {
            step_key,
            duration_secs,
            at: start_time,
        });
    }
}

impl Inner {
    /// `generation` is `Some` for scheduler-delivered ticks, which must match
    /// the current entry; host-driven ticks pass `None`.
    fn tick(&self, step_key: StepKey, generation: Option<u64>) {
        let _dispatch = self.dispatch.lock();
        let now = self.clock.now();
        let outcome = {
            let mut reg = self.registry.lock();
            let btree_map::Entry::Occupied(mut slot) = reg.entries.entry(step_key) else {
                return;
            };
            if generation.is_some_and(|g| g != slot.get().generation) {
                return;
            }
            let remaining = slot.get_mut().timer.recompute(now);
            if remaining > 0 {
                TickOutcome::Ticked(remaining)
            } else {
                TickOutcome::Completed(slot.remove())
            }
        };

        match outcome {
            TickOutcome::Ticked(remaining_secs) => {
                self.observers.notify(&TimerEvent::Ticked {
                    step_key,
                    remaining_secs,
                });
            }
            TickOutcome::Completed(entry) => {
                entry.cancel();
                self.complete(entry.timer, now);
            }
        }
    }

    fn complete(&self, timer: StepTimer, now: DateTime<Utc>) {
        let instruction = self
            .steps
            .get(timer.step_key)
            .map(|s| s.instruction.clone())
            .unwrap_or_else(|| format!("Step {}", timer.step_key + 1));
        let alert = TimerAlert {
            step_key: timer.step_key,
            instruction,
            duration_secs: timer.total_duration_secs,
            completed_at: now,
        };

        tracing::info!(step_key = timer.step_key, "timer completed");
        if let Err(e) = self.sink.timer_completed(&alert) {
            tracing::warn!(step_key = timer.step_key, error = %e, "completion alert failed");
        }
        self.observers.notify(&TimerEvent::Completed {
            step_key: timer.step_key,
            at: now,
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for entry in self.registry.get_mut().entries.values() {
            entry.cancel();
        }
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("steps", &self.inner.steps.len())
            .field("active", &self.list_active_timers())
            .finish()
    }
}
