//! Periodic tick subscriptions.
//!
//! The engine asks a [`TickScheduler`] for one subscription per timer key.
//! Each subscription delivers ticks for its key sequentially; different keys
//! tick independently of each other.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

use super::state::StepKey;

/// Callback invoked on every tick for one key.
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// Cancellation handle for a tick subscription. Cancelling twice is harmless.
pub trait TickSubscription: Send {
    fn cancel(&self);
}

pub trait TickScheduler: Send + Sync {
    /// Start delivering ticks for `key`.
    ///
    /// Implementations must not invoke `tick` synchronously from inside this
    /// call.
    fn schedule(&self, key: StepKey, tick: TickFn) -> Box<dyn TickSubscription>;
}

// ── Tokio ────────────────────────────────────────────────────────────

/// One `tokio::time::interval` task per key.
#[derive(Debug, Clone)]
pub struct TokioTickScheduler {
    handle: Handle,
    period: Duration,
}

impl TokioTickScheduler {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    /// Uses the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn new(period: Duration) -> Self {
        Self::with_handle(Handle::current(), period)
    }

    pub fn with_handle(handle: Handle, period: Duration) -> Self {
        Self { handle, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

struct TokioSubscription(AbortHandle);

impl TickSubscription for TokioSubscription {
    fn cancel(&self) {
        self.0.abort();
    }
}

impl TickScheduler for TokioTickScheduler {
    fn schedule(&self, key: StepKey, tick: TickFn) -> Box<dyn TickSubscription> {
        let period = self.period;
        let task = self.handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                tracing::trace!(step_key = key, "tick");
                tick();
            }
        });
        Box::new(TokioSubscription(task.abort_handle()))
    }
}

// ── Manual ───────────────────────────────────────────────────────────

/// Scheduler driven by explicit calls to [`fire`](Self::fire).
///
/// Used in tests and by short-lived hosts that tick on demand.
#[derive(Clone, Default)]
pub struct ManualTickScheduler {
    subs: Arc<Mutex<BTreeMap<StepKey, Vec<ManualEntry>>>>,
}

struct ManualEntry {
    tick: TickFn,
    cancelled: Arc<Mutex<bool>>,
}

struct ManualSubscription {
    cancelled: Arc<Mutex<bool>>,
}

impl TickSubscription for ManualSubscription {
    fn cancel(&self) {
        *self.cancelled.lock() = true;
    }
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_ticks(&self, key: Option<StepKey>) -> Vec<TickFn> {
        let mut subs = self.subs.lock();
        for entries in subs.values_mut() {
            entries.retain(|e| !*e.cancelled.lock());
        }
        subs.retain(|_, entries| !entries.is_empty());
        subs.iter()
            .filter(|(k, _)| key.map_or(true, |want| **k == want))
            .flat_map(|(_, entries)| entries.iter().map(|e| Arc::clone(&e.tick)))
            .collect()
    }

    /// Deliver one tick to every live subscription for `key`.
    pub fn fire(&self, key: StepKey) {
        for tick in self.live_ticks(Some(key)) {
            tick();
        }
    }

    /// Deliver one tick to every live subscription, in key order.
    pub fn fire_all(&self) {
        for tick in self.live_ticks(None) {
            tick();
        }
    }

    /// Number of subscriptions that have not been cancelled.
    pub fn live_count(&self) -> usize {
        self.subs
            .lock()
            .values()
            .flat_map(|entries| entries.iter())
            .filter(|e| !*e.cancelled.lock())
            .count()
    }

    /// Whether a live subscription exists for `key`.
    pub fn is_subscribed(&self, key: StepKey) -> bool {
        self.subs
            .lock()
            .get(&key)
            .is_some_and(|entries| entries.iter().any(|e| !*e.cancelled.lock()))
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule(&self, key: StepKey, tick: TickFn) -> Box<dyn TickSubscription> {
        let cancelled = Arc::new(Mutex::new(false));
        let mut subs = self.subs.lock();
        subs.entry(key).or_default().push(ManualEntry {
            tick,
            cancelled: Arc::clone(&cancelled),
        });
        Box::new(ManualSubscription { cancelled })
    }
}

impl std::fmt::Debug for ManualTickScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTickScheduler")
            .field("live", &self.live_count())
            .finish()
    }
}
