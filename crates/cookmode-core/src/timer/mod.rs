mod alert;
mod clock;
mod engine;
mod scheduler;
mod state;

pub use alert::{AlertSink, LogAlertSink, RecordingAlertSink, TimerAlert};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{TimerEngine, TimerRecord, TimerSnapshot};
pub use scheduler::{
    ManualTickScheduler, TickFn, TickScheduler, TickSubscription, TokioTickScheduler,
};
pub use state::{StepKey, StepTimer};
