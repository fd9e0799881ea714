//! # Cookmode Core Library
//!
//! This library provides the engine behind a recipe app's guided cooking
//! mode. The CLI binary and any GUI host are thin layers over the same core.
//!
//! ## Architecture
//!
//! - **Cooking Session**: a state machine over a recipe's ordered steps:
//!   position, completed steps, lifecycle and progress
//! - **Timer Engine**: any number of concurrent per-step countdowns that
//!   recompute remaining time from absolute start time on every tick and
//!   alert exactly once on completion
//! - **Live Status**: pure projections for status surfaces
//!
//! Sessions and timer engines are constructed explicitly and passed around;
//! there is no global state. Time and tick delivery are injected through
//! [`Clock`] and [`TickScheduler`].
//!
//! ## Key Components
//!
//! - [`CookingSession`]: step sequencing state machine
//! - [`TimerEngine`]: multi-timer coordinator
//! - [`LiveStatus`]: lock-screen style projection
//! - [`Config`]: application configuration management

pub mod config;
pub mod error;
pub mod events;
pub mod live_status;
pub mod observer;
pub mod recipe;
pub mod session;
pub mod timer;

pub use config::{AlertsConfig, Config, TimersConfig};
pub use error::{AlertError, ConfigError, CoreError, ValidationError};
pub use events::{SessionEvent, TimerEvent};
pub use live_status::{format_remaining, LiveStatus, SessionOverview, StepView};
pub use observer::{ListenerId, Observers};
pub use recipe::{Recipe, Step};
pub use session::{CookingSession, SessionSnapshot, SessionState};
pub use timer::{
    AlertSink, Clock, LogAlertSink, ManualClock, ManualTickScheduler, RecordingAlertSink,
    StepKey, StepTimer, SystemClock, TickScheduler, TimerAlert, TimerEngine, TimerSnapshot,
    TokioTickScheduler,
};
