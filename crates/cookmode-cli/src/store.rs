//! Session and timer state carried between CLI invocations.
//!
//! Each command loads the saved kitchen, ticks every timer once so anything
//! that expired while no process was running completes now, runs, and saves.

use std::path::PathBuf;
use std::sync::Arc;

use cookmode_core::config::data_dir;
use cookmode_core::{
    Clock, Config, CookingSession, LiveStatus, ManualTickScheduler, Recipe, SessionOverview,
    SessionSnapshot, SystemClock, TimerEngine, TimerSnapshot,
};
use serde::{Deserialize, Serialize};

use crate::alerts::TerminalAlertSink;

const STATE_FILE: &str = "session.json";

#[derive(Debug, Serialize, Deserialize)]
struct SavedKitchen {
    recipe_name: String,
    session: SessionSnapshot,
    #[serde(default)]
    timers: TimerSnapshot,
}

pub struct Kitchen {
    pub recipe_name: String,
    pub session: CookingSession,
    pub timers: TimerEngine,
    pub config: Config,
}

fn state_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join(STATE_FILE))
}

impl Kitchen {
    fn engine_for(session: &CookingSession, config: &Config) -> TimerEngine {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        TimerEngine::new(
            Arc::clone(session.steps()),
            clock,
            Arc::new(ManualTickScheduler::new()),
            Arc::new(TerminalAlertSink::new(config.alerts.clone())),
        )
    }

    /// Fresh session for `recipe`, replacing whatever was saved.
    pub fn create(recipe: &Recipe) -> Self {
        let config = Config::load_or_default();
        let session = CookingSession::from_recipe(recipe, Arc::new(SystemClock));
        let timers = Self::engine_for(&session, &config);
        Self {
            recipe_name: recipe.name.clone(),
            session,
            timers,
            config,
        }
    }

    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = state_path()?;
        let content = std::fs::read_to_string(&path).map_err(|_| {
            format!(
                "no saved session at {}; run `cookmode session start <recipe>` first",
                path.display()
            )
        })?;
        let saved: SavedKitchen = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), timers = saved.timers.timers.len(), "loaded saved session");

        let config = Config::load_or_default();
        let session = CookingSession::restore(saved.session, Arc::new(SystemClock))?;
        let timers = Self::engine_for(&session, &config);
        timers.restore(&saved.timers);
        timers.tick_all();

        Ok(Self {
            recipe_name: saved.recipe_name,
            session,
            timers,
            config,
        })
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let saved = SavedKitchen {
            recipe_name: self.recipe_name.clone(),
            session: self.session.snapshot(),
            timers: self.timers.snapshot(),
        };
        let path = state_path()?;
        std::fs::write(&path, serde_json::to_string_pretty(&saved)?)?;
        tracing::debug!(path = %path.display(), "saved session");
        Ok(())
    }

    /// Start the current step's countdown if configured and not already running.
    pub fn auto_start_current(&self) {
        if !self.config.timers.auto_start {
            return;
        }
        let index = self.session.current_index();
        if self.session.current_step().is_some_and(|s| s.has_timer()) && !self.timers.has_timer(index) {
            self.timers.start_timer_for_step(index);
        }
    }

    pub fn overview(&self) -> SessionOverview {
        SessionOverview::build(&self.recipe_name, &self.session, &self.timers.list_active_timers())
    }

    pub fn live_status(&self) -> LiveStatus {
        LiveStatus::project(&self.recipe_name, &self.session, &self.timers.list_active_timers())
    }
}
