use std::path::PathBuf;

use clap::Subcommand;
use cookmode_core::Recipe;

use crate::store::Kitchen;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Begin cooking a recipe (replaces any saved session)
    Start {
        /// Path to a recipe TOML file
        file: PathBuf,
    },
    /// Print the current session as JSON
    Status,
    /// Mark the current step done and move on
    Next,
    /// Go back one step
    Prev,
    /// Jump to a step (1-based)
    Jump { step: usize },
    /// Mark the current step done without moving
    Complete,
    /// Pause the session
    Pause,
    /// Resume a paused session
    Resume,
    /// Start again from any state, resetting the start time
    Restart,
    /// Leave cooking mode and cancel all timers
    End,
    /// Clear completed steps and return to the first step
    Reset,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut kitchen = match action {
        SessionAction::Start { ref file } => {
            let recipe = Recipe::load(file)?;
            let mut kitchen = Kitchen::create(&recipe);
            kitchen.session.start();
            kitchen.auto_start_current();
            kitchen
        }
        _ => Kitchen::load()?,
    };

    match action {
        SessionAction::Start { .. } | SessionAction::Status => {}
        SessionAction::Next => {
            if !kitchen.session.move_to_next_step() {
                eprintln!("already on the last step");
            }
            kitchen.auto_start_current();
        }
        SessionAction::Prev => {
            if !kitchen.session.move_to_previous_step() {
                eprintln!("already on the first step");
            }
        }
        SessionAction::Jump { step } => {
            kitchen.session.jump_to_step(step.checked_sub(1).unwrap_or(usize::MAX));
            kitchen.auto_start_current();
        }
        SessionAction::Complete => kitchen.session.mark_current_step_complete(),
        SessionAction::Pause => {
            kitchen.session.pause();
        }
        SessionAction::Resume => {
            kitchen.session.resume();
        }
        SessionAction::Restart => kitchen.session.restart(),
        SessionAction::End => {
            kitchen.session.end();
            kitchen.timers.cancel_all_timers();
        }
        SessionAction::Reset => kitchen.session.reset_progress(),
    }

    println!("{}", serde_json::to_string_pretty(&kitchen.overview())?);
    kitchen.save()?;
    Ok(())
}
