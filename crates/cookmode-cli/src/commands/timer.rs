use clap::Subcommand;

use crate::store::Kitchen;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or restart) the countdown for a step (1-based)
    Start {
        step: usize,
        /// Override the step's own duration, in seconds
        #[arg(long)]
        secs: Option<u64>,
    },
    /// Cancel the countdown for a step (1-based)
    Cancel { step: usize },
    /// Cancel every countdown
    CancelAll,
    /// Print active countdowns as JSON
    List,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let kitchen = Kitchen::load()?;

    match action {
        TimerAction::Start { step, secs } => {
            let key = step.checked_sub(1).ok_or("steps are numbered from 1")?;
            match secs {
                Some(secs) => kitchen.timers.start_timer(key, secs),
                None => kitchen.timers.start_timer_for_step(key),
            }
            if !kitchen.timers.has_timer(key) {
                eprintln!("step {step} has no timer");
            }
        }
        TimerAction::Cancel { step } => {
            if let Some(key) = step.checked_sub(1) {
                kitchen.timers.cancel_timer(key);
            }
        }
        TimerAction::CancelAll => kitchen.timers.cancel_all_timers(),
        TimerAction::List => {}
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&kitchen.timers.list_active_timers())?
    );
    kitchen.save()?;
    Ok(())
}
