//! Interactive guided cooking.
//!
//! Timers tick on a Tokio interval per step while the prompt waits for input.

use std::path::Path;
use std::sync::Arc;

use cookmode_core::{
    format_remaining, Clock, Config, CookingSession, Recipe, SystemClock, TimerEngine,
    TokioTickScheduler,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::alerts::TerminalAlertSink;

const HELP: &str = "commands: n(ext)  p(rev)  j <step>  s(tart timer)  c(ancel timer)  t(imers)  q(uit)";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Next,
    Prev,
    Jump(usize),
    StartTimer,
    CancelTimer,
    Timers,
    Quit,
    Help,
}

fn parse(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let input = match words.next()? {
        "n" | "next" => Input::Next,
        "p" | "prev" => Input::Prev,
        "j" | "jump" => Input::Jump(words.next()?.parse().ok()?),
        "s" | "start" => Input::StartTimer,
        "c" | "cancel" => Input::CancelTimer,
        "t" | "timers" => Input::Timers,
        "q" | "quit" => Input::Quit,
        "h" | "help" | "?" => Input::Help,
        _ => return None,
    };
    Some(input)
}

fn print_step(session: &CookingSession) {
    match session.current_step() {
        Some(step) => {
            let timer = if step.has_timer() {
                format!(" [{}]", format_remaining(step.duration_secs))
            } else {
                String::new()
            };
            println!(
                "Step {}/{}{timer}: {}",
                session.current_index() + 1,
                session.step_count(),
                step.instruction
            );
        }
        None => println!("This recipe has no steps."),
    }
}

fn print_timers(timers: &TimerEngine) {
    let active = timers.list_active_timers();
    if active.is_empty() {
        println!("no timers running");
    }
    for timer in active {
        println!("  step {}: {} left", timer.step_key + 1, format_remaining(timer.remaining_secs));
    }
}

fn auto_start(config: &Config, session: &CookingSession, timers: &TimerEngine) {
    let index = session.current_index();
    if config.timers.auto_start && !timers.has_timer(index) {
        timers.start_timer_for_step(index);
    }
}

pub fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let recipe = Recipe::load(file)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(cook(recipe))
}

async fn cook(recipe: Recipe) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut session = CookingSession::from_recipe(&recipe, Arc::clone(&clock));
    let timers = TimerEngine::new(
        Arc::clone(session.steps()),
        clock,
        Arc::new(TokioTickScheduler::new(config.tick_interval())),
        Arc::new(TerminalAlertSink::new(config.alerts.clone())),
    );

    println!("Cooking {} ({} steps)", recipe.name, session.step_count());
    println!("{HELP}");
    session.start();
    print_step(&session);
    auto_start(&config, &session, &timers);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = parse(&line) else {
            if !line.trim().is_empty() {
                println!("{HELP}");
            }
            continue;
        };
        match input {
            Input::Next => {
                if session.move_to_next_step() {
                    print_step(&session);
                    auto_start(&config, &session, &timers);
                } else {
                    println!("All {} steps done.", session.step_count());
                    if timers.active_count() == 0 {
                        break;
                    }
                    print_timers(&timers);
                }
            }
            Input::Prev => {
                session.move_to_previous_step();
                print_step(&session);
            }
            Input::Jump(step) => {
                session.jump_to_step(step.checked_sub(1).unwrap_or(usize::MAX));
                print_step(&session);
                auto_start(&config, &session, &timers);
            }
            Input::StartTimer => timers.start_timer_for_step(session.current_index()),
            Input::CancelTimer => timers.cancel_timer(session.current_index()),
            Input::Timers => print_timers(&timers),
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
        }
    }

    session.end();
    timers.cancel_all_timers();
    println!(
        "Finished {:.0}% of {}.",
        session.progress() * 100.0,
        recipe.name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_commands() {
        assert_eq!(parse("n"), Some(Input::Next));
        assert_eq!(parse("  prev "), Some(Input::Prev));
        assert_eq!(parse("j 3"), Some(Input::Jump(3)));
        assert_eq!(parse("j"), None);
        assert_eq!(parse("j x"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("bake"), None);
        assert_eq!(parse("q"), Some(Input::Quit));
    }
}
