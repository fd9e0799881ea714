use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod alerts;
mod commands;
mod store;

#[derive(Parser)]
#[command(name = "cookmode", version, about = "Cookmode CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recipe files
    Recipe {
        #[command(subcommand)]
        action: commands::recipe::RecipeAction,
    },
    /// Cooking session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Step timers
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Print the live status projection as JSON
    LiveStatus,
    /// Guided cooking mode with live timers
    Cook {
        /// Path to a recipe TOML file
        file: PathBuf,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Recipe { action } => commands::recipe::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::LiveStatus => commands::live_status(),
        Commands::Cook { file } => commands::cook::run(&file),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
