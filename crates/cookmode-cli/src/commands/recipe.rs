use std::path::PathBuf;

use clap::Subcommand;
use cookmode_core::Recipe;

#[derive(Subcommand)]
pub enum RecipeAction {
    /// Validate a recipe file and print its steps in cooking order
    Show {
        /// Path to a recipe TOML file
        file: PathBuf,
    },
}

pub fn run(action: RecipeAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RecipeAction::Show { file } => {
            let recipe = Recipe::load(&file)?;
            println!("{}", serde_json::to_string_pretty(&recipe)?);
        }
    }
    Ok(())
}
