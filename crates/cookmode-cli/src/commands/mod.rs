pub mod config;
pub mod cook;
pub mod recipe;
pub mod session;
pub mod timer;

use crate::store::Kitchen;

/// Print the lock-screen style projection of the saved session.
pub fn live_status() -> Result<(), Box<dyn std::error::Error>> {
    let kitchen = Kitchen::load()?;
    println!("{}", serde_json::to_string_pretty(&kitchen.live_status())?);
    kitchen.save()?;
    Ok(())
}
