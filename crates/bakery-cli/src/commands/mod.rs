pub mod bake;
pub mod config;
pub mod history;
pub mod import;
pub mod ingredient;
pub mod recipe;
pub mod stats;

use std::sync::Arc;

use bakery_core::{Bakery, BakeryOptions, Config, Database};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the on-disk database and wrap it in a bakery that flushes after
/// every change.
pub fn open_bakery() -> Result<(Bakery, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Arc::new(Database::open()?);
    let state = db.load_state()?;
    let bakery = Bakery::with_sink(state, BakeryOptions::from(&config), db);
    Ok((bakery, config))
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
