use std::path::PathBuf;

use bakery_core::storage::legacy;
use bakery_core::{Config, Database, StateSink};
use clap::Args;
use tracing::info;

use super::CmdResult;

#[derive(Args)]
pub struct ImportArgs {
    /// Directory holding data.json, recipes.json and history.json
    pub dir: PathBuf,
    /// Replace existing data instead of refusing to import over it
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: ImportArgs) -> CmdResult {
    let config = Config::load()?;
    let state = legacy::import_dir(&args.dir, config.day_boundary())?;

    let db = Database::open()?;
    let existing = db.load_state()?;
    let has_data = !existing.ingredients.is_empty()
        || !existing.recipes.is_empty()
        || !existing.history.is_empty();
    if has_data && !args.force {
        return Err("database already has data; pass --force to replace it".into());
    }
    if has_data {
        db.clear()?;
    }
    db.persist(&state)?;

    info!(dir = %args.dir.display(), "legacy import finished");
    println!(
        "Imported {} ingredients, {} recipes, {} history entries",
        state.ingredients.len(),
        state.recipes.len(),
        state.history.len()
    );
    Ok(())
}
