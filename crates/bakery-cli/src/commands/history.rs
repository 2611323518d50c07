use clap::Subcommand;

use super::{open_bakery, print_json, CmdResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List bake history, oldest first
    List {
        /// Only show the most recent N entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the most recent bake
    Last,
}

pub fn run(action: HistoryAction) -> CmdResult {
    let (bakery, _) = open_bakery()?;
    match action {
        HistoryAction::List { limit } => {
            let history = bakery.list_history()?;
            let skip = limit.map_or(0, |n| history.len().saturating_sub(n));
            print_json(&history[skip..])?;
        }
        HistoryAction::Last => {
            let summary = bakery.summary(chrono::Utc::now())?;
            match summary.last_baked_item {
                Some(entry) => print_json(&entry)?,
                None => println!("No bakes recorded"),
            }
        }
    }
    Ok(())
}
