use chrono::Utc;
use clap::Subcommand;

use super::{open_bakery, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Dashboard summary: totals, low stock, today's bakes, last bake
    Summary,
    /// Bake counts per product over the trailing window
    Trends {
        /// Window in days (defaults to dashboard.trend_window_days)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Bake counts per calendar day over the trailing window
    Daily {
        /// Window in days (defaults to dashboard.trend_window_days)
        #[arg(long)]
        days: Option<u32>,
    },
}

pub fn run(action: StatsAction) -> CmdResult {
    let (bakery, config) = open_bakery()?;
    let now = Utc::now();
    match action {
        StatsAction::Summary => {
            print_json(&bakery.summary(now)?)?;
        }
        StatsAction::Trends { days } => {
            let days = days.unwrap_or(config.dashboard.trend_window_days);
            print_json(&bakery.product_trends(now, days)?)?;
        }
        StatsAction::Daily { days } => {
            let days = days.unwrap_or(config.dashboard.trend_window_days);
            print_json(&bakery.daily_counts(now, days)?)?;
        }
    }
    Ok(())
}
