//! Dashboard statistics derived from the inventory and bake history.
//!
//! Nothing here is cached: every call recomputes from the state it is
//! handed, so results always reflect the latest mutation.

mod dashboard;
mod day_boundary;
mod trends;

pub use dashboard::{low_stock_items, summary, DashboardSummary};
pub use day_boundary::DayBoundary;
pub use trends::{
    daily_counts, product_trends, DailyCount, DEFAULT_TREND_WINDOW_DAYS, MAX_TREND_WINDOW_DAYS,
};
