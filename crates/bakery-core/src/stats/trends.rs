//! Per-product bake counts over a trailing window of days.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::DayBoundary;
use crate::error::{CoreError, Result};
use crate::inventory::HistoryLog;

pub const DEFAULT_TREND_WINDOW_DAYS: u32 = 7;

/// Largest window accepted, about ten years of daily buckets.
pub const MAX_TREND_WINDOW_DAYS: u32 = 3660;

/// Bakes on a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// First date inside a window of `window_days` ending on `today`.
fn window_start(today: NaiveDate, window_days: u32) -> Result<NaiveDate> {
    if window_days == 0 {
        return Err(CoreError::invalid("window_days", "must be at least 1"));
    }
    if window_days > MAX_TREND_WINDOW_DAYS {
        return Err(CoreError::invalid(
            "window_days",
            format!("{window_days} exceeds the maximum of {MAX_TREND_WINDOW_DAYS}"),
        ));
    }
    today
        .checked_sub_signed(Duration::days(i64::from(window_days) - 1))
        .ok_or_else(|| {
            CoreError::invalid("window_days", format!("{window_days} reaches before the calendar"))
        })
}

/// Bakes per recipe dated inside the window.
///
/// The window covers `window_days` calendar dates ending on the date of
/// `now`; bakes dated after that are not counted. Recipes with no bake in
/// the window are absent. Keys appear in the order their first in-window
/// bake was logged.
pub fn product_trends(
    history: &HistoryLog,
    now: DateTime<Utc>,
    window_days: u32,
    boundary: DayBoundary,
) -> Result<IndexMap<String, usize>> {
    let today = boundary.date_of(now);
    let start = window_start(today, window_days)?;
    let mut counts = IndexMap::new();
    for entry in history.iter() {
        let date = boundary.date_of(entry.timestamp);
        if date >= start && date <= today {
            *counts.entry(entry.item.clone()).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// One bucket per date of the window, oldest first, empty days included.
pub fn daily_counts(
    history: &HistoryLog,
    now: DateTime<Utc>,
    window_days: u32,
    boundary: DayBoundary,
) -> Result<Vec<DailyCount>> {
    let today = boundary.date_of(now);
    let start = window_start(today, window_days)?;
    let mut buckets: Vec<DailyCount> = start
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| DailyCount { date, count: 0 })
        .collect();

    for entry in history.iter() {
        let date = boundary.date_of(entry.timestamp);
        if date < start || date > today {
            continue;
        }
        let idx = (date - start).num_days() as usize;
        if let Some(bucket) = buckets.get_mut(idx) {
            bucket.count += 1;
        }
    }
    Ok(buckets)
}
