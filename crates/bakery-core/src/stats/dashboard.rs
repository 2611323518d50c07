//! Low-stock alerts and the dashboard summary cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DayBoundary;
use crate::inventory::{HistoryEntry, HistoryLog, Ingredient, IngredientStore, InventoryState};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_ingredients: usize,
    pub low_stock_count: usize,
    /// Bakes on the same calendar date as the reference instant
    pub baked_today: usize,
    pub last_baked_item: Option<HistoryEntry>,
}

/// Ingredients at or below their threshold, in store order.
pub fn low_stock_items(ingredients: &IngredientStore) -> Vec<&Ingredient> {
    ingredients.iter().filter(|item| item.is_low_stock()).collect()
}

fn baked_on_day(history: &HistoryLog, now: DateTime<Utc>, boundary: DayBoundary) -> usize {
    let today = boundary.date_of(now);
    history
        .iter()
        .filter(|entry| boundary.date_of(entry.timestamp) == today)
        .count()
}

pub fn summary(
    state: &InventoryState,
    now: DateTime<Utc>,
    boundary: DayBoundary,
) -> DashboardSummary {
    DashboardSummary {
        total_ingredients: state.ingredients.len(),
        low_stock_count: low_stock_items(&state.ingredients).len(),
        baked_today: baked_on_day(&state.history, now, boundary),
        last_baked_item: state.history.latest().cloned(),
    }
}
