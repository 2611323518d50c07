//! Import from the older JSON file layout.
//!
//! That layout keeps three files side by side:
//! - `data.json`: array of `{name, quantity, unit, low_stock_threshold}`
//! - `recipes.json`: object `recipe -> ingredient -> {amount, unit}`
//! - `history.json`: array of `{item, timestamp, ...}` with naive local
//!   timestamps such as `2024-05-01T08:00:00` or `2024-05-01 08:00:00`
//!
//! Missing files are treated as empty collections.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{CoreError, Result};
use crate::inventory::{
    HistoryEntry, HistoryLog, Ingredient, IngredientStore, InventoryState, Recipe,
    RecipeIngredient, RecipeStore,
};
use crate::stats::DayBoundary;

pub const INGREDIENTS_FILE: &str = "data.json";
pub const RECIPES_FILE: &str = "recipes.json";
pub const HISTORY_FILE: &str = "history.json";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Quantities were sometimes stored as strings by the old form handlers.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    fn to_f64(&self, field: &str) -> Result<f64> {
        match self {
            LooseNumber::Number(n) => Ok(*n),
            LooseNumber::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| CoreError::invalid(field, format!("'{s}' is not a number"))),
        }
    }
}

#[derive(Deserialize)]
struct LegacyIngredient {
    name: String,
    quantity: LooseNumber,
    unit: String,
    low_stock_threshold: LooseNumber,
}

#[derive(Deserialize)]
struct LegacyRecipePart {
    amount: LooseNumber,
    unit: String,
}

#[derive(Deserialize)]
struct LegacyHistoryEntry {
    item: String,
    timestamp: String,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Interpret a stored timestamp. Offset-carrying RFC 3339 strings are taken
/// as-is; naive ones are read as wall-clock time in `boundary`'s offset.
pub fn parse_timestamp(raw: &str, boundary: DayBoundary) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            if let Some(local) = boundary.offset().from_local_datetime(&naive).single() {
                return Ok(local.with_timezone(&Utc));
            }
        }
    }
    Err(CoreError::invalid(
        "timestamp",
        format!("'{raw}' is not a recognised timestamp"),
    ))
}

fn import_ingredients(rows: Vec<LegacyIngredient>) -> Result<IngredientStore> {
    let mut store = IngredientStore::new();
    for row in rows {
        let ingredient = Ingredient {
            name: row.name,
            quantity: row.quantity.to_f64("quantity")?,
            unit: row.unit,
            low_stock_threshold: row.low_stock_threshold.to_f64("low_stock_threshold")?,
        };
        store.insert(ingredient)?;
    }
    Ok(store)
}

fn import_recipes(
    rows: IndexMap<String, IndexMap<String, LegacyRecipePart>>,
) -> Result<RecipeStore> {
    let mut store = RecipeStore::new();
    for (name, parts) in rows {
        let mut ingredients = IndexMap::new();
        for (ingredient, part) in parts {
            ingredients.insert(
                ingredient,
                RecipeIngredient {
                    amount: part.amount.to_f64("amount")?,
                    unit: part.unit,
                },
            );
        }
        store.insert(Recipe { name, ingredients })?;
    }
    Ok(store)
}

fn import_history(rows: Vec<LegacyHistoryEntry>, boundary: DayBoundary) -> Result<HistoryLog> {
    rows.into_iter()
        .map(|row| {
            Ok(HistoryEntry {
                timestamp: parse_timestamp(&row.timestamp, boundary)?,
                item: row.item,
            })
        })
        .collect()
}

/// Read the three legacy files from `dir` into a fresh state.
///
/// Entries go through the same validation as live edits, so a duplicate
/// ingredient or an invalid recipe aborts the import.
///
/// # Errors
/// Returns an error if a file is unreadable, malformed or fails validation.
pub fn import_dir(dir: &Path, boundary: DayBoundary) -> Result<InventoryState> {
    let ingredients = read_json::<Vec<LegacyIngredient>>(&dir.join(INGREDIENTS_FILE))?
        .map(import_ingredients)
        .transpose()?
        .unwrap_or_default();
    let recipes = read_json::<IndexMap<String, IndexMap<String, LegacyRecipePart>>>(
        &dir.join(RECIPES_FILE),
    )?
    .map(import_recipes)
    .transpose()?
    .unwrap_or_default();
    let history = read_json::<Vec<LegacyHistoryEntry>>(&dir.join(HISTORY_FILE))?
        .map(|rows| import_history(rows, boundary))
        .transpose()?
        .unwrap_or_default();

    tracing::info!(
        dir = %dir.display(),
        ingredients = ingredients.len(),
        recipes = recipes.len(),
        history = history.len(),
        "imported legacy files"
    );
    Ok(InventoryState {
        ingredients,
        recipes,
        history,
    })
}
