//! In-memory inventory state: ingredients, recipes and bake history.
//!
//! The three collections are plain owned data. [`crate::Bakery`] holds one
//! [`InventoryState`] behind a lock; the consumption and stats modules are
//! free functions over it.

mod history;
mod ingredient;
mod recipe;

pub use history::{HistoryEntry, HistoryLog};
pub use ingredient::{Ingredient, IngredientPatch, IngredientStore, NameMatch};
pub use recipe::{Recipe, RecipeIngredient, RecipeStore};

pub(crate) use ingredient::non_negative;

use serde::{Deserialize, Serialize};

/// Everything the core owns, as one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    #[serde(default)]
    pub ingredients: IngredientStore,
    #[serde(default)]
    pub recipes: RecipeStore,
    #[serde(default)]
    pub history: HistoryLog,
}

impl InventoryState {
    pub fn new() -> Self {
        Self::default()
    }
}
