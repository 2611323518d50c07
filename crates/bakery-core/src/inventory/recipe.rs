//! Recipes and the recipe store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Amount of one ingredient a recipe consumes per bake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub amount: f64,
    pub unit: String,
}

impl RecipeIngredient {
    pub fn new(amount: f64, unit: impl Into<String>) -> Self {
        Self {
            amount,
            unit: unit.into(),
        }
    }
}

/// A named recipe. Ingredient order is the order they were given in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub ingredients: IndexMap<String, RecipeIngredient>,
}

impl Recipe {
    pub fn new(name: impl Into<String>, ingredients: IndexMap<String, RecipeIngredient>) -> Self {
        Self {
            name: name.into(),
            ingredients,
        }
    }

    /// Reject empty recipes, blank names and non-positive amounts.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidRecipe("recipe name is blank".to_string()));
        }
        if self.ingredients.is_empty() {
            return Err(CoreError::InvalidRecipe(format!(
                "'{}' has no ingredients",
                self.name
            )));
        }
        for (ingredient, need) in &self.ingredients {
            if ingredient.trim().is_empty() {
                return Err(CoreError::InvalidRecipe(format!(
                    "'{}' lists an ingredient with a blank name",
                    self.name
                )));
            }
            if !need.amount.is_finite() || need.amount <= 0.0 {
                return Err(CoreError::InvalidRecipe(format!(
                    "'{}' needs a positive amount of '{}', got {}",
                    self.name, ingredient, need.amount
                )));
            }
            if need.unit.trim().is_empty() {
                return Err(CoreError::InvalidRecipe(format!(
                    "'{}' gives no unit for '{}'",
                    self.name, ingredient
                )));
            }
        }
        Ok(())
    }
}

/// Recipes keyed by their exact name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeStore {
    recipes: IndexMap<String, Recipe>,
}

impl RecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    pub fn as_map(&self) -> &IndexMap<String, Recipe> {
        &self.recipes
    }

    /// Validate and store a new recipe. Saved recipes are never replaced.
    pub fn insert(&mut self, recipe: Recipe) -> Result<&Recipe> {
        recipe.validate()?;
        if self.recipes.contains_key(&recipe.name) {
            return Err(CoreError::DuplicateRecipe(recipe.name));
        }
        let name = recipe.name.clone();
        self.recipes.insert(name.clone(), recipe);
        Ok(&self.recipes[&name])
    }

    pub(crate) fn insert_unchecked(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.name.clone(), recipe);
    }
}
