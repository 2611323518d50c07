//! The state-owning repository: every inventory operation goes through here.
//!
//! A [`Bakery`] holds the whole [`InventoryState`] behind one `RwLock`.
//! Mutations run under the write lock from validation to the flush into
//! the attached [`StateSink`]; if the flush fails the state is restored to
//! its pre-operation snapshot. Reads share the read lock and therefore
//! never see a bake halfway through its deductions.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::consumption::{self, BakePlan};
use crate::error::{CoreError, Result};
use crate::inventory::{
    HistoryEntry, Ingredient, IngredientPatch, InventoryState, NameMatch, Recipe,
    RecipeIngredient,
};
use crate::stats::{self, DailyCount, DashboardSummary, DayBoundary};
use crate::storage::{Config, StateSink};

/// Policies a [`Bakery`] applies to every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BakeryOptions {
    pub name_match: NameMatch,
    pub day_boundary: DayBoundary,
}

impl From<&Config> for BakeryOptions {
    fn from(config: &Config) -> Self {
        Self {
            name_match: config.name_match(),
            day_boundary: config.day_boundary(),
        }
    }
}

/// Single owner of ingredients, recipes and history for a process.
pub struct Bakery {
    state: RwLock<InventoryState>,
    sink: Option<Arc<dyn StateSink>>,
    options: BakeryOptions,
}

impl Bakery {
    /// A bakery that keeps state in memory only.
    pub fn new(state: InventoryState, options: BakeryOptions) -> Self {
        Self {
            state: RwLock::new(state),
            sink: None,
            options,
        }
    }

    /// A bakery that flushes to `sink` after every successful mutation.
    pub fn with_sink(
        state: InventoryState,
        options: BakeryOptions,
        sink: Arc<dyn StateSink>,
    ) -> Self {
        Self {
            state: RwLock::new(state),
            sink: Some(sink),
            options,
        }
    }

    pub fn options(&self) -> BakeryOptions {
        self.options
    }

    /// Copy of the full current state.
    ///
    /// # Errors
    /// Returns `LockPoisoned` if a writer panicked.
    pub fn snapshot(&self) -> Result<InventoryState> {
        Ok(self.state.read()?.clone())
    }

    /// Run `op` on the state under the write lock, then flush.
    ///
    /// `op` itself must leave the state unchanged when it fails; a failing
    /// flush restores the snapshot taken before `op` ran.
    fn mutate<T>(&self, op: impl FnOnce(&mut InventoryState) -> Result<T>) -> Result<T> {
        let mut state = self.state.write()?;
        let before = self.sink.as_ref().map(|_| state.clone());
        let value = op(&mut *state)?;

        if let (Some(sink), Some(before)) = (&self.sink, before) {
            if let Err(e) = sink.persist(&*state) {
                tracing::error!("failed to persist inventory, rolling back: {e}");
                *state = before;
                return Err(e);
            }
        }
        Ok(value)
    }

    fn read<T>(&self, op: impl FnOnce(&InventoryState) -> Result<T>) -> Result<T> {
        let state = self.state.read()?;
        op(&*state)
    }

    // === Ingredients ===

    /// # Errors
    /// `DuplicateIngredient` if the name exists in any case, `InvalidInput`
    /// for blank text or negative / non-finite numbers.
    pub fn add_ingredient(&self, ingredient: Ingredient) -> Result<Ingredient> {
        let added = self.mutate(|state| state.ingredients.insert(ingredient).cloned())?;
        tracing::info!(
            ingredient = %added.name,
            quantity = added.quantity,
            unit = %added.unit,
            "ingredient added"
        );
        Ok(added)
    }

    /// # Errors
    /// `IngredientNotFound`, `DuplicateIngredient` on a colliding rename, or
    /// `InvalidInput`.
    pub fn update_ingredient(
        &self,
        original_name: &str,
        patch: &IngredientPatch,
    ) -> Result<Ingredient> {
        let policy = self.options.name_match;
        let updated = self.mutate(|state| {
            state
                .ingredients
                .update(original_name, patch, policy)
                .cloned()
        })?;
        tracing::info!(ingredient = %updated.name, "ingredient updated");
        Ok(updated)
    }

    /// Recipes that reference the ingredient keep their reference.
    ///
    /// # Errors
    /// `IngredientNotFound` if nothing matches `name`.
    pub fn delete_ingredient(&self, name: &str) -> Result<()> {
        let policy = self.options.name_match;
        let removed = self.mutate(|state| state.ingredients.remove(name, policy))?;
        tracing::info!(ingredient = %removed.name, "ingredient deleted");
        Ok(())
    }

    /// # Errors
    /// `IngredientNotFound` if nothing matches `name`.
    pub fn get_ingredient(&self, name: &str) -> Result<Ingredient> {
        let policy = self.options.name_match;
        self.read(|state| {
            state
                .ingredients
                .find(name, policy)
                .cloned()
                .ok_or_else(|| CoreError::IngredientNotFound(name.to_string()))
        })
    }

    /// Take `amount` out of one ingredient without recording a bake.
    ///
    /// # Errors
    /// `IngredientNotFound`, `InvalidInput` for a negative amount, or
    /// `InsufficientStock` if `amount` exceeds the stock.
    pub fn subtract_ingredient(&self, name: &str, amount: f64) -> Result<Ingredient> {
        let policy = self.options.name_match;
        let updated = self.mutate(|state| consumption::subtract(state, name, amount, policy))?;
        tracing::info!(
            ingredient = %updated.name,
            amount,
            remaining = updated.quantity,
            "stock subtracted"
        );
        Ok(updated)
    }

    /// # Errors
    /// `LockPoisoned` only.
    pub fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        self.read(|state| Ok(state.ingredients.as_slice().to_vec()))
    }

    // === Recipes ===

    /// # Errors
    /// `InvalidRecipe` for empty or malformed recipes, `DuplicateRecipe`
    /// if the name is taken.
    pub fn save_recipe(
        &self,
        name: &str,
        ingredients: IndexMap<String, RecipeIngredient>,
    ) -> Result<Recipe> {
        let recipe = Recipe::new(name, ingredients);
        let saved = self.mutate(|state| state.recipes.insert(recipe).cloned())?;
        tracing::info!(recipe = %saved.name, ingredients = saved.ingredients.len(), "recipe saved");
        Ok(saved)
    }

    /// # Errors
    /// `LockPoisoned` only.
    pub fn list_recipes(&self) -> Result<IndexMap<String, Recipe>> {
        self.read(|state| Ok(state.recipes.as_map().clone()))
    }

    // === Baking ===

    /// Bake `recipe_name` now.
    ///
    /// # Errors
    /// `RecipeNotFound`, `IngredientNotFound`, `UnitMismatch` or
    /// `InsufficientStock`; nothing is deducted or logged on failure.
    pub fn bake(&self, recipe_name: &str) -> Result<HistoryEntry> {
        self.bake_at(recipe_name, Utc::now())
    }

    /// Bake with an explicit timestamp.
    ///
    /// # Errors
    /// Same as [`Bakery::bake`].
    pub fn bake_at(&self, recipe_name: &str, now: DateTime<Utc>) -> Result<HistoryEntry> {
        let policy = self.options.name_match;
        self.mutate(|state| consumption::bake(state, recipe_name, policy, now))
    }

    /// Dry-run a bake and report every problem.
    ///
    /// # Errors
    /// `RecipeNotFound` or `InvalidInput` for a blank name.
    pub fn plan_bake(&self, recipe_name: &str) -> Result<BakePlan> {
        let policy = self.options.name_match;
        self.read(|state| consumption::plan_bake(state, recipe_name, policy))
    }

    /// # Errors
    /// `LockPoisoned` only.
    pub fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        self.read(|state| Ok(state.history.as_slice().to_vec()))
    }

    // === Dashboard ===

    /// # Errors
    /// `LockPoisoned` only.
    pub fn low_stock_items(&self) -> Result<Vec<Ingredient>> {
        self.read(|state| {
            Ok(stats::low_stock_items(&state.ingredients)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    /// # Errors
    /// `LockPoisoned` only.
    pub fn summary(&self, now: DateTime<Utc>) -> Result<DashboardSummary> {
        let boundary = self.options.day_boundary;
        self.read(|state| Ok(stats::summary(state, now, boundary)))
    }

    /// # Errors
    /// `InvalidInput` if `window_days` is zero or above `MAX_TREND_WINDOW_DAYS`.
    pub fn product_trends(
        &self,
        now: DateTime<Utc>,
        window_days: u32,
    ) -> Result<IndexMap<String, usize>> {
        let boundary = self.options.day_boundary;
        self.read(|state| stats::product_trends(&state.history, now, window_days, boundary))
    }

    /// # Errors
    /// `InvalidInput` if `window_days` is zero or above `MAX_TREND_WINDOW_DAYS`.
    pub fn daily_counts(&self, now: DateTime<Utc>, window_days: u32) -> Result<Vec<DailyCount>> {
        let boundary = self.options.day_boundary;
        self.read(|state| stats::daily_counts(&state.history, now, window_days, boundary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlakySink {
        fail: AtomicBool,
    }

    impl StateSink for FlakySink {
        fn persist(&self, _state: &InventoryState) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                Err(CoreError::Io(std::io::Error::other("disk full")))
            } else {
                Ok(())
            }
        }
    }

    fn cake() -> IndexMap<String, RecipeIngredient> {
        let mut ingredients = IndexMap::new();
        ingredients.insert("flour".to_string(), RecipeIngredient::new(300.0, "g"));
        ingredients.insert("sugar".to_string(), RecipeIngredient::new(100.0, "g"));
        ingredients
    }

    fn stocked(bakery: &Bakery) {
        bakery
            .add_ingredient(Ingredient::new("flour", 500.0, "g", 100.0))
            .unwrap();
        bakery
            .add_ingredient(Ingredient::new("sugar", 200.0, "g", 50.0))
            .unwrap();
        bakery.save_recipe("cake", cake()).unwrap();
    }

    #[test]
    fn bake_through_repository() {
        let bakery = Bakery::new(InventoryState::new(), BakeryOptions::default());
        stocked(&bakery);
        let entry = bakery.bake("cake").unwrap();
        assert_eq!(entry.item, "cake");
        assert_eq!(bakery.get_ingredient("FLOUR").unwrap().quantity, 200.0);
        assert_eq!(bakery.list_history().unwrap(), vec![entry]);
    }

    #[test]
    fn failed_flush_rolls_back() {
        let sink = Arc::new(FlakySink {
            fail: AtomicBool::new(false),
        });
        let bakery =
            Bakery::with_sink(InventoryState::new(), BakeryOptions::default(), sink.clone());
        stocked(&bakery);
        let before = bakery.snapshot().unwrap();

        sink.fail.store(true, Ordering::SeqCst);
        assert!(matches!(bakery.bake("cake"), Err(CoreError::Io(_))));
        assert!(bakery.delete_ingredient("flour").is_err());
        assert_eq!(bakery.snapshot().unwrap(), before);

        sink.fail.store(false, Ordering::SeqCst);
        bakery.bake("cake").unwrap();
        assert_eq!(bakery.list_history().unwrap().len(), 1);
    }

    #[test]
    fn delete_leaves_recipe_dangling() {
        let bakery = Bakery::new(InventoryState::new(), BakeryOptions::default());
        stocked(&bakery);
        bakery.delete_ingredient("sugar").unwrap();
        assert!(bakery.list_recipes().unwrap().contains_key("cake"));
        assert!(matches!(
            bakery.bake("cake"),
            Err(CoreError::IngredientNotFound(name)) if name == "sugar"
        ));
        assert!(matches!(
            bakery.delete_ingredient("sugar"),
            Err(CoreError::IngredientNotFound(_))
        ));
    }

    #[test]
    fn exact_policy_applies_to_edits_but_not_duplicates() {
        let options = BakeryOptions {
            name_match: NameMatch::Exact,
            ..Default::default()
        };
        let bakery = Bakery::new(InventoryState::new(), options);
        bakery
            .add_ingredient(Ingredient::new("Flour", 1.0, "kg", 0.5))
            .unwrap();
        assert!(matches!(
            bakery.add_ingredient(Ingredient::new("flour", 1.0, "kg", 0.5)),
            Err(CoreError::DuplicateIngredient(_))
        ));
        assert!(bakery.get_ingredient("flour").is_err());
        assert!(bakery.get_ingredient("Flour").is_ok());
    }

    #[test]
    fn low_stock_reflects_latest_edit() {
        let bakery = Bakery::new(InventoryState::new(), BakeryOptions::default());
        stocked(&bakery);
        assert!(bakery.low_stock_items().unwrap().is_empty());

        let patch = IngredientPatch {
            quantity: Some(100.0),
            ..Default::default()
        };
        bakery.update_ingredient("flour", &patch).unwrap();
        assert_eq!(bakery.low_stock_items().unwrap().len(), 1);

        let patch = IngredientPatch {
            quantity: Some(101.0),
            ..Default::default()
        };
        bakery.update_ingredient("flour", &patch).unwrap();
        assert!(bakery.low_stock_items().unwrap().is_empty());
    }

    #[test]
    fn concurrent_bakes_never_overdraw() {
        let bakery = Arc::new(Bakery::new(InventoryState::new(), BakeryOptions::default()));
        bakery
            .add_ingredient(Ingredient::new("flour", 1000.0, "g", 0.0))
            .unwrap();
        let mut ingredients = IndexMap::new();
        ingredients.insert("flour".to_string(), RecipeIngredient::new(300.0, "g"));
        bakery.save_recipe("loaf", ingredients).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bakery = Arc::clone(&bakery);
                std::thread::spawn(move || bakery.bake("loaf").is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 3);
        assert_eq!(bakery.get_ingredient("flour").unwrap().quantity, 100.0);
        assert_eq!(bakery.list_history().unwrap().len(), 3);
    }
}
