//! Bake consumption: validate every ingredient, then deduct all of them.
//!
//! A bake is split into a read-only [`plan_bake`] pass and a commit pass.
//! The commit only runs when the plan found no problem, so a rejected bake
//! never deducts anything and never appends to the history log.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{CoreError, Result};
use crate::inventory::{non_negative, HistoryEntry, Ingredient, InventoryState, NameMatch};

/// Reason a recipe cannot be baked right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BakeProblem {
    /// The recipe names an ingredient that is not stocked.
    Missing { ingredient: String },
    /// Stock is kept in a different unit than the recipe asks for.
    UnitMismatch {
        ingredient: String,
        required_unit: String,
        stocked_unit: String,
    },
    /// Stock does not cover the required amount.
    Insufficient {
        ingredient: String,
        required: f64,
        available: f64,
    },
}

impl BakeProblem {
    fn rank(&self) -> u8 {
        match self {
            BakeProblem::Missing { .. } => 0,
            BakeProblem::UnitMismatch { .. } => 1,
            BakeProblem::Insufficient { .. } => 2,
        }
    }

    /// The error a real bake would fail with for this problem.
    pub fn into_error(self) -> CoreError {
        match self {
            BakeProblem::Missing { ingredient } => CoreError::IngredientNotFound(ingredient),
            BakeProblem::UnitMismatch {
                ingredient,
                required_unit,
                stocked_unit,
            } => CoreError::UnitMismatch {
                ingredient,
                required_unit,
                stocked_unit,
            },
            BakeProblem::Insufficient {
                ingredient,
                required,
                available,
            } => CoreError::InsufficientStock {
                ingredient,
                required,
                available,
            },
        }
    }
}

/// One deduction the commit pass will perform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deduction {
    /// Ingredient name as the recipe spells it
    pub ingredient: String,
    /// Ingredient name as stocked
    pub stocked_as: String,
    pub amount: f64,
    /// Quantity left once this bake is committed
    pub remaining: f64,
    #[serde(skip)]
    index: usize,
}

/// Outcome of validating a recipe against current stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BakePlan {
    pub recipe: String,
    pub deductions: Vec<Deduction>,
    pub problems: Vec<BakeProblem>,
}

impl BakePlan {
    pub fn is_feasible(&self) -> bool {
        self.problems.is_empty()
    }

    /// The problem a bake reports: missing before unit mismatch before
    /// shortage, recipe order within each kind.
    pub fn first_problem(&self) -> Option<&BakeProblem> {
        self.problems.iter().min_by_key(|p| p.rank())
    }
}

/// Check every ingredient of `recipe_name` against stock without mutating.
pub fn plan_bake(
    state: &InventoryState,
    recipe_name: &str,
    policy: NameMatch,
) -> Result<BakePlan> {
    if recipe_name.trim().is_empty() {
        return Err(CoreError::invalid("recipe", "must not be blank"));
    }
    let recipe = state
        .recipes
        .get(recipe_name)
        .ok_or_else(|| CoreError::RecipeNotFound(recipe_name.to_string()))?;

    let mut plan = BakePlan {
        recipe: recipe.name.clone(),
        deductions: Vec::with_capacity(recipe.ingredients.len()),
        problems: Vec::new(),
    };
    // Two recipe entries may resolve to the same stocked ingredient under
    // a case-insensitive policy, so track what is left per stock slot.
    let mut remaining: HashMap<usize, f64> = HashMap::new();
    let mut claimed: HashMap<usize, f64> = HashMap::new();

    for (name, need) in &recipe.ingredients {
        let Some(index) = state.ingredients.position(name, policy) else {
            plan.problems.push(BakeProblem::Missing {
                ingredient: name.clone(),
            });
            continue;
        };
        let Some(stock) = state.ingredients.get(index) else {
            continue;
        };

        if stock.unit.to_lowercase() != need.unit.to_lowercase() {
            plan.problems.push(BakeProblem::UnitMismatch {
                ingredient: name.clone(),
                required_unit: need.unit.clone(),
                stocked_unit: stock.unit.clone(),
            });
            continue;
        }

        let left = *remaining.get(&index).unwrap_or(&stock.quantity);
        let total = claimed.get(&index).copied().unwrap_or(0.0) + need.amount;
        if left < need.amount {
            plan.problems.push(BakeProblem::Insufficient {
                ingredient: name.clone(),
                required: total,
                available: stock.quantity,
            });
            continue;
        }

        let after = left - need.amount;
        remaining.insert(index, after);
        claimed.insert(index, total);
        plan.deductions.push(Deduction {
            ingredient: name.clone(),
            stocked_as: stock.name.clone(),
            amount: need.amount,
            remaining: after,
            index,
        });
    }

    Ok(plan)
}

/// Bake `recipe_name` at `now`: deduct every ingredient and log the bake.
///
/// Either every ingredient is deducted and one entry is appended, or the
/// call fails and `state` is untouched.
pub fn bake(
    state: &mut InventoryState,
    recipe_name: &str,
    policy: NameMatch,
    now: DateTime<Utc>,
) -> Result<HistoryEntry> {
    let plan = plan_bake(state, recipe_name, policy)?;

    if let Some(problem) = plan.first_problem().cloned() {
        let err = problem.into_error();
        warn!(recipe = %recipe_name, problems = plan.problems.len(), "bake rejected: {err}");
        return Err(err);
    }

    for deduction in &plan.deductions {
        if let Some(stock) = state.ingredients.get_mut(deduction.index) {
            stock.quantity -= deduction.amount;
        }
    }

    let entry = state
        .history
        .append(HistoryEntry::new(plan.recipe.clone(), now))
        .clone();
    info!(recipe = %entry.item, deductions = plan.deductions.len(), "baked");
    Ok(entry)
}

/// Take `amount` out of a single ingredient by hand.
pub fn subtract(
    state: &mut InventoryState,
    name: &str,
    amount: f64,
    policy: NameMatch,
) -> Result<Ingredient> {
    non_negative("amount", amount)?;
    let index = state
        .ingredients
        .position(name, policy)
        .ok_or_else(|| CoreError::IngredientNotFound(name.to_string()))?;
    let stock = state
        .ingredients
        .get_mut(index)
        .ok_or_else(|| CoreError::IngredientNotFound(name.to_string()))?;

    if amount > stock.quantity {
        return Err(CoreError::InsufficientStock {
            ingredient: stock.name.clone(),
            required: amount,
            available: stock.quantity,
        });
    }
    stock.quantity -= amount;
    Ok(stock.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{Recipe, RecipeIngredient};
    use chrono::TimeZone;
    use indexmap::IndexMap;

    fn recipe(name: &str, parts: &[(&str, f64, &str)]) -> Recipe {
        let ingredients: IndexMap<_, _> = parts
            .iter()
            .map(|(n, a, u)| (n.to_string(), RecipeIngredient::new(*a, *u)))
            .collect();
        Recipe::new(name, ingredients)
    }

    fn state() -> InventoryState {
        let mut state = InventoryState::new();
        state
            .ingredients
            .insert(Ingredient::new("flour", 500.0, "g", 100.0))
            .unwrap();
        state
            .ingredients
            .insert(Ingredient::new("sugar", 200.0, "g", 50.0))
            .unwrap();
        state
            .recipes
            .insert(recipe("cake", &[("flour", 300.0, "g"), ("sugar", 100.0, "g")]))
            .unwrap();
        state
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn bake_deducts_and_logs() {
        let mut state = state();
        let entry = bake(&mut state, "cake", NameMatch::IgnoreCase, now()).unwrap();
        assert_eq!(entry, HistoryEntry::new("cake", now()));
        assert_eq!(state.ingredients.find("flour", NameMatch::Exact).unwrap().quantity, 200.0);
        assert_eq!(state.ingredients.find("sugar", NameMatch::Exact).unwrap().quantity, 100.0);
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn shortage_leaves_state_untouched() {
        let mut state = state();
        state
            .recipes
            .insert(recipe("cake2", &[("sugar", 10.0, "g"), ("flour", 600.0, "g")]))
            .unwrap();
        let before = state.clone();

        let err = bake(&mut state, "cake2", NameMatch::IgnoreCase, now()).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                ingredient,
                required,
                available,
            } => {
                assert_eq!(ingredient, "flour");
                assert_eq!(required, 600.0);
                assert_eq!(available, 500.0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(state, before);
    }

    #[test]
    fn unknown_recipe_is_reported() {
        let mut state = state();
        let before = state.clone();
        assert!(matches!(
            bake(&mut state, "nonexistent", NameMatch::IgnoreCase, now()),
            Err(CoreError::RecipeNotFound(name)) if name == "nonexistent"
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn recipe_lookup_is_case_sensitive() {
        let mut state = state();
        assert!(matches!(
            bake(&mut state, "Cake", NameMatch::IgnoreCase, now()),
            Err(CoreError::RecipeNotFound(_))
        ));
    }

    #[test]
    fn blank_recipe_name_is_invalid_input() {
        let mut state = state();
        assert!(matches!(
            bake(&mut state, "  ", NameMatch::IgnoreCase, now()),
            Err(CoreError::InvalidInput { .. })
        ));
    }

    #[test]
    fn missing_ingredient_wins_over_shortage() {
        let mut state = state();
        state
            .recipes
            .insert(recipe("pie", &[("flour", 900.0, "g"), ("apples", 3.0, "pcs")]))
            .unwrap();
        let before = state.clone();
        assert!(matches!(
            bake(&mut state, "pie", NameMatch::IgnoreCase, now()),
            Err(CoreError::IngredientNotFound(name)) if name == "apples"
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn exact_policy_does_not_fold_case() {
        let mut state = state();
        state
            .recipes
            .insert(recipe("cookie", &[("Flour", 50.0, "g")]))
            .unwrap();
        assert!(matches!(
            bake(&mut state, "cookie", NameMatch::Exact, now()),
            Err(CoreError::IngredientNotFound(_))
        ));
        bake(&mut state, "cookie", NameMatch::IgnoreCase, now()).unwrap();
        assert_eq!(state.ingredients.find("flour", NameMatch::Exact).unwrap().quantity, 450.0);
    }

    #[test]
    fn unit_mismatch_is_rejected() {
        let mut state = state();
        state
            .recipes
            .insert(recipe("bread", &[("flour", 1.0, "kg")]))
            .unwrap();
        assert!(matches!(
            bake(&mut state, "bread", NameMatch::IgnoreCase, now()),
            Err(CoreError::UnitMismatch { .. })
        ));
        // Unit comparison ignores case.
        state
            .recipes
            .insert(recipe("roll", &[("flour", 10.0, "G")]))
            .unwrap();
        bake(&mut state, "roll", NameMatch::IgnoreCase, now()).unwrap();
    }

    #[test]
    fn entries_aliasing_one_ingredient_are_summed() {
        let mut state = state();
        state
            .recipes
            .insert(recipe("double", &[("flour", 300.0, "g"), ("FLOUR", 300.0, "g")]))
            .unwrap();
        let plan = plan_bake(&state, "double", NameMatch::IgnoreCase).unwrap();
        assert_eq!(
            plan.problems,
            vec![BakeProblem::Insufficient {
                ingredient: "FLOUR".to_string(),
                required: 600.0,
                available: 500.0,
            }]
        );
        assert!(bake(&mut state, "double", NameMatch::IgnoreCase, now()).is_err());
        assert_eq!(state.ingredients.find("flour", NameMatch::Exact).unwrap().quantity, 500.0);
    }

    #[test]
    fn plan_lists_every_problem() {
        let mut state = state();
        state
            .recipes
            .insert(recipe(
                "feast",
                &[("flour", 900.0, "g"), ("sugar", 900.0, "g"), ("eggs", 2.0, "pcs")],
            ))
            .unwrap();
        let plan = plan_bake(&state, "feast", NameMatch::IgnoreCase).unwrap();
        assert!(!plan.is_feasible());
        assert_eq!(plan.problems.len(), 3);
        assert!(matches!(plan.first_problem(), Some(BakeProblem::Missing { .. })));
    }

    #[test]
    fn exact_stock_can_be_baked_to_zero() {
        let mut state = state();
        state
            .recipes
            .insert(recipe("all-sugar", &[("sugar", 200.0, "g")]))
            .unwrap();
        bake(&mut state, "all-sugar", NameMatch::IgnoreCase, now()).unwrap();
        assert_eq!(state.ingredients.find("sugar", NameMatch::Exact).unwrap().quantity, 0.0);
        assert!(bake(&mut state, "all-sugar", NameMatch::IgnoreCase, now()).is_err());
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn subtract_checks_amount() {
        let mut state = state();
        assert!(matches!(
            subtract(&mut state, "flour", -1.0, NameMatch::IgnoreCase),
            Err(CoreError::InvalidInput { .. })
        ));
        assert!(matches!(
            subtract(&mut state, "flour", 501.0, NameMatch::IgnoreCase),
            Err(CoreError::InsufficientStock { .. })
        ));
        let flour = subtract(&mut state, "FLOUR", 125.0, NameMatch::IgnoreCase).unwrap();
        assert_eq!(flour.quantity, 375.0);
        assert!(state.history.is_empty());
    }
}
