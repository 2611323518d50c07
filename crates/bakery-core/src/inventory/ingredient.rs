//! Ingredient records and the ordered ingredient store.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// How ingredient names are compared when looking up stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    /// Names must be byte-for-byte equal.
    Exact,
    /// Names are compared after lowercasing both sides.
    #[default]
    IgnoreCase,
}

impl NameMatch {
    pub fn matches(self, stored: &str, requested: &str) -> bool {
        match self {
            NameMatch::Exact => stored == requested,
            NameMatch::IgnoreCase => {
                stored == requested || stored.to_lowercase() == requested.to_lowercase()
            }
        }
    }
}

/// A stocked ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub low_stock_threshold: f64,
}

impl Ingredient {
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        low_stock_threshold: f64,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
            low_stock_threshold,
        }
    }

    /// At or below threshold counts as low.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    /// Check every field, trimming the name and unit in place.
    pub(crate) fn normalize(mut self) -> Result<Self> {
        self.name = non_blank("name", &self.name)?;
        self.unit = non_blank("unit", &self.unit)?;
        non_negative("quantity", self.quantity)?;
        non_negative("low_stock_threshold", self.low_stock_threshold)?;
        Ok(self)
    }
}

/// Partial update for an existing ingredient. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub low_stock_threshold: Option<f64>,
}

impl IngredientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.low_stock_threshold.is_none()
    }

    /// Produce the patched ingredient without touching the original.
    pub(crate) fn apply_to(&self, current: &Ingredient) -> Result<Ingredient> {
        let patched = Ingredient {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            quantity: self.quantity.unwrap_or(current.quantity),
            unit: self.unit.clone().unwrap_or_else(|| current.unit.clone()),
            low_stock_threshold: self
                .low_stock_threshold
                .unwrap_or(current.low_stock_threshold),
        };
        patched.normalize()
    }
}

/// Ingredients in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientStore {
    items: Vec<Ingredient>,
}

impl IngredientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Ingredient] {
        &self.items
    }

    /// Index of the first ingredient matching `name` under `policy`.
    pub fn position(&self, name: &str, policy: NameMatch) -> Option<usize> {
        self.items
            .iter()
            .position(|item| policy.matches(&item.name, name))
    }

    pub fn find(&self, name: &str, policy: NameMatch) -> Option<&Ingredient> {
        self.position(name, policy).map(|idx| &self.items[idx])
    }

    pub fn get(&self, index: usize) -> Option<&Ingredient> {
        self.items.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Ingredient> {
        self.items.get_mut(index)
    }

    /// Append without any checks. Used when materializing stored state.
    pub(crate) fn push_unchecked(&mut self, ingredient: Ingredient) {
        self.items.push(ingredient);
    }

    /// Validate and append a new ingredient.
    ///
    /// Duplicates are detected case-insensitively whatever lookup policy
    /// the caller uses elsewhere.
    pub fn insert(&mut self, ingredient: Ingredient) -> Result<&Ingredient> {
        let ingredient = ingredient.normalize()?;
        if self.position(&ingredient.name, NameMatch::IgnoreCase).is_some() {
            return Err(CoreError::DuplicateIngredient(ingredient.name));
        }
        self.items.push(ingredient);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Apply `patch` to the ingredient matching `name`.
    pub fn update(
        &mut self,
        name: &str,
        patch: &IngredientPatch,
        policy: NameMatch,
    ) -> Result<&Ingredient> {
        let idx = self
            .position(name, policy)
            .ok_or_else(|| CoreError::IngredientNotFound(name.to_string()))?;
        let patched = patch.apply_to(&self.items[idx])?;

        let collides = self
            .items
            .iter()
            .enumerate()
            .any(|(i, other)| {
                i != idx && NameMatch::IgnoreCase.matches(&other.name, &patched.name)
            });
        if collides {
            return Err(CoreError::DuplicateIngredient(patched.name));
        }

        self.items[idx] = patched;
        Ok(&self.items[idx])
    }

    /// Remove the ingredient matching `name` and return it.
    pub fn remove(&mut self, name: &str, policy: NameMatch) -> Result<Ingredient> {
        let idx = self
            .position(name, policy)
            .ok_or_else(|| CoreError::IngredientNotFound(name.to_string()))?;
        Ok(self.items.remove(idx))
    }
}

impl FromIterator<Ingredient> for IngredientStore {
    fn from_iter<T: IntoIterator<Item = Ingredient>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

pub(crate) fn non_blank(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(CoreError::invalid(field, format!("{value} is not a finite number")));
    }
    if value < 0.0 {
        return Err(CoreError::invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> IngredientStore {
        let mut store = IngredientStore::new();
        store.insert(Ingredient::new("Flour", 500.0, "g", 100.0)).unwrap();
        store.insert(Ingredient::new("sugar", 200.0, "g", 50.0)).unwrap();
        store
    }

    #[test]
    fn name_match_policies() {
        assert!(NameMatch::IgnoreCase.matches("Flour", "flour"));
        assert!(!NameMatch::Exact.matches("Flour", "flour"));
        assert!(NameMatch::Exact.matches("flour", "flour"));
    }

    #[test]
    fn low_stock_boundary_is_inclusive() {
        let mut item = Ingredient::new("eggs", 12.0, "pcs", 12.0);
        assert!(item.is_low_stock());
        item.quantity = 13.0;
        assert!(!item.is_low_stock());
    }

    #[test]
    fn insert_rejects_case_insensitive_duplicate() {
        let mut store = store();
        let err = store
            .insert(Ingredient::new("FLOUR", 1.0, "g", 0.0))
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateIngredient(name) if name == "FLOUR"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn insert_trims_and_validates() {
        let mut store = IngredientStore::new();
        let added = store
            .insert(Ingredient::new("  butter ", 10.0, " g ", 2.0))
            .unwrap();
        assert_eq!(added.name, "butter");
        assert_eq!(added.unit, "g");

        assert!(store.insert(Ingredient::new("   ", 1.0, "g", 0.0)).is_err());
        assert!(store.insert(Ingredient::new("milk", -1.0, "ml", 0.0)).is_err());
        assert!(store.insert(Ingredient::new("milk", f64::NAN, "ml", 0.0)).is_err());
        assert!(store.insert(Ingredient::new("milk", 1.0, "ml", -5.0)).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_respects_policy() {
        let mut store = store();
        let patch = IngredientPatch {
            quantity: Some(42.0),
            ..Default::default()
        };
        assert!(matches!(
            store.update("flour", &patch, NameMatch::Exact),
            Err(CoreError::IngredientNotFound(_))
        ));
        let updated = store.update("flour", &patch, NameMatch::IgnoreCase).unwrap();
        assert_eq!(updated.quantity, 42.0);
        assert_eq!(updated.unit, "g");
    }

    #[test]
    fn update_rejects_negative_quantity_and_leaves_item() {
        let mut store = store();
        let patch = IngredientPatch {
            quantity: Some(-1.0),
            ..Default::default()
        };
        assert!(store.update("sugar", &patch, NameMatch::IgnoreCase).is_err());
        assert_eq!(store.find("sugar", NameMatch::Exact).unwrap().quantity, 200.0);
    }

    #[test]
    fn rename_collision_is_rejected() {
        let mut store = store();
        let patch = IngredientPatch {
            name: Some("SUGAR".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update("Flour", &patch, NameMatch::Exact),
            Err(CoreError::DuplicateIngredient(_))
        ));
    }

    #[test]
    fn rename_to_own_name_in_other_case_is_allowed() {
        let mut store = store();
        let patch = IngredientPatch {
            name: Some("flour".to_string()),
            ..Default::default()
        };
        let renamed = store.update("Flour", &patch, NameMatch::Exact).unwrap();
        assert_eq!(renamed.name, "flour");
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut store = store();
        store.insert(Ingredient::new("eggs", 6.0, "pcs", 2.0)).unwrap();
        store.remove("SUGAR", NameMatch::IgnoreCase).unwrap();
        let names: Vec<_> = store.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Flour", "eggs"]);
        assert!(store.remove("sugar", NameMatch::IgnoreCase).is_err());
    }
}
