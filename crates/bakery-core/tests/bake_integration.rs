//! Integration tests for baking through a database-backed bakery.
//!
//! Covers the full path from stocking ingredients to reloading the
//! persisted state after successful and rejected bakes.

use std::sync::Arc;

use bakery_core::{
    Bakery, BakeryOptions, CoreError, Database, Ingredient, InventoryState, RecipeIngredient,
};
use indexmap::IndexMap;

fn recipe(parts: &[(&str, f64, &str)]) -> IndexMap<String, RecipeIngredient> {
    parts
        .iter()
        .map(|(name, amount, unit)| (name.to_string(), RecipeIngredient::new(*amount, *unit)))
        .collect()
}

fn open_bakery(db: &Arc<Database>) -> Bakery {
    let state = db.load_state().unwrap();
    Bakery::with_sink(state, BakeryOptions::default(), db.clone())
}

fn stock(bakery: &Bakery) {
    bakery
        .add_ingredient(Ingredient::new("flour", 500.0, "g", 100.0))
        .unwrap();
    bakery
        .add_ingredient(Ingredient::new("sugar", 200.0, "g", 50.0))
        .unwrap();
}

#[test]
fn test_successful_bake_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(Database::open_at(dir.path().join("bakery.db")).unwrap());
    let bakery = open_bakery(&db);
    stock(&bakery);
    bakery
        .save_recipe("cake", recipe(&[("flour", 300.0, "g"), ("sugar", 100.0, "g")]))
        .unwrap();

    let entry = bakery.bake("cake").unwrap();
    assert_eq!(entry.item, "cake");

    drop(bakery);
    let reopened = Arc::new(Database::open_at(dir.path().join("bakery.db")).unwrap());
    let state = reopened.load_state().unwrap();
    let quantities: Vec<_> = state
        .ingredients
        .iter()
        .map(|i| (i.name.as_str(), i.quantity))
        .collect();
    assert_eq!(quantities, vec![("flour", 200.0), ("sugar", 100.0)]);
    assert_eq!(state.history.as_slice(), &[entry]);
}

#[test]
fn test_insufficient_stock_changes_nothing() {
    let db = Arc::new(Database::open_memory().unwrap());
    let bakery = open_bakery(&db);
    stock(&bakery);
    bakery
        .save_recipe("cake2", recipe(&[("flour", 600.0, "g")]))
        .unwrap();
    let before = db.load_state().unwrap();

    match bakery.bake("cake2") {
        Err(CoreError::InsufficientStock {
            ingredient,
            required,
            available,
        }) => {
            assert_eq!(ingredient, "flour");
            assert_eq!(required, 600.0);
            assert_eq!(available, 500.0);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(db.load_state().unwrap(), before);
    assert_eq!(bakery.snapshot().unwrap(), before);
}

#[test]
fn test_unknown_recipe_changes_nothing() {
    let db = Arc::new(Database::open_memory().unwrap());
    let bakery = open_bakery(&db);
    stock(&bakery);
    let before = bakery.snapshot().unwrap();

    assert!(matches!(
        bakery.bake("nonexistent"),
        Err(CoreError::RecipeNotFound(_))
    ));
    assert_eq!(bakery.snapshot().unwrap(), before);
    assert_eq!(db.history_len().unwrap(), 0);
}

#[test]
fn test_bake_only_touches_recipe_ingredients() {
    let bakery = Bakery::new(InventoryState::new(), BakeryOptions::default());
    stock(&bakery);
    bakery
        .add_ingredient(Ingredient::new("butter", 250.0, "g", 20.0))
        .unwrap();
    bakery
        .save_recipe("shortbread", recipe(&[("butter", 200.0, "g"), ("sugar", 100.0, "g")]))
        .unwrap();
    let recipes_before = bakery.list_recipes().unwrap();

    bakery.bake("shortbread").unwrap();

    let quantities: Vec<_> = bakery
        .list_ingredients()
        .unwrap()
        .into_iter()
        .map(|i| (i.name, i.quantity))
        .collect();
    assert_eq!(
        quantities,
        vec![
            ("flour".to_string(), 500.0),
            ("sugar".to_string(), 100.0),
            ("butter".to_string(), 50.0),
        ]
    );
    assert_eq!(bakery.list_recipes().unwrap(), recipes_before);
    assert_eq!(bakery.list_history().unwrap().len(), 1);
}

#[test]
fn test_repeated_bakes_stop_at_empty_stock() {
    let bakery = Bakery::new(InventoryState::new(), BakeryOptions::default());
    stock(&bakery);
    bakery
        .save_recipe("muffin", recipe(&[("flour", 150.0, "g"), ("sugar", 40.0, "g")]))
        .unwrap();

    let baked = (0..10).filter(|_| bakery.bake("muffin").is_ok()).count();
    assert_eq!(baked, 3);
    assert_eq!(bakery.get_ingredient("flour").unwrap().quantity, 50.0);
    assert_eq!(bakery.get_ingredient("sugar").unwrap().quantity, 80.0);
    assert_eq!(bakery.list_history().unwrap().len(), 3);
}

#[test]
fn test_invalid_recipes_are_rejected_at_save() {
    let bakery = Bakery::new(InventoryState::new(), BakeryOptions::default());
    assert!(matches!(
        bakery.save_recipe("nothing", IndexMap::new()),
        Err(CoreError::InvalidRecipe(_))
    ));
    assert!(matches!(
        bakery.save_recipe("negative", recipe(&[("flour", -5.0, "g")])),
        Err(CoreError::InvalidRecipe(_))
    ));
    assert!(matches!(
        bakery.save_recipe("blank", recipe(&[("", 5.0, "g")])),
        Err(CoreError::InvalidRecipe(_))
    ));
    // Referencing an unstocked ingredient is fine until bake time.
    bakery
        .save_recipe("ghost", recipe(&[("saffron", 1.0, "g")]))
        .unwrap();
    assert!(matches!(
        bakery.bake("ghost"),
        Err(CoreError::IngredientNotFound(name)) if name == "saffron"
    ));
}
