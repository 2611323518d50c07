//! SQLite-backed storage for ingredients, recipes and bake history.
//!
//! The database is a flat materialization of [`InventoryState`]: it is read
//! once at startup with [`Database::load_state`] and rewritten in a single
//! transaction after every mutation through [`StateSink::persist`].

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rusqlite::{params, Connection};

use super::{data_dir, migrations, StateSink};
use crate::error::{DatabaseError, Result};
use crate::inventory::{
    HistoryEntry, HistoryLog, Ingredient, IngredientStore, InventoryState, Recipe,
    RecipeIngredient, RecipeStore,
};

/// SQLite database for inventory storage.
pub struct Database {
    conn: Mutex<Connection>,
}

fn corrupt(table: &str, message: impl Into<String>) -> DatabaseError {
    DatabaseError::CorruptRow {
        table: table.to_string(),
        message: message.into(),
    }
}

impl Database {
    /// Open the database at `<data_dir>/bakery.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("bakery.db"))
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Read the whole inventory back in stored order.
    ///
    /// # Errors
    /// Returns an error if a query fails or a row cannot be decoded.
    pub fn load_state(&self) -> Result<InventoryState> {
        let conn = self.conn.lock()?;
        let state = InventoryState {
            ingredients: load_ingredients(&conn)?,
            recipes: load_recipes(&conn)?,
            history: load_history(&conn)?,
        };
        tracing::debug!(
            ingredients = state.ingredients.len(),
            recipes = state.recipes.len(),
            history = state.history.len(),
            "loaded inventory state"
        );
        Ok(state)
    }

    /// Number of bakes stored, without loading them.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn history_len(&self) -> Result<u64> {
        let conn = self.conn.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Remove every ingredient, recipe and history row.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<()> {
        let mut conn = self.conn.lock()?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM recipe_ingredients;
             DELETE FROM recipes;
             DELETE FROM ingredients;
             DELETE FROM history;",
        )?;
        tx.commit()?;
        tracing::info!("database cleared");
        Ok(())
    }
}

fn load_ingredients(conn: &Connection) -> Result<IngredientStore> {
    let mut stmt = conn.prepare(
        "SELECT name, quantity, unit, low_stock_threshold
         FROM ingredients
         ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Ingredient {
            name: row.get(0)?,
            quantity: row.get(1)?,
            unit: row.get(2)?,
            low_stock_threshold: row.get(3)?,
        })
    })?;

    let mut store = IngredientStore::new();
    for row in rows {
        store.push_unchecked(row?);
    }
    Ok(store)
}

fn load_recipes(conn: &Connection) -> Result<RecipeStore> {
    let mut ingredients_by_recipe: IndexMap<String, IndexMap<String, RecipeIngredient>> =
        IndexMap::new();

    let mut names = conn.prepare("SELECT name FROM recipes ORDER BY position")?;
    for name in names.query_map([], |row| row.get::<_, String>(0))? {
        ingredients_by_recipe.insert(name?, IndexMap::new());
    }

    let mut parts = conn.prepare(
        "SELECT recipe, ingredient, amount, unit
         FROM recipe_ingredients
         ORDER BY recipe, position",
    )?;
    let rows = parts.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;
    for row in rows {
        let (recipe, ingredient, amount, unit) = row?;
        let entry = ingredients_by_recipe
            .get_mut(&recipe)
            .ok_or_else(|| corrupt("recipe_ingredients", format!("unknown recipe '{recipe}'")))?;
        entry.insert(ingredient, RecipeIngredient { amount, unit });
    }

    let mut store = RecipeStore::new();
    for (name, ingredients) in ingredients_by_recipe {
        store.insert_unchecked(Recipe { name, ingredients });
    }
    Ok(store)
}

fn load_history(conn: &Connection) -> Result<HistoryLog> {
    let mut stmt = conn.prepare("SELECT item, timestamp FROM history ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (item, raw) = row?;
        let timestamp = DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| corrupt("history", format!("bad timestamp '{raw}': {e}")))?;
        entries.push(HistoryEntry { item, timestamp });
    }
    Ok(entries.into_iter().collect())
}

impl StateSink for Database {
    fn persist(&self, state: &InventoryState) -> Result<()> {
        let mut conn = self.conn.lock()?;
        let tx = conn.transaction()?;

        tx.execute_batch(
            "DELETE FROM recipe_ingredients;
             DELETE FROM recipes;
             DELETE FROM ingredients;",
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO ingredients (position, name, quantity, unit, low_stock_threshold)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, item) in state.ingredients.iter().enumerate() {
                insert.execute(params![
                    position as i64,
                    item.name,
                    item.quantity,
                    item.unit,
                    item.low_stock_threshold,
                ])?;
            }

            let mut insert_recipe =
                tx.prepare("INSERT INTO recipes (position, name) VALUES (?1, ?2)")?;
            let mut insert_part = tx.prepare(
                "INSERT INTO recipe_ingredients (recipe, position, ingredient, amount, unit)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, recipe) in state.recipes.iter().enumerate() {
                insert_recipe.execute(params![position as i64, recipe.name])?;
                for (idx, (ingredient, need)) in recipe.ingredients.iter().enumerate() {
                    insert_part.execute(params![
                        recipe.name,
                        idx as i64,
                        ingredient,
                        need.amount,
                        need.unit,
                    ])?;
                }
            }

            // History is append-only: only write entries past what is stored.
            let stored: i64 = tx.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
            let mut insert_history =
                tx.prepare("INSERT INTO history (item, timestamp) VALUES (?1, ?2)")?;
            for entry in state.history.iter().skip(stored.max(0) as usize) {
                insert_history.execute(params![entry.item, entry.timestamp.to_rfc3339()])?;
            }
        }

        tx.commit()?;
        tracing::debug!(
            ingredients = state.ingredients.len(),
            recipes = state.recipes.len(),
            history = state.history.len(),
            "persisted inventory state"
        );
        Ok(())
    }
}
