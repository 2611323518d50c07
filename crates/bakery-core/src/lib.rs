//! # Bakery Core Library
//!
//! This library provides the core business logic for a bakery's ingredient
//! inventory. All operations are available through the standalone CLI
//! binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Inventory**: ingredients, recipes and the append-only bake history,
//!   held as plain owned data in an [`InventoryState`]
//! - **Consumption**: validate-then-commit baking; a bake deducts every
//!   ingredient or none of them
//! - **Stats**: low-stock alerts, daily bake counts and per-product trends,
//!   recomputed on every call
//! - **Storage**: SQLite persistence, legacy JSON import and TOML configuration
//!
//! ## Key Components
//!
//! - [`Bakery`]: the single state owner exposing every operation
//! - [`Database`]: persistence for the inventory state
//! - [`Config`]: application configuration management

pub mod bakery;
pub mod consumption;
pub mod error;
pub mod inventory;
pub mod stats;
pub mod storage;

pub use bakery::{Bakery, BakeryOptions};
pub use consumption::{BakePlan, BakeProblem, Deduction};
pub use error::{ConfigError, CoreError, DatabaseError, Result};
pub use inventory::{
    HistoryEntry, Ingredient, IngredientPatch, InventoryState, NameMatch, Recipe,
    RecipeIngredient,
};
pub use stats::{DailyCount, DashboardSummary, DayBoundary};
pub use storage::{Config, Database, StateSink};
