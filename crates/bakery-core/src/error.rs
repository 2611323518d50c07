//! Core error types for bakery-core.
//!
//! Every operation on the inventory either succeeds completely or fails
//! with one of these variants and leaves state untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for bakery-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No recipe is stored under this exact name
    #[error("Recipe '{0}' not found")]
    RecipeNotFound(String),

    /// No ingredient matches this name
    #[error("Ingredient '{0}' not found")]
    IngredientNotFound(String),

    /// Not enough stock to cover a deduction
    #[error("Insufficient stock for '{ingredient}': required {required}, available {available}")]
    InsufficientStock {
        ingredient: String,
        required: f64,
        available: f64,
    },

    /// Recipe and stock disagree on the unit of an ingredient
    #[error("Unit mismatch for '{ingredient}': recipe needs {required_unit}, inventory has {stocked_unit}")]
    UnitMismatch {
        ingredient: String,
        required_unit: String,
        stocked_unit: String,
    },

    /// An ingredient with this name already exists
    #[error("Ingredient '{0}' already exists")]
    DuplicateIngredient(String),

    /// A recipe with this name already exists
    #[error("Recipe '{0}' already exists")]
    DuplicateRecipe(String),

    /// Recipe definition rejected at save time
    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    /// Malformed quantity or name
    #[error("Invalid value for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    /// Another thread panicked while holding the inventory lock
    #[error("Inventory lock poisoned")]
    LockPoisoned,

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be decoded
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl<T> From<std::sync::PoisonError<T>> for CoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        CoreError::LockPoisoned
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
