use bakery_core::{Ingredient, IngredientPatch};
use clap::Subcommand;

use super::{open_bakery, print_json, CmdResult};

#[derive(Subcommand)]
pub enum IngredientAction {
    /// Add a new ingredient to stock
    Add {
        /// Ingredient name
        name: String,
        /// Quantity on hand
        #[arg(long)]
        quantity: f64,
        /// Unit of measure (e.g. "g", "ml", "pcs")
        #[arg(long)]
        unit: String,
        /// Low-stock threshold (defaults to inventory.default_low_stock_threshold)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// List all ingredients
    List,
    /// Show a single ingredient
    Show {
        name: String,
    },
    /// Update fields of an ingredient
    Update {
        /// Current ingredient name
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        quantity: Option<f64>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Delete an ingredient
    Delete {
        name: String,
    },
    /// Remove an amount from stock
    Subtract {
        name: String,
        amount: f64,
    },
    /// List ingredients at or below their low-stock threshold
    LowStock,
}

pub fn run(action: IngredientAction) -> CmdResult {
    let (bakery, config) = open_bakery()?;
    match action {
        IngredientAction::Add {
            name,
            quantity,
            unit,
            threshold,
        } => {
            let threshold = threshold.unwrap_or(config.inventory.default_low_stock_threshold);
            let added = bakery.add_ingredient(Ingredient::new(name, quantity, unit, threshold))?;
            print_json(&added)?;
        }
        IngredientAction::List => {
            print_json(&bakery.list_ingredients()?)?;
        }
        IngredientAction::Show { name } => {
            print_json(&bakery.get_ingredient(&name)?)?;
        }
        IngredientAction::Update {
            name,
            rename,
            quantity,
            unit,
            threshold,
        } => {
            let patch = IngredientPatch {
                name: rename,
                quantity,
                unit,
                low_stock_threshold: threshold,
            };
            if patch.is_empty() {
                return Err("nothing to update; pass at least one of \
                            --rename, --quantity, --unit, --threshold"
                    .into());
            }
            print_json(&bakery.update_ingredient(&name, &patch)?)?;
        }
        IngredientAction::Delete { name } => {
            bakery.delete_ingredient(&name)?;
            println!("Ingredient deleted: {name}");
        }
        IngredientAction::Subtract { name, amount } => {
            print_json(&bakery.subtract_ingredient(&name, amount)?)?;
        }
        IngredientAction::LowStock => {
            print_json(&bakery.low_stock_items()?)?;
        }
    }
    Ok(())
}
