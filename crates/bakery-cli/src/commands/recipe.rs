use std::io::Read;

use bakery_core::RecipeIngredient;
use clap::Subcommand;
use indexmap::IndexMap;

use super::{open_bakery, print_json, CmdResult};

#[derive(Subcommand)]
pub enum RecipeAction {
    /// Save a new recipe
    Save {
        /// Recipe name
        name: String,
        /// Ingredient as NAME=AMOUNT:UNIT (repeatable)
        #[arg(long = "ingredient", short = 'i', value_parser = parse_part)]
        ingredients: Vec<(String, RecipeIngredient)>,
        /// Read the ingredient table as TOML from stdin instead
        #[arg(long, conflicts_with = "ingredients")]
        stdin: bool,
    },
    /// List all recipes
    List,
    /// Show a single recipe
    Show {
        name: String,
    },
}

/// Parse `flour=250:g` into a recipe line.
fn parse_part(raw: &str) -> Result<(String, RecipeIngredient), String> {
    let (name, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=AMOUNT:UNIT, got '{raw}'"))?;
    let (amount, unit) = rest
        .split_once(':')
        .ok_or_else(|| format!("missing unit in '{raw}'"))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| format!("invalid amount in '{raw}'"))?;
    Ok((name.trim().to_string(), RecipeIngredient::new(amount, unit.trim())))
}

fn read_stdin_parts() -> Result<IndexMap<String, RecipeIngredient>, Box<dyn std::error::Error>> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(toml::from_str(&buf)?)
}

pub fn run(action: RecipeAction) -> CmdResult {
    let (bakery, _) = open_bakery()?;
    match action {
        RecipeAction::Save {
            name,
            ingredients,
            stdin,
        } => {
            let parts = if stdin {
                read_stdin_parts()?
            } else {
                ingredients.into_iter().collect()
            };
            print_json(&bakery.save_recipe(&name, parts)?)?;
        }
        RecipeAction::List => {
            print_json(&bakery.list_recipes()?)?;
        }
        RecipeAction::Show { name } => {
            let recipes = bakery.list_recipes()?;
            match recipes.get(&name) {
                Some(recipe) => print_json(recipe)?,
                None => return Err(bakery_core::CoreError::RecipeNotFound(name).into()),
            }
        }
    }
    Ok(())
}
