use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "bakery-cli", version, about = "Bakery inventory CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingredient stock management
    Ingredient {
        #[command(subcommand)]
        action: commands::ingredient::IngredientAction,
    },
    /// Recipe management
    Recipe {
        #[command(subcommand)]
        action: commands::recipe::RecipeAction,
    },
    /// Bake a recipe, deducting its ingredients
    Bake(commands::bake::BakeArgs),
    /// Bake history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Dashboard statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Import data from the legacy JSON files
    Import(commands::import::ImportArgs),
}

/// Logs go to stderr so stdout stays parseable. Level comes from `BAKERY_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("BAKERY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Ingredient { action } => commands::ingredient::run(action),
        Commands::Recipe { action } => commands::recipe::run(action),
        Commands::Bake(args) => commands::bake::run(args),
        Commands::History { action } => commands::history::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Import(args) => commands::import::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
