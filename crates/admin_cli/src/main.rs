use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, PotionType, Recipe};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "potion_shop_admin")]
#[command(about = "Admin utilities for the potion shop (recipes, reset, audit)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./potion_shop.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Recipe(RecipeArgs),
    /// Bring gold back to the starting amount and clear all stock.
    Reset,
    /// Print every balance as JSON.
    Audit,
}

#[derive(Args, Debug)]
struct RecipeArgs {
    #[command(subcommand)]
    command: RecipeCommand,
}

#[derive(Subcommand, Debug)]
enum RecipeCommand {
    Create(RecipeCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct RecipeCreateArgs {
    #[arg(long)]
    sku: String,
    /// Display name; derived from the sku when omitted.
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long)]
    price: i64,
    #[arg(long, default_value_t = 0)]
    red: i64,
    #[arg(long, default_value_t = 0)]
    green: i64,
    #[arg(long, default_value_t = 0)]
    blue: i64,
    #[arg(long, default_value_t = 0)]
    dark: i64,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Recipe(RecipeArgs {
            command: RecipeCommand::Create(args),
        }) => {
            let potion_type = PotionType::new(args.red, args.green, args.blue, args.dark);
            let recipe = match Recipe::new(&args.sku, &args.name, args.price, potion_type) {
                Ok(recipe) => recipe,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let id = engine.new_recipe(recipe).await?;
            println!("created recipe: {} {potion_type} ({id})", args.sku);
        }
        Command::Recipe(RecipeArgs {
            command: RecipeCommand::List,
        }) => {
            for recipe in engine.recipes().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    recipe.sku, recipe.potion_type, recipe.price, recipe.name
                );
            }
        }
        Command::Reset => match engine.reset().await? {
            Some(tx) => println!("shop reset ({tx})"),
            None => println!("shop already in opening state"),
        },
        Command::Audit => {
            let audit = engine.audit().await?;
            println!("{}", serde_json::to_string_pretty(&audit)?);
        }
    }

    Ok(())
}
