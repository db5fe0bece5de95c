//! Operator CLI for the recipe backend.
//!
//! Usage:
//! - `recipe-cli ping`
//! - `recipe-cli migrate --db <PATH>`
//! - `recipe-cli create-superuser --db <PATH> --email <EMAIL> --password <PASSWORD>`

use clap::{Args, Parser, Subcommand};
use recipe_core::db::migrations::schema_version;
use recipe_core::db::open_db;
use recipe_core::{init_logging, SqliteUserRepository, UserService};
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "recipe-cli")]
#[command(about = "Recipe backend maintenance commands", long_about = None)]
struct Cli {
    /// Log level written to stderr
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check core crate linkage and print its version
    Ping,
    /// Create or upgrade the database schema
    Migrate(DbArgs),
    /// Create a staff superuser account
    CreateSuperuser(CreateSuperuserArgs),
}

#[derive(Debug, Args)]
struct DbArgs {
    /// Path to the SQLite database file
    #[arg(long)]
    db: PathBuf,
}

#[derive(Debug, Args)]
struct CreateSuperuserArgs {
    #[command(flatten)]
    db: DbArgs,

    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,
}

fn main() {
    let cli = Cli::parse();

    let result = init_logging(&cli.log_level, None)
        .map_err(Into::into)
        .and_then(|()| match cli.command {
            Commands::Ping => ping(),
            Commands::Migrate(args) => migrate(args),
            Commands::CreateSuperuser(args) => create_superuser(args),
        });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn ping() -> Result<(), Box<dyn Error>> {
    println!("recipe_core ping={}", recipe_core::ping());
    println!("recipe_core version={}", recipe_core::core_version());
    Ok(())
}

fn migrate(args: DbArgs) -> Result<(), Box<dyn Error>> {
    let conn = open_db(&args.db)?;
    println!(
        "{} is at schema version {}",
        args.db.display(),
        schema_version(&conn)?
    );
    Ok(())
}

fn create_superuser(args: CreateSuperuserArgs) -> Result<(), Box<dyn Error>> {
    let conn = open_db(&args.db.db)?;
    let service = UserService::new(SqliteUserRepository::try_new(&conn)?);
    let user = service.create_superuser(&args.email, &args.password)?;
    println!("created superuser {} (id {})", user.email, user.id);
    Ok(())
}
