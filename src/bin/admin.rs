//! dollarsandlife-admin - administrative command line
//!
//! Records are created here (fixture import) and browsed through the same
//! list and search views the admin registrations describe.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dollarsandlife::{
    config::Config,
    db::{self, DynDatabasePool},
    models::EntityKind,
    services::{import_fixture, list_rows, registration, search_rows, AdminRow, Fixture},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Manage dollarsandlife records.")]
struct Cli {
    /// Path to the YAML configuration file (defaults to $DOLLARSANDLIFE_CONFIG or config.yml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and import a YAML or JSON fixture file.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List every record of a type (e.g. budget-post, side-hustle).
    List {
        #[arg(value_name = "TYPE")]
        kind: EntityKind,
    },
    /// Search a record type; every term must match one of its search fields.
    Search {
        #[arg(value_name = "TYPE")]
        kind: EntityKind,
        #[arg(value_name = "TERM", required = true, num_args = 1..)]
        terms: Vec<String>,
    },
    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dollarsandlife=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::path_from_env);
    let config = Config::load_with_env(&config_path)?;

    let pool = db::create_pool(&config.database).await?;
    let result = run(&pool, cli.command).await;
    pool.close().await;
    result
}

async fn run(pool: &DynDatabasePool, command: Command) -> Result<()> {
    match command {
        Command::Migrate => {
            let applied = db::migrations::run_migrations(pool).await?;
            println!(
                "Applied {} migration(s); {} total",
                applied,
                db::migrations::total_migrations()
            );
        }
        Command::Import { file } => {
            db::migrations::run_migrations(pool).await?;
            let fixture = Fixture::load(&file)?;
            for imported in import_fixture(pool, &fixture).await? {
                if imported.count > 0 {
                    println!("{}: {} imported", imported.kind.label(), imported.count);
                }
            }
        }
        Command::List { kind } => {
            let rows = list_rows(pool, kind).await?;
            print_rows(kind, &rows);
        }
        Command::Search { kind, terms } => {
            let rows = search_rows(pool, kind, &terms.join(" ")).await?;
            print_rows(kind, &rows);
        }
    }
    Ok(())
}

fn print_rows(kind: EntityKind, rows: &[AdminRow]) {
    let columns = registration(kind).list_display;
    println!("id\t{}", columns.join("\t"));
    for row in rows {
        println!("{}\t{}", row.id, row.values.join("\t"));
    }
    println!("{} {}", rows.len(), kind.label().to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["dollarsandlife-admin", "search", "budget_post", "rent", "tips"])
            .unwrap();
        match cli.command {
            Command::Search { kind, terms } => {
                assert_eq!(kind, EntityKind::BudgetPost);
                assert_eq!(terms, vec!["rent", "tips"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["dollarsandlife-admin", "list", "blog-posts"]).is_err());
    }

    #[test]
    fn test_search_requires_a_term() {
        assert!(Cli::try_parse_from(["dollarsandlife-admin", "search", "side-hustle"]).is_err());
    }
}
