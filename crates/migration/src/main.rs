use clap::{Parser, Subcommand};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;

use migration::Migrator;

#[derive(Parser, Debug)]
#[command(name = "migration")]
#[command(about = "Applies or rolls back the Spese database schema")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./spese.db?mode=rwc"
    )]
    database_url: String,

    /// Defaults to `up` when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Apply pending migrations.
    Up {
        /// Apply at most this many.
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations, the latest first.
    Down {
        /// Roll back this many (all of them when omitted).
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Drop every table and apply all migrations again.
    Fresh,
    /// List applied and pending migrations.
    Status,
}

async fn run(db: &DatabaseConnection, command: Command) -> Result<(), DbErr> {
    match command {
        Command::Up { steps } => Migrator::up(db, steps).await,
        Command::Down { steps } => Migrator::down(db, steps).await,
        Command::Fresh => Migrator::fresh(db).await,
        Command::Status => Migrator::status(db).await,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Up { steps: None });

    let db = Database::connect(&cli.database_url).await?;
    run(&db, command).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_defaults_to_up() {
        let cli = Cli::try_parse_from(["migration", "--database-url", "sqlite::memory:"]).unwrap();
        assert_eq!(cli.database_url, "sqlite::memory:");
        assert_eq!(cli.command, None);
    }

    #[test]
    fn steps_are_parsed() {
        let cli = Cli::try_parse_from(["migration", "down", "--steps", "2"]).unwrap();
        assert_eq!(cli.command, Some(Command::Down { steps: Some(2) }));
        assert!(Cli::try_parse_from(["migration", "sideways"]).is_err());
    }

    #[tokio::test]
    async fn down_then_up_restores_the_schema() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        run(&db, Command::Up { steps: None }).await.unwrap();
        let applied = Migrator::get_applied_migrations(&db).await.unwrap().len();
        assert_eq!(applied, Migrator::migrations().len());

        run(&db, Command::Down { steps: Some(1) }).await.unwrap();
        let applied = Migrator::get_applied_migrations(&db).await.unwrap().len();
        assert_eq!(applied, Migrator::migrations().len() - 1);

        run(&db, Command::Up { steps: None }).await.unwrap();
        assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
    }
}
