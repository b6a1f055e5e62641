//! `sql-migrate` CLI: applies, inspects, and rolls back file-based SQL
//! migrations against any of the four supported dialects.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sql_core::dialect;
use sql_migrate::{ClientManager, MigrateError, MigrationEngine};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sql-migrate", about = "Replication-safe SQL migration runner")]
struct Cli {
    /// Database connection string. Falls back to the `DATABASE_URL`
    /// environment variable.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Dialect name: mysql, postgres, oracle, or sqlite.
    #[arg(long)]
    dialect: String,

    /// Directory containing `NNNN_name.sql` migration files.
    #[arg(long, default_value = "migrations")]
    migrations_dir: PathBuf,

    /// Namespaces the tracking table as `{service_owner}_migrations`.
    #[arg(long, default_value = "")]
    service_owner: String,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every pending migration.
    Apply {
        /// Log what would be executed without touching the database.
        #[arg(long)]
        dry_run: bool,

        /// Keep applying remaining pending migrations after one fails,
        /// instead of halting on the first failure.
        #[arg(long)]
        ignore_errors: bool,
    },
    /// List applied and pending migrations.
    Status,
    /// Roll back the most recently applied migration.
    Rollback {
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let dialect = dialect::lookup(&cli.dialect).ok_or_else(|| MigrateError::UnsupportedDialect(cli.dialect.clone()))?;

    let clients = ClientManager::new();
    let pool = clients.get_or_create("default", &cli.database_url).await?;

    let engine = MigrationEngine::new(&pool, dialect.as_ref(), &cli.migrations_dir, &cli.service_owner);

    match cli.command {
        Commands::Apply { dry_run, ignore_errors } => {
            let engine = engine.dry_run(dry_run).ignore_errors(ignore_errors);
            let applied = engine.apply_all().await?;
            if applied.is_empty() {
                info!("no pending migrations");
            } else {
                for id in &applied {
                    info!(migration = %id, "applied");
                }
            }
        }
        Commands::Status => {
            engine.ensure_tracking_table().await?;
            engine.verify_integrity().await?;
            let pending = engine.pending().await?;
            if pending.is_empty() {
                println!("all migrations applied");
            } else {
                println!("pending migrations:");
                for file in pending {
                    println!("  {}", file.id());
                }
            }
        }
        Commands::Rollback { dry_run } => {
            let engine = engine.dry_run(dry_run);
            match engine.rollback_last().await? {
                Some(id) => info!(migration = %id, "rolled back"),
                None => info!("no applied migrations to roll back"),
            }
        }
    }

    clients.close_all().await;
    Ok(())
}
