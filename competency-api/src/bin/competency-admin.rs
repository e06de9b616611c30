//! # Competency Admin
//!
//! Maintenance commands run against `DATABASE_URL`.
//!
//! ```bash
//! competency-admin migrate
//! competency-admin seed
//! competency-admin create-superuser --email admin@example.com --password Secure123 --name Admin
//! ```

use clap::{Parser, Subcommand};
use competency_shared::{
    db::{
        migrations::{ensure_database_exists, get_migration_status, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    seed::{create_superuser, seed_competencies, SeedOutcome},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "competency-admin", version, about = "Competency service maintenance")]
struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database if needed and apply pending migrations
    Migrate,

    /// Insert the default competency catalogue when none exists
    Seed,

    /// Create a superuser account; does nothing if the email is taken
    CreateSuperuser {
        #[arg(long, env = "FIRST_SUPERUSER_EMAIL")]
        email: String,

        #[arg(long, env = "FIRST_SUPERUSER_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, default_value = "Administrator")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "competency_shared=info,competency_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let Some(database_url) = cli.database_url else {
        anyhow::bail!("DATABASE_URL is required (pass --database-url or set the variable)");
    };

    if matches!(cli.command, Command::Migrate) {
        ensure_database_exists(&database_url).await?;
    }

    let pool = create_pool(DatabaseConfig {
        max_connections: 2,
        ..DatabaseConfig::from_url(database_url)
    })
    .await?;

    let result = run(&pool, cli.command).await;
    close_pool(pool).await;
    result
}

async fn run(pool: &sqlx::PgPool, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Migrate => {
            run_migrations(pool).await?;
            let status = get_migration_status(pool).await?;
            println!(
                "Migrations applied: {}/{} (latest: {})",
                status.applied_migrations,
                status.available_migrations,
                status
                    .latest_version
                    .map_or_else(|| "none".to_string(), |v| v.to_string()),
            );
        }
        Command::Seed => match seed_competencies(pool).await? {
            SeedOutcome::Created { items, questions } => {
                println!("Seeded {items} competency items with {questions} questions");
            }
            SeedOutcome::AlreadySeeded => {
                println!("Competency items already exist, nothing to do");
            }
        },
        Command::CreateSuperuser {
            email,
            password,
            name,
        } => {
            let (user, created) = create_superuser(pool, &email, &password, &name).await?;
            if created {
                println!("Created superuser {} ({})", user.email, user.id);
            } else {
                println!("User {} already exists ({})", user.email, user.id);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_superuser() {
        let cli = Cli::try_parse_from([
            "competency-admin",
            "--database-url",
            "postgres://localhost/competency",
            "create-superuser",
            "--email",
            "admin@example.com",
            "--password",
            "Secure123",
        ])
        .unwrap();

        match cli.command {
            Command::CreateSuperuser { email, name, .. } => {
                assert_eq!(email, "admin@example.com");
                assert_eq!(name, "Administrator");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
